use crate::core::node::Node;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// The fleet plus simulated clock. `nodes` is a `Vec` internally, not a `HashMap`, so that
/// policies iterate it in a reproducible, insertion order (see determinism requirements).
/// On the wire it is a JSON object keyed by node id, matching the persisted document shape;
/// `serialize_nodes`/`deserialize_nodes` convert between the two without disturbing order.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct Cluster {
    pub now: u64,
    #[serde(serialize_with = "serialize_nodes", deserialize_with = "deserialize_nodes")]
    pub nodes: Vec<Node>,
}

fn serialize_nodes<S>(nodes: &[Node], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::SerializeMap;
    let mut map = serializer.serialize_map(Some(nodes.len()))?;
    for node in nodes {
        map.serialize_entry(node.id.as_str(), node)?;
    }
    map.end()
}

fn deserialize_nodes<'de, D>(deserializer: D) -> Result<Vec<Node>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct NodesVisitor;

    impl<'de> serde::de::Visitor<'de> for NodesVisitor {
        type Value = Vec<Node>;

        fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("a map of node id to node body")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: serde::de::MapAccess<'de>,
        {
            let mut nodes = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((id, mut node)) = map.next_entry::<CompactString, Node>()? {
                node.id = id;
                nodes.push(node);
            }
            Ok(nodes)
        }
    }

    deserializer.deserialize_map(NodesVisitor)
}

impl Cluster {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Appends `n` nodes with generated ids continuing from the current node count.
    pub fn add_nodes(&mut self, n: u32, cpus_per_node: u32, gpus_per_node: u32) {
        let start = self.nodes.len() as u32 + 1;
        for i in start..start + n {
            let id = CompactString::from(format!("N{i}"));
            self.nodes.push(Node::new(id, cpus_per_node, gpus_per_node));
        }
    }

    /// `(cpu_util_pct, gpu_util_pct)` in `[0, 100]`; 0 when the corresponding total is 0.
    pub fn total_utilization(&self) -> (f64, f64) {
        let (mut cpu_used, mut cpu_total, mut gpu_used, mut gpu_total) = (0u64, 0u64, 0u64, 0u64);
        for node in &self.nodes {
            cpu_used += node.used_cpus as u64;
            cpu_total += node.total_cpus as u64;
            gpu_used += node.used_gpus as u64;
            gpu_total += node.total_gpus as u64;
        }
        let cpu_pct = if cpu_total == 0 {
            0.0
        } else {
            cpu_used as f64 / cpu_total as f64 * 100.0
        };
        let gpu_pct = if gpu_total == 0 {
            0.0
        } else {
            gpu_used as f64 / gpu_total as f64 * 100.0
        };
        (cpu_pct, gpu_pct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_nodes_generates_sequential_ids() {
        let mut cluster = Cluster::default();
        cluster.add_nodes(2, 8, 1);
        cluster.add_nodes(1, 16, 0);
        let ids: Vec<_> = cluster.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["N1", "N2", "N3"]);
    }

    #[test]
    fn total_utilization_avoids_division_by_zero() {
        let cluster = Cluster::default();
        assert_eq!(cluster.total_utilization(), (0.0, 0.0));
    }

    #[test]
    fn total_utilization_aggregates_across_nodes() {
        let mut cluster = Cluster::default();
        cluster.add_nodes(2, 4, 2);
        cluster.nodes[0].used_cpus = 2;
        cluster.nodes[1].used_cpus = 4;
        cluster.nodes[0].used_gpus = 2;
        let (cpu_pct, gpu_pct) = cluster.total_utilization();
        assert!((cpu_pct - 75.0).abs() < 1e-9);
        assert!((gpu_pct - 50.0).abs() < 1e-9);
    }

    #[test]
    fn nodes_serialize_as_a_map_keyed_by_id() {
        let mut cluster = Cluster::default();
        cluster.add_nodes(2, 4, 1);
        let json = serde_json::to_value(&cluster).unwrap();
        let nodes = json.get("nodes").unwrap().as_object().unwrap();
        assert!(nodes.contains_key("N1"));
        assert!(nodes.contains_key("N2"));
        assert_eq!(nodes["N1"]["total_cpus"], 4);
    }

    #[test]
    fn nodes_round_trip_through_json_preserving_order() {
        let mut cluster = Cluster::default();
        cluster.add_nodes(3, 4, 0);
        let json = serde_json::to_string(&cluster).unwrap();
        let restored: Cluster = serde_json::from_str(&json).unwrap();
        let ids: Vec<_> = restored.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["N1", "N2", "N3"]);
    }
}
