use crate::core::cluster::Cluster;
use crate::core::job::Job;
use crate::core::scheduler::JobSet;
use anyhow::{Context, Result};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// The whole-document shape persisted between driver invocations.
#[derive(Debug, Deserialize, Serialize, Default)]
struct Document {
    #[serde(default)]
    cluster: Cluster,
    #[serde(default)]
    jobs: HashMap<CompactString, Job>,
}

/// Loads the cluster and job set from `path`. A missing file yields an empty cluster and
/// job set — not an error. A malformed document is a fatal parse failure.
pub fn load(path: &Path) -> Result<(Cluster, JobSet)> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no state document found, starting empty");
        return Ok((Cluster::default(), HashMap::new()));
    }

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read state document at {}", path.display()))?;
    let doc: Document = serde_json::from_str(&raw)
        .with_context(|| format!("state document at {} is malformed", path.display()))?;

    Ok((doc.cluster, doc.jobs))
}

/// Rewrites the whole document at `path`. Not an append; no locking — last writer wins.
pub fn save(path: &Path, cluster: &Cluster, jobs: &JobSet) -> Result<()> {
    let doc = Document {
        cluster: cluster.clone(),
        jobs: jobs.clone(),
    };
    let rendered = serde_json::to_string_pretty(&doc).context("failed to serialize state")?;
    std::fs::write(path, rendered)
        .with_context(|| format!("failed to write state document to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::job::JobState;
    use tempfile::tempdir;

    #[test]
    fn load_missing_document_yields_empty_state() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("does-not-exist.json");
        let (cluster, jobs) = load(&path).unwrap();
        assert!(cluster.nodes.is_empty());
        assert!(jobs.is_empty());
    }

    #[test]
    fn load_rejects_malformed_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(load(&path).is_err());
    }

    #[test]
    fn round_trips_through_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut cluster = Cluster::default();
        cluster.add_nodes(2, 4, 1);
        cluster.now = 15;

        let jobs: JobSet = HashMap::new();
        let mut job = Job::submit("a", 2, 0, 10, 0, 0, &jobs).unwrap();
        job.state = JobState::Running;
        job.assigned_node = Some(cluster.nodes[0].id.clone());
        job.start_time = Some(0);
        cluster.nodes[0].assign(&job);
        let jobs: JobSet = [(job.id.clone(), job)].into_iter().collect();

        save(&path, &cluster, &jobs).unwrap();
        let (loaded_cluster, loaded_jobs) = load(&path).unwrap();

        assert_eq!(loaded_cluster.now, cluster.now);
        assert_eq!(loaded_cluster.nodes.len(), cluster.nodes.len());
        assert_eq!(loaded_jobs.len(), jobs.len());
        for (id, job) in &jobs {
            assert_eq!(loaded_jobs[id].state, job.state);
            assert_eq!(loaded_jobs[id].remaining, job.remaining);
        }
    }

    #[test]
    fn missing_optional_job_fields_fall_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(
            &path,
            r#"{"cluster":{"now":0,"nodes":{}},"jobs":{"abc12345":{"name":"x","minutes":10,"cpus":2,"id":"abc12345"}}}"#,
        )
        .unwrap();

        let (_cluster, jobs) = load(&path).unwrap();
        let job = &jobs["abc12345"];
        assert_eq!(job.gpus, 0);
        assert_eq!(job.priority, 0);
        assert_eq!(job.state, JobState::Pending);
        assert_eq!(job.remaining, 10);
        assert!(job.assigned_node.is_none());
        assert_eq!(job.submit_time, 0);
        assert!(job.start_time.is_none());
        assert!(job.end_time.is_none());
    }
}
