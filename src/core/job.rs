use compact_str::CompactString;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

const ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const ID_LEN: usize = 8;

#[derive(Debug)]
pub enum JobError {
    InvalidDemand { field: &'static str, value: i64 },
}

impl std::error::Error for JobError {}
impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobError::InvalidDemand { field, value } => {
                write!(f, "invalid {field}: {value}")
            }
        }
    }
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy, Hash)]
pub enum JobState {
    #[serde(rename = "PENDING")]
    Pending,
    #[serde(rename = "RUNNING")]
    Running,
    #[serde(rename = "DONE")]
    Done,
    #[serde(rename = "CANCELED")]
    Canceled,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobState::Pending => "PENDING",
            JobState::Running => "RUNNING",
            JobState::Done => "DONE",
            JobState::Canceled => "CANCELED",
        };
        write!(f, "{s}")
    }
}

impl Default for JobState {
    fn default() -> Self {
        JobState::Pending
    }
}

/// A unit of work submitted to the simulated cluster.
///
/// Dynamic fields (`state`, `remaining`, `assigned_node`, `start_time`, `end_time`) are
/// owned exclusively by the scheduling engine; the driver only ever reads them.
#[derive(Debug, Serialize, Clone)]
pub struct Job {
    pub id: CompactString,
    pub name: CompactString,
    pub cpus: u32,
    pub gpus: u32,
    pub minutes: u64,
    pub priority: i64,
    pub submit_time: u64,

    pub state: JobState,
    pub remaining: u64,
    pub assigned_node: Option<CompactString>,
    pub start_time: Option<u64>,
    pub end_time: Option<u64>,
}

/// Wire shape for deserialization. `remaining` defaults to `minutes` when absent — a
/// cross-field default serde's `#[serde(default)]` cannot express on its own, so the
/// document loader goes through this intermediate form (mirrors the custom group_id
/// (de)serializer convention used elsewhere in this codebase).
#[derive(Deserialize)]
#[serde(default)]
struct JobWire {
    id: CompactString,
    name: CompactString,
    cpus: u32,
    gpus: u32,
    minutes: u64,
    priority: i64,
    submit_time: u64,
    state: JobState,
    remaining: Option<u64>,
    assigned_node: Option<CompactString>,
    start_time: Option<u64>,
    end_time: Option<u64>,
}

impl Default for JobWire {
    fn default() -> Self {
        let d = Job::default();
        JobWire {
            id: d.id,
            name: d.name,
            cpus: d.cpus,
            gpus: d.gpus,
            minutes: d.minutes,
            priority: d.priority,
            submit_time: d.submit_time,
            state: d.state,
            remaining: None,
            assigned_node: d.assigned_node,
            start_time: d.start_time,
            end_time: d.end_time,
        }
    }
}

impl<'de> Deserialize<'de> for Job {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let wire = JobWire::deserialize(deserializer)?;
        Ok(Job {
            id: wire.id,
            name: wire.name,
            cpus: wire.cpus,
            gpus: wire.gpus,
            minutes: wire.minutes,
            priority: wire.priority,
            submit_time: wire.submit_time,
            state: wire.state,
            remaining: wire.remaining.unwrap_or(wire.minutes),
            assigned_node: wire.assigned_node,
            start_time: wire.start_time,
            end_time: wire.end_time,
        })
    }
}

impl Default for Job {
    fn default() -> Self {
        Job {
            id: CompactString::const_new(""),
            name: CompactString::const_new(""),
            cpus: 1,
            gpus: 0,
            minutes: 1,
            priority: 0,
            submit_time: 0,
            state: JobState::Pending,
            remaining: 1,
            assigned_node: None,
            start_time: None,
            end_time: None,
        }
    }
}

impl Job {
    /// Builds a new pending job submitted at `now`, validating demand.
    pub fn submit(
        name: impl Into<CompactString>,
        cpus: u32,
        gpus: u32,
        minutes: u64,
        priority: i64,
        now: u64,
        existing_ids: &HashMap<CompactString, Job>,
    ) -> Result<Job, JobError> {
        if cpus == 0 {
            return Err(JobError::InvalidDemand {
                field: "cpus",
                value: cpus as i64,
            });
        }
        if minutes == 0 {
            return Err(JobError::InvalidDemand {
                field: "minutes",
                value: minutes as i64,
            });
        }
        if priority < 0 {
            return Err(JobError::InvalidDemand {
                field: "priority",
                value: priority,
            });
        }

        Ok(Job {
            id: generate_job_id(existing_ids),
            name: name.into(),
            cpus,
            gpus,
            minutes,
            priority,
            submit_time: now,
            state: JobState::Pending,
            remaining: minutes,
            assigned_node: None,
            start_time: None,
            end_time: None,
        })
    }
}

/// Generates an 8-character opaque job id, retrying on the (astronomically unlikely)
/// collision against the current job set.
fn generate_job_id(existing: &HashMap<CompactString, Job>) -> CompactString {
    let mut rng = rand::rng();
    loop {
        let id: String = (0..ID_LEN)
            .map(|_| {
                let idx = rng.random_range(0..ID_ALPHABET.len());
                ID_ALPHABET[idx] as char
            })
            .collect();
        let id = CompactString::from(id);
        if !existing.contains_key(&id) {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_rejects_non_positive_demand() {
        let jobs = HashMap::new();
        assert!(Job::submit("x", 0, 0, 10, 0, 0, &jobs).is_err());
        assert!(Job::submit("x", 1, 0, 0, 0, 0, &jobs).is_err());
    }

    #[test]
    fn submit_rejects_negative_priority() {
        let jobs = HashMap::new();
        assert!(Job::submit("x", 1, 0, 10, -5, 0, &jobs).is_err());
    }

    #[test]
    fn submit_produces_pending_job_with_full_remaining() {
        let jobs = HashMap::new();
        let job = Job::submit("train", 2, 1, 30, 5, 10, &jobs).unwrap();
        assert_eq!(job.id.len(), ID_LEN);
        assert_eq!(job.state, JobState::Pending);
        assert_eq!(job.remaining, job.minutes);
        assert_eq!(job.submit_time, 10);
        assert!(job.assigned_node.is_none());
    }

    #[test]
    fn generated_ids_avoid_existing_collisions() {
        let mut jobs = HashMap::new();
        let first = Job::submit("a", 1, 0, 1, 0, 0, &jobs).unwrap();
        jobs.insert(first.id.clone(), first.clone());
        let second = Job::submit("b", 1, 0, 1, 0, 0, &jobs).unwrap();
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn state_serializes_to_uppercase_tags() {
        let json = serde_json::to_string(&JobState::Running).unwrap();
        assert_eq!(json, "\"RUNNING\"");
        let state: JobState = serde_json::from_str("\"CANCELED\"").unwrap();
        assert_eq!(state, JobState::Canceled);
    }
}
