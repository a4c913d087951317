use crate::core::job::Job;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// A physical worker with fixed CPU/GPU capacity.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct Node {
    pub id: CompactString,
    pub total_cpus: u32,
    pub total_gpus: u32,
    pub used_cpus: u32,
    pub used_gpus: u32,
    pub running_jobs: Vec<CompactString>,
}

impl Default for Node {
    fn default() -> Self {
        Node {
            id: CompactString::const_new(""),
            total_cpus: 0,
            total_gpus: 0,
            used_cpus: 0,
            used_gpus: 0,
            running_jobs: Vec::new(),
        }
    }
}

impl Node {
    pub fn new(id: impl Into<CompactString>, total_cpus: u32, total_gpus: u32) -> Self {
        Node {
            id: id.into(),
            total_cpus,
            total_gpus,
            used_cpus: 0,
            used_gpus: 0,
            running_jobs: Vec::new(),
        }
    }

    pub fn free_cpus(&self) -> u32 {
        self.total_cpus - self.used_cpus
    }

    pub fn free_gpus(&self) -> u32 {
        self.total_gpus - self.used_gpus
    }

    pub fn can_fit(&self, job: &Job) -> bool {
        self.free_cpus() >= job.cpus && self.free_gpus() >= job.gpus
    }

    /// Exceeds the node's *total* capacity regardless of current usage — used by backfill
    /// to decide whether a job can ever run here.
    pub fn exceeds_capacity(&self, job: &Job) -> bool {
        job.cpus > self.total_cpus || job.gpus > self.total_gpus
    }

    /// Precondition: `can_fit(job)` and the job is PENDING. Pure bookkeeping — the engine
    /// flips `job.state` separately so both mutations are published together.
    pub fn assign(&mut self, job: &Job) {
        self.used_cpus += job.cpus;
        self.used_gpus += job.gpus;
        self.running_jobs.push(job.id.clone());
    }

    /// Idempotent: releasing a job not currently hosted here is a no-op.
    pub fn release(&mut self, job: &Job) {
        if let Some(pos) = self.running_jobs.iter().position(|id| id == &job.id) {
            self.running_jobs.remove(pos);
            self.used_cpus -= job.cpus;
            self.used_gpus -= job.gpus;
        }
    }
}
