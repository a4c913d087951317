use crate::core::cluster::Cluster;
use crate::core::job::{Job, JobState};
use compact_str::CompactString;
use std::collections::HashMap;

pub type JobSet = HashMap<CompactString, Job>;

/// The placement policy family. Unknown labels degrade to FIFO (see `Policy::parse`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    Fifo,
    Priority,
    Backfill,
}

impl Policy {
    pub fn parse(label: &str) -> Policy {
        match label.to_ascii_lowercase().as_str() {
            "priority" => Policy::Priority,
            "backfill" => Policy::Backfill,
            "fifo" => Policy::Fifo,
            other => {
                tracing::debug!("unknown policy label {other:?}, degrading to fifo");
                Policy::Fifo
            }
        }
    }
}

/// Attempts to place pending jobs per `policy`. Mutates job states to RUNNING and node
/// bookkeeping in place. A no-op when no resources are free and no jobs are pending.
pub fn try_schedule(cluster: &mut Cluster, jobs: &mut JobSet, policy: Policy) {
    let pending_ids = pending_job_ids(jobs);
    if pending_ids.is_empty() || cluster.nodes.is_empty() {
        return;
    }

    tracing::debug!(?policy, pending = pending_ids.len(), "running try_schedule");

    match policy {
        Policy::Fifo => {
            let ordered = order_fifo(jobs, pending_ids);
            greedy_place(cluster, jobs, &ordered);
        }
        Policy::Priority => {
            let ordered = order_priority(jobs, pending_ids);
            greedy_place(cluster, jobs, &ordered);
        }
        Policy::Backfill => schedule_backfill(cluster, jobs, pending_ids),
    }
}

/// Advances the simulated clock by `delta` minutes, decrementing every RUNNING job's
/// remaining work and completing any that hit zero. Completion happens strictly after the
/// clock advance; no job started during this call can exist (placement only happens in
/// `try_schedule`).
pub fn advance_time(cluster: &mut Cluster, jobs: &mut JobSet, delta: u64) {
    cluster.now += delta;

    let running_ids: Vec<CompactString> = jobs
        .values()
        .filter(|j| j.state == JobState::Running)
        .map(|j| j.id.clone())
        .collect();

    for id in running_ids {
        let (done, node_id) = {
            let job = jobs.get_mut(&id).expect("running job must exist");
            job.remaining = job.remaining.saturating_sub(delta);
            (job.remaining == 0, job.assigned_node.clone())
        };

        if done {
            let node_id = node_id.expect("running job must have an assigned node");
            let node = cluster
                .node_mut(&node_id)
                .unwrap_or_else(|| panic!("job {id} references absent node {node_id}"));
            let job = jobs.get(&id).unwrap().clone();
            node.release(&job);

            let job = jobs.get_mut(&id).unwrap();
            job.state = JobState::Done;
            job.end_time = Some(cluster.now);
            job.assigned_node = None;
            tracing::debug!(job = %id, "job completed");
        }
    }
}

fn pending_job_ids(jobs: &JobSet) -> Vec<CompactString> {
    jobs.values()
        .filter(|j| j.state == JobState::Pending)
        .map(|j| j.id.clone())
        .collect()
}

fn order_fifo(jobs: &JobSet, mut ids: Vec<CompactString>) -> Vec<CompactString> {
    ids.sort_by(|a, b| {
        let ja = &jobs[a];
        let jb = &jobs[b];
        ja.submit_time.cmp(&jb.submit_time).then_with(|| a.cmp(b))
    });
    ids
}

fn order_priority(jobs: &JobSet, mut ids: Vec<CompactString>) -> Vec<CompactString> {
    ids.sort_by(|a, b| {
        let ja = &jobs[a];
        let jb = &jobs[b];
        jb.priority
            .cmp(&ja.priority)
            .then_with(|| ja.submit_time.cmp(&jb.submit_time))
            .then_with(|| a.cmp(b))
    });
    ids
}

/// Given an ordered job sequence, assigns each still-PENDING job to the first node (in
/// cluster insertion order) that fits it. No reordering, no lookahead.
fn greedy_place(cluster: &mut Cluster, jobs: &mut JobSet, ordered: &[CompactString]) {
    for id in ordered {
        let job = &jobs[id];
        if job.state != JobState::Pending {
            continue;
        }

        let target = cluster.nodes.iter().position(|n| n.can_fit(job));
        if let Some(idx) = target {
            let node = &mut cluster.nodes[idx];
            let job = jobs.get_mut(id).unwrap();
            node.assign(job);
            job.state = JobState::Running;
            job.start_time = Some(cluster.now);
            job.assigned_node = Some(node.id.clone());
            tracing::debug!(job = %id, node = %node.id, "placed job");
        }
    }
}

fn schedule_backfill(cluster: &mut Cluster, jobs: &mut JobSet, pending_ids: Vec<CompactString>) {
    let head_id = pending_ids
        .iter()
        .min_by(|a, b| {
            let ja = &jobs[*a];
            let jb = &jobs[*b];
            ja.submit_time.cmp(&jb.submit_time).then_with(|| a.cmp(b))
        })
        .cloned()
        .expect("pending_ids is non-empty");

    let others: Vec<CompactString> = pending_ids.into_iter().filter(|id| id != &head_id).collect();

    if cluster.nodes.iter().any(|n| n.can_fit(&jobs[&head_id])) {
        greedy_place(cluster, jobs, std::slice::from_ref(&head_id));
        let ordered_others = order_fifo(jobs, others);
        greedy_place(cluster, jobs, &ordered_others);
        return;
    }

    let head = &jobs[&head_id];
    if cluster.nodes.iter().all(|n| n.exceeds_capacity(head)) {
        tracing::debug!(job = %head_id, "head can never fit on any node");
        let ordered_others = order_fifo(jobs, others);
        greedy_place(cluster, jobs, &ordered_others);
        return;
    }

    let window = reservation_delta(cluster, jobs, head).expect("a hosting node exists");
    tracing::debug!(job = %head_id, window, "computed backfill window");

    let mut candidates = others;
    candidates.sort_by(|a, b| {
        let ja = &jobs[a];
        let jb = &jobs[b];
        ja.minutes
            .cmp(&jb.minutes)
            .then_with(|| ja.submit_time.cmp(&jb.submit_time))
            .then_with(|| a.cmp(b))
    });

    for id in candidates {
        if jobs[&id].minutes <= window {
            greedy_place(cluster, jobs, std::slice::from_ref(&id));
        }
    }
}

/// Earliest simulated-minute offset from `cluster.now` at which some node would have
/// enough free capacity for `head`, assuming currently RUNNING jobs complete exactly at
/// their `remaining` and no other jobs start. `None` if no node can ever host `head`.
fn reservation_delta(cluster: &Cluster, jobs: &JobSet, head: &Job) -> Option<u64> {
    let mut best: Option<u64> = None;

    for node in &cluster.nodes {
        if node.exceeds_capacity(head) {
            continue;
        }
        if node.can_fit(head) {
            return Some(0);
        }

        let mut events: Vec<(u64, u32, u32)> = node
            .running_jobs
            .iter()
            .map(|jid| {
                let j = &jobs[jid];
                (j.remaining, j.cpus, j.gpus)
            })
            .collect();
        events.sort_by_key(|(remaining, _, _)| *remaining);

        let (mut freed_cpus, mut freed_gpus) = (0u32, 0u32);
        for (remaining, cpus, gpus) in events {
            freed_cpus += cpus;
            freed_gpus += gpus;
            if node.free_cpus() + freed_cpus >= head.cpus
                && node.free_gpus() + freed_gpus >= head.gpus
            {
                best = Some(match best {
                    Some(b) => b.min(remaining),
                    None => remaining,
                });
                break;
            }
        }
    }

    best
}
