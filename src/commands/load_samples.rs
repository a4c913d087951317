use crate::cli::LoadSamplesArgs;
use crate::core::job::Job;
use crate::state;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize)]
struct SampleJob {
    name: String,
    minutes: u64,
    cpus: u32,
    #[serde(default)]
    gpus: u32,
    #[serde(default)]
    priority: i64,
}

pub fn handle_load_samples(args: LoadSamplesArgs, state_path: &Path) -> Result<()> {
    let (cluster, mut jobs) = state::load(state_path)?;

    let raw = std::fs::read_to_string(&args.path)
        .with_context(|| format!("failed to read sample file {}", args.path.display()))?;
    let samples: Vec<SampleJob> = serde_json::from_str(&raw)
        .with_context(|| format!("sample file {} is malformed", args.path.display()))?;

    let count = samples.len();
    for sample in samples {
        let job = Job::submit(
            sample.name,
            sample.cpus,
            sample.gpus,
            sample.minutes,
            sample.priority,
            cluster.now,
            &jobs,
        )
        .context("invalid job demand in sample file")?;
        jobs.insert(job.id.clone(), job);
    }

    state::save(state_path, &cluster, &jobs)?;
    println!("Loaded {count} jobs");
    tracing::info!(count, "samples loaded");
    Ok(())
}
