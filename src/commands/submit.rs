use crate::cli::SubmitArgs;
use crate::core::job::Job;
use crate::state;
use anyhow::{Context, Result};
use std::path::Path;

pub fn handle_submit(args: SubmitArgs, state_path: &Path) -> Result<()> {
    tracing::debug!(?args, "submit");

    let (cluster, mut jobs) = state::load(state_path)?;

    let job = Job::submit(
        args.name,
        args.cpus,
        args.gpus,
        args.minutes,
        args.priority,
        cluster.now,
        &jobs,
    )
    .context("invalid job demand")?;

    println!("Submitted {} (id={})", job.name, job.id);
    jobs.insert(job.id.clone(), job);

    state::save(state_path, &cluster, &jobs)?;
    tracing::info!("job submitted successfully");
    Ok(())
}
