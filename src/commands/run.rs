use crate::cli::RunArgs;
use crate::config::Config;
use crate::core::scheduler::{self, Policy};
use crate::state;
use anyhow::{bail, Result};
use std::path::Path;

pub fn handle_run(args: RunArgs, state_path: &Path, config: &Config) -> Result<()> {
    let (mut cluster, mut jobs) = state::load(state_path)?;

    let nodes = args.nodes.unwrap_or(config.run.nodes);
    let cpus_per_node = args.cpus_per_node.unwrap_or(config.run.cpus_per_node);
    let gpus_per_node = args.gpus_per_node.unwrap_or(config.run.gpus_per_node);
    let policy = Policy::parse(args.policy.as_deref().unwrap_or(&config.run.policy));
    let tick = args.tick.unwrap_or(config.run.tick);
    let duration = args.duration.unwrap_or(config.run.duration);

    if tick == 0 {
        bail!("tick must be greater than zero");
    }

    if cluster.nodes.is_empty() {
        tracing::info!(nodes, cpus_per_node, gpus_per_node, "provisioning cluster");
        cluster.add_nodes(nodes, cpus_per_node, gpus_per_node);
    }

    let ticks = duration / tick;
    let dropped = duration % tick;
    if dropped != 0 {
        tracing::debug!(dropped, "trailing fractional interval dropped from run duration");
    }

    for _ in 0..ticks {
        scheduler::try_schedule(&mut cluster, &mut jobs, policy);
        scheduler::advance_time(&mut cluster, &mut jobs, tick);
    }

    state::save(state_path, &cluster, &jobs)?;
    println!("Ran {duration} minutes");
    tracing::info!(ticks, "run complete");
    Ok(())
}
