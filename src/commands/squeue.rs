use crate::cli::SqueueArgs;
use crate::core::job::{Job, JobState};
use crate::state;
use anyhow::Result;
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use std::path::Path;
use tabled::builder::Builder;
use tabled::settings::Style;

pub fn handle_squeue(args: SqueueArgs, state_path: &Path) -> Result<()> {
    let (cluster, jobs) = state::load(state_path)?;

    let mut ordered: Vec<&Job> = jobs.values().collect();
    ordered.sort_by(|a, b| a.id.cmp(&b.id));
    let count = ordered.len();

    if args.plain || !std::io::stdout().is_terminal() {
        println!("== Time: {} min ==", cluster.now);
        for job in ordered {
            println!(
                "{} {} {} rem={}m node={}",
                job.id,
                job.state,
                job.name,
                job.remaining,
                job.assigned_node.as_deref().unwrap_or("-"),
            );
        }
        tracing::info!(count, "squeue listing printed");
        return Ok(());
    }

    println!("{}", format!("== Time: {} min ==", cluster.now).bold());
    let mut builder = Builder::default();
    builder.push_record(["ID", "STATE", "NAME", "REM", "NODE"]);
    for job in ordered {
        builder.push_record([
            job.id.to_string(),
            colorize_state(job.state),
            job.name.to_string(),
            format!("{}m", job.remaining),
            job.assigned_node.as_deref().unwrap_or("-").to_string(),
        ]);
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    println!("{table}");
    tracing::info!(count, "squeue listing printed");
    Ok(())
}

fn colorize_state(state: JobState) -> String {
    match state {
        JobState::Pending => state.to_string().yellow().to_string(),
        JobState::Running => state.to_string().green().to_string(),
        JobState::Done => state.to_string().blue().to_string(),
        JobState::Canceled => state.to_string().red().to_string(),
    }
}
