use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use devswarm_core::registry::Registry;

#[derive(Subcommand)]
pub enum AgentsSubcommand {
    /// List all agents in the registry
    List,

    /// Show one agent's capability summary
    Show {
        /// Agent handle, e.g. @claude
        handle: String,
    },
}

pub fn run(subcmd: AgentsSubcommand, registry: Registry, json: bool) -> anyhow::Result<()> {
    match subcmd {
        AgentsSubcommand::List => list(&registry, json),
        AgentsSubcommand::Show { handle } => show(&registry, &handle, json),
    }
}

fn list(registry: &Registry, json: bool) -> anyhow::Result<()> {
    if json {
        let summaries: Vec<_> = registry
            .handles()
            .map(|h| registry.summary(h))
            .collect::<Result<_, _>>()?;
        return print_json(&summaries);
    }

    let rows = registry
        .profiles()
        .map(|p| {
            vec![
                p.handle.clone(),
                p.name.clone(),
                p.speed.to_string(),
                p.cost.to_string(),
                p.parallel_capacity.to_string(),
            ]
        })
        .collect();
    print_table(&["HANDLE", "NAME", "SPEED", "COST", "CAPACITY"], rows);
    Ok(())
}

fn show(registry: &Registry, handle: &str, json: bool) -> anyhow::Result<()> {
    let summary = registry
        .summary(handle)
        .with_context(|| format!("unknown agent {handle}"))?;

    if json {
        return print_json(&summary);
    }

    println!("{} — {}", summary.handle, summary.name);
    println!("  speed:    {}", summary.speed);
    println!("  cost:     {}", summary.cost);
    println!("  capacity: {}", summary.parallel_capacity);
    if !summary.strengths.is_empty() {
        println!("  strengths: {}", summary.strengths.join(", "));
    }
    if !summary.best_for.is_empty() {
        println!("  best for:  {}", summary.best_for.join(", "));
    }
    Ok(())
}
