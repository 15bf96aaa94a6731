use crate::cmd::read_tasks_md;
use crate::output::print_json;
use anyhow::Context;
use devswarm_core::io::write_json;
use devswarm_core::registry::Registry;
use devswarm_core::router::Router;
use devswarm_core::swarm::AgentSwarm;
use devswarm_core::task::parse_tasks_md;
use std::path::Path;

/// Parse tasks, build a swarm, and write `swarm_status.json`.
pub fn run(
    spec_path: &Path,
    agents: Option<&str>,
    registry: Registry,
    json: bool,
) -> anyhow::Result<()> {
    let content = read_tasks_md(spec_path)?;
    let mut tasks = parse_tasks_md(&content);
    if tasks.is_empty() {
        eprintln!("warning: no tasks found in tasks.md");
    }

    let spec_id = spec_path
        .file_name()
        .and_then(|n| n.to_str())
        .context("spec path has no directory name")?;

    let mut roster: Vec<String> = match agents {
        Some(list) => list
            .split(',')
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect(),
        None => {
            let descriptions: Vec<String> =
                tasks.iter().map(|t| t.description.clone()).collect();
            Router::new(registry).recommend_agents(&descriptions)
        }
    };
    if roster.is_empty() {
        roster.push(devswarm_core::router::DEFAULT_AGENT.to_string());
    }

    let mut swarm = AgentSwarm::create_for_spec(spec_id, roster)
        .context("failed to create swarm")?;
    // Tasks tagged with an agent outside the roster fall back to the first
    // member rather than failing the whole deploy.
    for task in tasks.iter_mut() {
        if !swarm.agents.contains(&task.assigned_agent) {
            task.assigned_agent = swarm.agents[0].clone();
        }
    }
    let tasks_assigned = tasks.len();
    for task in tasks {
        swarm.add_task(task)?;
    }

    let swarm_file = spec_path.join("swarm_status.json");
    write_json(
        &swarm_file,
        &serde_json::json!({
            "swarm_id": swarm.id,
            "agents": swarm.agents,
            "tasks_assigned": tasks_assigned,
            "status": swarm.status,
        }),
    )
    .context("failed to write swarm status")?;

    if json {
        print_json(&swarm)?;
    } else {
        println!("Swarm deployed: {}", swarm.id);
        println!("Agents: {}", swarm.agents.join(", "));
        println!("Tasks assigned: {tasks_assigned}");
        println!("Swarm status saved to {}", swarm_file.display());
    }
    Ok(())
}
