use crate::cmd::read_tasks_md;
use crate::output::{print_json, print_table};
use devswarm_core::registry::Registry;
use devswarm_core::router::Router;
use devswarm_core::task::parse_tasks_md;
use std::path::Path;

// ---------------------------------------------------------------------------
// recommend
// ---------------------------------------------------------------------------

pub fn recommend(description: &str, registry: Registry, json: bool) -> anyhow::Result<()> {
    let router = Router::new(registry);
    let handle = router.recommend_agent(description);

    if json {
        print_json(&serde_json::json!({
            "description": description,
            "agent": handle,
        }))?;
    } else {
        println!("{handle}");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// assign
// ---------------------------------------------------------------------------

pub fn assign(spec_path: &Path, registry: Registry, json: bool) -> anyhow::Result<()> {
    let content = read_tasks_md(spec_path)?;
    let descriptions: Vec<String> = parse_tasks_md(&content)
        .into_iter()
        .map(|t| t.description)
        .collect();
    if descriptions.is_empty() {
        anyhow::bail!("no tasks found in {}", spec_path.join("tasks.md").display());
    }

    let router = Router::new(registry);
    let assignments = router.recommend_agents_for_tasks(&descriptions);

    if json {
        print_json(&assignments)?;
    } else {
        let rows = assignments
            .iter()
            .flat_map(|(agent, tasks)| {
                tasks.iter().map(move |t| vec![agent.clone(), t.clone()])
            })
            .collect();
        print_table(&["AGENT", "TASK"], rows);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// balance
// ---------------------------------------------------------------------------

pub fn balance(spec_path: &Path, registry: Registry, json: bool) -> anyhow::Result<()> {
    let content = read_tasks_md(spec_path)?;
    let descriptions: Vec<String> = parse_tasks_md(&content)
        .into_iter()
        .map(|t| t.description)
        .collect();
    if descriptions.is_empty() {
        anyhow::bail!("no tasks found in {}", spec_path.join("tasks.md").display());
    }

    let router = Router::new(registry);
    let assignments = router.balance_workload(&descriptions);
    let workloads = router.agent_workload(&assignments);

    if json {
        print_json(&serde_json::json!({
            "assignments": assignments,
            "workloads": workloads,
        }))?;
    } else {
        let rows = assignments
            .iter()
            .map(|(agent, tasks)| {
                let load = workloads.get(agent).copied().unwrap_or(0.0);
                vec![
                    agent.clone(),
                    tasks.len().to_string(),
                    format!("{load:.0}%"),
                ]
            })
            .collect();
        print_table(&["AGENT", "TASKS", "LOAD"], rows);
    }
    Ok(())
}
