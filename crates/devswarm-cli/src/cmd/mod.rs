pub mod agent;
pub mod analyze;
pub mod route;
pub mod spec_init;
pub mod swarm;

use anyhow::Context;
use devswarm_core::registry::Registry;
use std::path::Path;

/// Built-in five-agent registry, or the YAML override when given.
pub fn load_registry(agents_file: Option<&Path>) -> anyhow::Result<Registry> {
    match agents_file {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read agents file {}", path.display()))?;
            Registry::from_yaml(&text).context("invalid agents file")
        }
        None => Ok(Registry::builtin()),
    }
}

/// Read `<spec-path>/tasks.md`, failing with a pointed message if absent.
pub fn read_tasks_md(spec_path: &Path) -> anyhow::Result<String> {
    let tasks_file = spec_path.join("tasks.md");
    std::fs::read_to_string(&tasks_file)
        .with_context(|| format!("failed to read {}", tasks_file.display()))
}
