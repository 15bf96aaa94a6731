use crate::registry::Registry;
use crate::score::match_score;
use std::collections::BTreeMap;

/// Handle returned when nothing better can be decided (empty registry,
/// unparseable line, unknown file type).
pub const DEFAULT_AGENT: &str = "@copilot";

const MAX_REBALANCE_ITERATIONS: usize = 5;

/// Assignment mapping: agent handle -> task descriptions, in stable order.
pub type Assignments = BTreeMap<String, Vec<String>>;

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Routes tasks to agents by scoring each registered profile against the
/// task description. Holds no mutable state; every call is an independent
/// computation over the static registry.
#[derive(Debug, Clone, Default)]
pub struct Router {
    registry: Registry,
}

impl Router {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Best-scoring agent for a task description. Ties break in registry
    /// declaration order (first maximum wins). Falls back to
    /// [`DEFAULT_AGENT`] when the registry is empty.
    pub fn recommend_agent(&self, task_description: &str) -> String {
        let mut best: Option<(&str, f64)> = None;
        for profile in self.registry.profiles() {
            let score = match_score(task_description, profile);
            tracing::debug!(handle = %profile.handle, score, "scored task");
            match best {
                Some((_, top)) if score <= top => {}
                _ => best = Some((profile.handle.as_str(), score)),
            }
        }
        best.map(|(handle, _)| handle.to_string())
            .unwrap_or_else(|| DEFAULT_AGENT.to_string())
    }

    /// Recommend an agent for each task independently; no cross-task
    /// optimization. Handles with no assigned tasks are omitted.
    pub fn recommend_agents_for_tasks(&self, tasks: &[String]) -> Assignments {
        let mut assignments = Assignments::new();
        for task in tasks {
            let handle = self.recommend_agent(task);
            assignments.entry(handle).or_default().push(task.clone());
        }
        assignments
    }

    /// Workload percentage per agent: assigned count over parallel capacity,
    /// clamped to 100. A capacity of zero counts as fully saturated. Handles
    /// absent from the registry are skipped.
    pub fn agent_workload(&self, assignments: &Assignments) -> BTreeMap<String, f64> {
        let mut workloads = BTreeMap::new();
        for (handle, tasks) in assignments {
            let Ok(profile) = self.registry.lookup(handle) else {
                continue;
            };
            let ratio = if profile.parallel_capacity == 0 {
                f64::INFINITY
            } else {
                tasks.len() as f64 / profile.parallel_capacity as f64
            };
            workloads.insert(handle.clone(), (ratio * 100.0).min(100.0));
        }
        workloads
    }

    /// Balance assignments across agents, respecting parallel capacity.
    ///
    /// Greedy best-effort bin-packing: starting from the independent per-task
    /// assignment, each overloaded agent keeps its first `capacity` tasks and
    /// the overflow is re-homed to the first other agent (registry order)
    /// with spare capacity. Overflow that fits nowhere is dropped — callers
    /// must tolerate lost tasks. At most five passes.
    pub fn balance_workload(&self, tasks: &[String]) -> Assignments {
        let mut assignments = self.recommend_agents_for_tasks(tasks);

        for iteration in 0..MAX_REBALANCE_ITERATIONS {
            let overloaded: Vec<String> = self
                .registry
                .profiles()
                .filter(|p| {
                    assignments
                        .get(&p.handle)
                        .is_some_and(|t| t.len() > p.parallel_capacity)
                })
                .map(|p| p.handle.clone())
                .collect();
            if overloaded.is_empty() {
                break;
            }
            tracing::debug!(iteration, overloaded = overloaded.len(), "rebalancing");

            for handle in &overloaded {
                let capacity = self
                    .registry
                    .lookup(handle)
                    .map(|p| p.parallel_capacity)
                    .unwrap_or(0);
                let Some(assigned) = assignments.get_mut(handle) else {
                    continue;
                };
                let keep = capacity.min(assigned.len());
                let overflow = assigned.split_off(keep);

                for task in overflow {
                    let target = self.registry.profiles().find(|p| {
                        p.handle != *handle
                            && assignments.get(&p.handle).map_or(0, |t| t.len())
                                < p.parallel_capacity
                    });
                    match target {
                        Some(profile) => {
                            assignments
                                .entry(profile.handle.clone())
                                .or_default()
                                .push(task);
                        }
                        None => {
                            // No spare capacity anywhere: best-effort drop.
                            tracing::debug!(task = %task, "dropped task during rebalance");
                        }
                    }
                }
            }
        }

        assignments
    }

    /// Unique recommended handles for a batch of tasks, in registry order.
    pub fn recommend_agents(&self, tasks: &[String]) -> Vec<String> {
        let assignments = self.recommend_agents_for_tasks(tasks);
        self.registry
            .handles()
            .filter(|h| assignments.contains_key(*h))
            .map(str::to_string)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// File-type routing
// ---------------------------------------------------------------------------

/// Route a file path to an agent by extension and path fragments. Used when
/// no task description is available.
pub fn agent_for_file(file_path: &str) -> &'static str {
    let path = file_path.to_lowercase();

    // Frontend files
    if [".jsx", ".tsx", ".vue", ".svelte"].iter().any(|e| path.contains(e)) {
        return "@codex";
    }
    if ["/components/", "/pages/", "/ui/"].iter().any(|p| path.contains(p)) {
        return "@codex";
    }

    // Backend files
    if [".py", ".go", ".java", ".rb"].iter().any(|e| path.contains(e)) {
        return "@copilot";
    }
    if ["/api/", "/models/", "/services/"].iter().any(|p| path.contains(p)) {
        return "@copilot";
    }

    // Test files
    if ["test_", "_test.", ".test.", ".spec."].iter().any(|p| path.contains(p)) {
        if [".jsx", ".tsx", ".js", ".ts"].iter().any(|e| path.contains(e)) {
            return "@codex";
        }
        return "@qwen";
    }

    // Documentation files
    if [".md", ".rst", ".txt"].iter().any(|e| path.contains(e)) {
        return "@gemini";
    }

    // Architecture and design files
    if ["architecture", "design", "schema"].iter().any(|p| path.contains(p)) {
        return "@claude";
    }

    DEFAULT_AGENT
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{AgentProfile, Registry};
    use crate::types::{ComplexityTier, CostTier, SpeedTier};

    fn tiny_profile(handle: &str, task_types: &[&str], capacity: usize) -> AgentProfile {
        AgentProfile {
            handle: handle.to_string(),
            name: handle.trim_start_matches('@').to_string(),
            languages: vec![],
            frameworks: vec![],
            task_types: task_types.iter().map(|s| s.to_string()).collect(),
            complexity: ComplexityTier::All,
            speed: SpeedTier::Medium,
            cost: CostTier::Free,
            parallel_capacity: capacity,
            strengths: vec![],
            weaknesses: vec![],
            best_for: vec![],
        }
    }

    #[test]
    fn recommend_agent_is_deterministic() {
        let router = Router::default();
        let desc = "Build React components with interactive animations";
        let first = router.recommend_agent(desc);
        for _ in 0..10 {
            assert_eq!(router.recommend_agent(desc), first);
        }
        assert_eq!(first, "@codex");
    }

    #[test]
    fn empty_registry_falls_back_to_default() {
        let router = Router::new(Registry::new(vec![]));
        assert_eq!(router.recommend_agent("anything"), DEFAULT_AGENT);
    }

    #[test]
    fn tie_breaks_in_registry_order() {
        let registry = Registry::new(vec![
            tiny_profile("@first", &["widget"], 1),
            tiny_profile("@second", &["widget"], 1),
        ]);
        let router = Router::new(registry);
        // Both score 10; the first maximum encountered wins.
        assert_eq!(router.recommend_agent("build a widget"), "@first");
    }

    #[test]
    fn batch_recommendation_omits_idle_agents() {
        let router = Router::default();
        let tasks = vec!["Build React components".to_string()];
        let assignments = router.recommend_agents_for_tasks(&tasks);
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments["@codex"], tasks);
    }

    #[test]
    fn empty_task_list_yields_empty_assignments() {
        let router = Router::default();
        assert!(router.recommend_agents_for_tasks(&[]).is_empty());
        assert!(router.balance_workload(&[]).is_empty());
    }

    #[test]
    fn workload_is_percentage_of_capacity() {
        let router = Router::default();
        let mut assignments = Assignments::new();
        assignments.insert("@copilot".to_string(), vec!["a".to_string()]); // capacity 2
        let workloads = router.agent_workload(&assignments);
        assert_eq!(workloads["@copilot"], 50.0);
    }

    #[test]
    fn workload_never_exceeds_one_hundred() {
        let router = Router::default();
        let mut assignments = Assignments::new();
        assignments.insert(
            "@claude".to_string(),
            (0..40).map(|i| format!("task {i}")).collect(),
        );
        let workloads = router.agent_workload(&assignments);
        assert!(workloads.values().all(|&w| w <= 100.0));
        assert_eq!(workloads["@claude"], 100.0);
    }

    #[test]
    fn zero_capacity_counts_as_saturated() {
        let registry = Registry::new(vec![tiny_profile("@stuck", &["thing"], 0)]);
        let router = Router::new(registry);
        let mut assignments = Assignments::new();
        assignments.insert("@stuck".to_string(), vec!["do thing".to_string()]);
        let workloads = router.agent_workload(&assignments);
        assert_eq!(workloads["@stuck"], 100.0);
    }

    #[test]
    fn unknown_handle_skipped_in_workload() {
        let router = Router::default();
        let mut assignments = Assignments::new();
        assignments.insert("@nobody".to_string(), vec!["x".to_string()]);
        assert!(router.agent_workload(&assignments).is_empty());
    }

    #[test]
    fn balance_redistributes_overflow_and_drops_remainder() {
        // One magnet agent (capacity 1) attracts all 10 tasks; two spill
        // agents with capacity 2 each absorb 4; the remaining 5 are dropped.
        let registry = Registry::new(vec![
            tiny_profile("@magnet", &["magnet"], 1),
            tiny_profile("@spill-a", &[], 2),
            tiny_profile("@spill-b", &[], 2),
        ]);
        let router = Router::new(registry);
        let tasks: Vec<String> = (0..10).map(|i| format!("magnet task {i}")).collect();

        let balanced = router.balance_workload(&tasks);
        assert_eq!(balanced["@magnet"].len(), 1);
        assert_eq!(balanced["@magnet"][0], "magnet task 0");
        assert_eq!(balanced["@spill-a"].len(), 2);
        assert_eq!(balanced["@spill-b"].len(), 2);

        let total: usize = balanced.values().map(Vec::len).sum();
        assert_eq!(total, 5, "5 tasks survive, 5 dropped, none duplicated");

        let workloads = router.agent_workload(&balanced);
        assert!(workloads.values().all(|&w| w <= 100.0));
    }

    #[test]
    fn balance_keeps_original_order_for_retained_prefix() {
        let registry = Registry::new(vec![
            tiny_profile("@magnet", &["magnet"], 2),
            tiny_profile("@other", &[], 8),
        ]);
        let router = Router::new(registry);
        let tasks: Vec<String> = (0..5).map(|i| format!("magnet {i}")).collect();

        let balanced = router.balance_workload(&tasks);
        assert_eq!(balanced["@magnet"], vec!["magnet 0", "magnet 1"]);
        assert_eq!(balanced["@other"], vec!["magnet 2", "magnet 3", "magnet 4"]);
    }

    #[test]
    fn balance_is_noop_when_nobody_is_overloaded() {
        let router = Router::default();
        let tasks = vec!["Build React components".to_string()];
        let balanced = router.balance_workload(&tasks);
        assert_eq!(balanced, router.recommend_agents_for_tasks(&tasks));
    }

    #[test]
    fn recommend_agents_returns_registry_order() {
        let router = Router::default();
        let tasks = vec![
            "Write documentation for the api reference".to_string(),
            "Build React components".to_string(),
        ];
        let agents = router.recommend_agents(&tasks);
        // Registry order is @copilot, @claude, @codex, @qwen, @gemini —
        // whichever of these got tasks must appear in that relative order.
        let registry = Registry::builtin();
        let handles: Vec<&str> = registry.handles().collect();
        let order: Vec<usize> = agents
            .iter()
            .map(|a| handles.iter().position(|h| h == a).unwrap())
            .collect();
        let mut sorted = order.clone();
        sorted.sort_unstable();
        assert_eq!(order, sorted);
    }

    #[test]
    fn file_routing_table() {
        assert_eq!(agent_for_file("src/components/Button.tsx"), "@codex");
        assert_eq!(agent_for_file("app/api/handlers.py"), "@copilot");
        assert_eq!(agent_for_file("tests/test_router.rs"), "@qwen");
        assert_eq!(agent_for_file("docs/README.md"), "@gemini");
        assert_eq!(agent_for_file("architecture-notes"), "@claude");
        assert_eq!(agent_for_file("Makefile"), DEFAULT_AGENT);
    }
}
