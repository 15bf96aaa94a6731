use crate::error::{Result, SwarmError};
use crate::types::TaskStatus;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

fn task_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^T\d{3}$").expect("task id pattern compiles"))
}

fn handle_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^@\w+$").expect("handle pattern compiles"))
}

fn checklist_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // "- [ ] T001 @agent Description"
    RE.get_or_init(|| {
        Regex::new(r"^-\s+\[\s*\]\s+(T\d{3})\s+(@\w+)\s+(.+)$").expect("checklist pattern compiles")
    })
}

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

/// One actionable checklist item from tasks.md, assigned to a single agent.
/// Status only moves forward: pending -> in_progress -> completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// "T" followed by exactly three digits, unique within a spec.
    pub id: String,
    pub description: String,
    /// "@name" handle, parsed from the source line or set by the router.
    pub assigned_agent: String,
    pub status: TaskStatus,
    /// Ids of tasks that must complete first. Resolution against the full
    /// task list happens at a higher layer.
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        assigned_agent: impl Into<String>,
    ) -> Result<Self> {
        let task = Self {
            id: id.into(),
            description: description.into(),
            assigned_agent: assigned_agent.into(),
            status: TaskStatus::Pending,
            dependencies: Vec::new(),
        };
        task.validate()?;
        Ok(task)
    }

    fn validate(&self) -> Result<()> {
        if !task_id_re().is_match(&self.id) {
            return Err(SwarmError::InvalidTaskId(self.id.clone()));
        }
        if !handle_re().is_match(&self.assigned_agent) {
            return Err(SwarmError::InvalidAgentHandle(self.assigned_agent.clone()));
        }
        for dep in &self.dependencies {
            if !task_id_re().is_match(dep) {
                return Err(SwarmError::InvalidDependency {
                    task: self.id.clone(),
                    dep: dep.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn with_dependencies(mut self, dependencies: Vec<String>) -> Result<Self> {
        self.dependencies = dependencies;
        self.validate()?;
        Ok(self)
    }

    /// Parse a strict checklist line: `- [ ] T001 @agent Description`.
    pub fn parse_line(line: &str) -> Result<Self> {
        let trimmed = line.trim();
        let caps = checklist_re()
            .captures(trimmed)
            .ok_or_else(|| SwarmError::InvalidTaskId(trimmed.to_string()))?;
        Task::new(&caps[1], caps[3].trim(), &caps[2])
    }

    /// Render back to the tasks.md checklist shape.
    pub fn to_line(&self) -> String {
        let marker = if self.status == TaskStatus::Completed {
            "x"
        } else {
            " "
        };
        format!(
            "- [{marker}] {} {} {}",
            self.id, self.assigned_agent, self.description
        )
    }

    /// True once every dependency appears in `completed_ids`.
    pub fn can_start(&self, completed_ids: &[String]) -> bool {
        self.dependencies.iter().all(|d| completed_ids.contains(d))
    }

    pub fn start(&mut self) -> Result<()> {
        if self.status != TaskStatus::Pending {
            return Err(self.bad_transition(TaskStatus::InProgress));
        }
        self.status = TaskStatus::InProgress;
        Ok(())
    }

    pub fn complete(&mut self) -> Result<()> {
        if self.status != TaskStatus::InProgress {
            return Err(self.bad_transition(TaskStatus::Completed));
        }
        self.status = TaskStatus::Completed;
        Ok(())
    }

    fn bad_transition(&self, to: TaskStatus) -> SwarmError {
        SwarmError::InvalidTransition {
            id: self.id.clone(),
            from: self.status.to_string(),
            to: to.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// tasks.md parsing
// ---------------------------------------------------------------------------

fn loose_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Lenient variant used for whole-file scans: agent tag optional,
    // optional [P] parallel marker tolerated.
    RE.get_or_init(|| {
        Regex::new(r"^-\s+\[[ x]\]\s+(T\d{3})(?:\s+\[P\])?(?:\s+(@\w+))?\s+(.+)$")
            .expect("loose task pattern compiles")
    })
}

/// Parse every well-formed checklist line in a tasks.md document. Malformed
/// lines are skipped silently; untagged tasks default to `@copilot`.
pub fn parse_tasks_md(content: &str) -> Vec<Task> {
    let mut tasks = Vec::new();
    for line in content.lines() {
        let trimmed = line.trim();
        let Some(caps) = loose_line_re().captures(trimmed) else {
            continue;
        };
        let agent = caps.get(2).map_or(crate::router::DEFAULT_AGENT, |m| m.as_str());
        match Task::new(&caps[1], caps[3].trim(), agent) {
            Ok(task) => tasks.push(task),
            Err(_) => continue,
        }
    }
    tasks
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_validates_id_and_handle() {
        assert!(Task::new("T001", "Build it", "@copilot").is_ok());
        assert!(matches!(
            Task::new("T1", "Build it", "@copilot"),
            Err(SwarmError::InvalidTaskId(_))
        ));
        assert!(matches!(
            Task::new("T001", "Build it", "copilot"),
            Err(SwarmError::InvalidAgentHandle(_))
        ));
    }

    #[test]
    fn dependencies_must_look_like_task_ids() {
        let task = Task::new("T002", "Follow-up", "@claude").unwrap();
        assert!(task
            .clone()
            .with_dependencies(vec!["T001".to_string()])
            .is_ok());
        assert!(matches!(
            task.with_dependencies(vec!["banana".to_string()]),
            Err(SwarmError::InvalidDependency { .. })
        ));
    }

    #[test]
    fn parse_line_roundtrip() {
        let task = Task::parse_line("- [ ] T001 @copilot Implement the endpoint").unwrap();
        assert_eq!(task.id, "T001");
        assert_eq!(task.assigned_agent, "@copilot");
        assert_eq!(task.description, "Implement the endpoint");
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.to_line(), "- [ ] T001 @copilot Implement the endpoint");
    }

    #[test]
    fn parse_line_rejects_garbage() {
        assert!(Task::parse_line("just words").is_err());
        assert!(Task::parse_line("- [ ] T1 @a short id").is_err());
    }

    #[test]
    fn completed_task_renders_checked_box() {
        let mut task = Task::new("T007", "Ship it", "@claude").unwrap();
        task.start().unwrap();
        task.complete().unwrap();
        assert!(task.to_line().starts_with("- [x] T007"));
    }

    #[test]
    fn status_moves_forward_only() {
        let mut task = Task::new("T001", "Work", "@qwen").unwrap();
        // Cannot complete before starting.
        assert!(matches!(
            task.complete(),
            Err(SwarmError::InvalidTransition { .. })
        ));
        task.start().unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);
        // Cannot start twice.
        assert!(task.start().is_err());
        task.complete().unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        // Terminal state.
        assert!(task.start().is_err());
        assert!(task.complete().is_err());
    }

    #[test]
    fn can_start_checks_dependencies() {
        let task = Task::new("T003", "Later", "@codex")
            .unwrap()
            .with_dependencies(vec!["T001".to_string(), "T002".to_string()])
            .unwrap();
        assert!(!task.can_start(&["T001".to_string()]));
        assert!(task.can_start(&["T001".to_string(), "T002".to_string()]));
    }

    #[test]
    fn parse_tasks_md_skips_malformed_and_defaults_agent() {
        let content = "\
# Tasks

- [ ] T001 @codex Build the dashboard UI
- [ ] T002 [P] Optimize the hot path
- [x] T003 @qwen Profile memory usage
not a task
- [ ] TX04 @claude bad id
";
        let tasks = parse_tasks_md(content);
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0].assigned_agent, "@codex");
        assert_eq!(tasks[1].assigned_agent, "@copilot");
        assert_eq!(tasks[1].description, "Optimize the hot path");
        assert_eq!(tasks[2].id, "T003");
    }
}
