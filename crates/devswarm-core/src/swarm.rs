use crate::error::{Result, SwarmError};
use crate::task::Task;
use crate::types::{LogLevel, SwarmStatus, TaskStatus};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

fn swarm_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^swarm-\d{8}-[\w-]+$").expect("swarm id pattern compiles"))
}

// ---------------------------------------------------------------------------
// LogEntry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub agent: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    pub message: String,
    pub level: LogLevel,
}

// ---------------------------------------------------------------------------
// AgentSwarm
// ---------------------------------------------------------------------------

/// A named group of agents working a batch of tasks in parallel. The status
/// machine advances from task activity: deployed -> running once any task
/// starts, running -> completed once nothing is pending or in progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSwarm {
    /// "swarm-YYYYMMDD-<identifier>".
    pub id: String,
    pub agents: Vec<String>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    pub status: SwarmStatus,
    #[serde(default)]
    pub logs: Vec<LogEntry>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl AgentSwarm {
    pub fn new(id: impl Into<String>, agents: Vec<String>) -> Result<Self> {
        let id = id.into();
        if !swarm_id_re().is_match(&id) {
            return Err(SwarmError::InvalidSwarmId(id));
        }
        if agents.is_empty() {
            return Err(SwarmError::EmptySwarmAgents);
        }
        Ok(Self {
            id,
            agents,
            tasks: Vec::new(),
            status: SwarmStatus::Deployed,
            logs: Vec::new(),
            created_at: Utc::now(),
            completed_at: None,
        })
    }

    /// New swarm for a spec, id stamped with today's date.
    pub fn create_for_spec(spec_id: &str, agents: Vec<String>) -> Result<Self> {
        let id = format!("swarm-{}-{spec_id}", Utc::now().format("%Y%m%d"));
        let roster = agents.join(", ");
        let mut swarm = Self::new(id, agents)?;
        swarm.log_activity(
            "system",
            None,
            format!("Swarm created for spec {spec_id} with agents {roster}"),
            LogLevel::Info,
        );
        Ok(swarm)
    }

    /// Add a task; its assigned agent must be a swarm member.
    pub fn add_task(&mut self, task: Task) -> Result<()> {
        if !self.agents.contains(&task.assigned_agent) {
            return Err(SwarmError::AgentNotInSwarm {
                agent: task.assigned_agent.clone(),
                swarm: self.id.clone(),
            });
        }
        let agent = task.assigned_agent.clone();
        let task_id = task.id.clone();
        self.tasks.push(task);
        self.log_activity(
            &agent,
            Some(task_id.clone()),
            format!("Task {task_id} added to swarm"),
            LogLevel::Info,
        );
        Ok(())
    }

    pub fn tasks_for_agent(&self, agent: &str) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| t.assigned_agent == agent)
            .collect()
    }

    pub fn pending_tasks(&self) -> Vec<&Task> {
        self.tasks_with_status(TaskStatus::Pending)
    }

    pub fn in_progress_tasks(&self) -> Vec<&Task> {
        self.tasks_with_status(TaskStatus::InProgress)
    }

    pub fn completed_tasks(&self) -> Vec<&Task> {
        self.tasks_with_status(TaskStatus::Completed)
    }

    fn tasks_with_status(&self, status: TaskStatus) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.status == status).collect()
    }

    pub fn start_task(&mut self, task_id: &str) -> Result<()> {
        let task = self.find_task_mut(task_id)?;
        task.start()?;
        let agent = task.assigned_agent.clone();
        self.log_activity(
            &agent,
            Some(task_id.to_string()),
            format!("Task {task_id} started"),
            LogLevel::Info,
        );
        self.update_status();
        Ok(())
    }

    pub fn complete_task(&mut self, task_id: &str) -> Result<()> {
        let task = self.find_task_mut(task_id)?;
        task.complete()?;
        let agent = task.assigned_agent.clone();
        self.log_activity(
            &agent,
            Some(task_id.to_string()),
            format!("Task {task_id} completed"),
            LogLevel::Info,
        );
        self.update_status();
        Ok(())
    }

    pub fn log_activity(
        &mut self,
        agent: &str,
        task_id: Option<String>,
        message: String,
        level: LogLevel,
    ) {
        self.logs.push(LogEntry {
            timestamp: Utc::now(),
            agent: agent.to_string(),
            task_id,
            message,
            level,
        });
    }

    pub fn logs_for_agent(&self, agent: &str) -> Vec<&LogEntry> {
        self.logs.iter().filter(|l| l.agent == agent).collect()
    }

    pub fn logs_for_task(&self, task_id: &str) -> Vec<&LogEntry> {
        self.logs
            .iter()
            .filter(|l| l.task_id.as_deref() == Some(task_id))
            .collect()
    }

    pub fn is_running(&self) -> bool {
        self.status == SwarmStatus::Running
    }

    pub fn is_completed(&self) -> bool {
        self.status == SwarmStatus::Completed
    }

    /// Completion percentage across all tasks. An empty swarm is complete.
    pub fn progress_percentage(&self) -> f64 {
        if self.tasks.is_empty() {
            return 100.0;
        }
        self.completed_tasks().len() as f64 / self.tasks.len() as f64 * 100.0
    }

    fn find_task_mut(&mut self, task_id: &str) -> Result<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| SwarmError::TaskNotFound(task_id.to_string()))
    }

    fn update_status(&mut self) {
        if self.status == SwarmStatus::Deployed && !self.in_progress_tasks().is_empty() {
            self.status = SwarmStatus::Running;
        } else if self.status == SwarmStatus::Running
            && self.pending_tasks().is_empty()
            && self.in_progress_tasks().is_empty()
        {
            self.status = SwarmStatus::Completed;
            self.completed_at = Some(Utc::now());
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn swarm() -> AgentSwarm {
        AgentSwarm::create_for_spec("001-user-auth", vec!["@copilot".to_string()]).unwrap()
    }

    #[test]
    fn create_for_spec_stamps_date_and_logs() {
        let s = swarm();
        assert!(s.id.starts_with("swarm-"));
        assert!(s.id.ends_with("-001-user-auth"));
        assert_eq!(s.status, SwarmStatus::Deployed);
        assert_eq!(s.logs.len(), 1);
        assert_eq!(s.logs[0].agent, "system");
    }

    #[test]
    fn id_format_is_validated() {
        assert!(matches!(
            AgentSwarm::new("swarm-x", vec!["@a".to_string()]),
            Err(SwarmError::InvalidSwarmId(_))
        ));
        assert!(AgentSwarm::new("swarm-20260825-demo", vec!["@a".to_string()]).is_ok());
    }

    #[test]
    fn agents_must_be_non_empty() {
        assert!(matches!(
            AgentSwarm::new("swarm-20260825-demo", vec![]),
            Err(SwarmError::EmptySwarmAgents)
        ));
    }

    #[test]
    fn add_task_rejects_foreign_agents() {
        let mut s = swarm();
        let task = Task::new("T001", "UI work", "@codex").unwrap();
        assert!(matches!(
            s.add_task(task),
            Err(SwarmError::AgentNotInSwarm { .. })
        ));
    }

    #[test]
    fn task_activity_drives_status_machine() {
        let mut s = swarm();
        s.add_task(Task::new("T001", "First", "@copilot").unwrap())
            .unwrap();
        s.add_task(Task::new("T002", "Second", "@copilot").unwrap())
            .unwrap();
        assert_eq!(s.status, SwarmStatus::Deployed);

        s.start_task("T001").unwrap();
        assert!(s.is_running());

        s.complete_task("T001").unwrap();
        assert!(s.is_running(), "T002 still pending");

        s.start_task("T002").unwrap();
        s.complete_task("T002").unwrap();
        assert!(s.is_completed());
        assert!(s.completed_at.is_some());
    }

    #[test]
    fn progress_percentage_counts_completed() {
        let mut s = swarm();
        assert_eq!(s.progress_percentage(), 100.0);

        s.add_task(Task::new("T001", "One", "@copilot").unwrap())
            .unwrap();
        s.add_task(Task::new("T002", "Two", "@copilot").unwrap())
            .unwrap();
        assert_eq!(s.progress_percentage(), 0.0);

        s.start_task("T001").unwrap();
        s.complete_task("T001").unwrap();
        assert_eq!(s.progress_percentage(), 50.0);
    }

    #[test]
    fn unknown_task_id_fails() {
        let mut s = swarm();
        assert!(matches!(
            s.start_task("T999"),
            Err(SwarmError::TaskNotFound(_))
        ));
    }

    #[test]
    fn logs_are_queryable_by_agent_and_task() {
        let mut s = swarm();
        s.add_task(Task::new("T001", "Work", "@copilot").unwrap())
            .unwrap();
        s.start_task("T001").unwrap();

        assert_eq!(s.logs_for_agent("system").len(), 1);
        assert_eq!(s.logs_for_agent("@copilot").len(), 2);
        assert_eq!(s.logs_for_task("T001").len(), 2);
    }
}
