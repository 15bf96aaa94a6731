use crate::error::{Result, SwarmError};
use crate::task::Task;
use crate::types::TaskStatus;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

fn spec_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{3}-[a-z-]+$").expect("spec id pattern compiles"))
}

fn title_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^#\s+(.+)$").expect("title pattern compiles"))
}

fn section_re(header: &str) -> Regex {
    // Section body runs until the next heading or end of file.
    Regex::new(&format!(r"(?s)## {header}\s*\n(.*?)(\n##|\n#|\z)"))
        .expect("section pattern compiles")
}

fn bullet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[-*]\s+(.+)").expect("bullet pattern compiles"))
}

const TESTABLE_KEYWORDS: &[&str] = &["should", "must", "can", "will"];

// ---------------------------------------------------------------------------
// Spec
// ---------------------------------------------------------------------------

/// A parsed feature specification: the `spec.md` of a spec-kit style
/// directory plus any tasks attached later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spec {
    /// Spec directory name, e.g. "001-user-auth".
    pub id: String,
    pub title: String,
    pub requirements: Vec<String>,
    pub acceptance_criteria: Vec<String>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Spec {
    /// Parse spec.md content. The id is the containing directory name.
    pub fn parse(id: &str, content: &str) -> Result<Self> {
        if !spec_id_re().is_match(id) {
            return Err(SwarmError::InvalidSpecId(id.to_string()));
        }

        let title = title_re()
            .captures(content)
            .map(|c| c[1].trim().to_string())
            .ok_or(SwarmError::MissingTitle)?;

        let requirements = section_bullets(content, "Requirements");
        if requirements.is_empty() {
            return Err(SwarmError::EmptyRequirements);
        }

        let acceptance_criteria = section_bullets(content, "Acceptance Criteria");
        if acceptance_criteria.is_empty() {
            return Err(SwarmError::EmptyAcceptanceCriteria);
        }
        for criterion in &acceptance_criteria {
            let lower = criterion.to_lowercase();
            if !TESTABLE_KEYWORDS.iter().any(|k| lower.contains(k)) {
                return Err(SwarmError::UntestableCriterion(criterion.clone()));
            }
        }

        Ok(Self {
            id: id.to_string(),
            title,
            requirements,
            acceptance_criteria,
            tasks: Vec::new(),
        })
    }

    /// Load `<dir>/spec.md`, deriving the id from the directory name.
    pub fn load(spec_dir: &Path) -> Result<Self> {
        let spec_file = spec_dir.join("spec.md");
        if !spec_file.exists() {
            return Err(SwarmError::SpecNotFound(spec_file.display().to_string()));
        }
        let id = spec_dir
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| SwarmError::InvalidSpecId(spec_dir.display().to_string()))?;
        let content = std::fs::read_to_string(&spec_file)?;
        Self::parse(id, &content)
    }

    pub fn add_task(&mut self, task: Task) {
        self.tasks.push(task);
    }

    pub fn tasks_for_agent(&self, agent: &str) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| t.assigned_agent == agent)
            .collect()
    }

    pub fn pending_tasks(&self) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Pending)
            .collect()
    }

    pub fn completed_tasks(&self) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .collect()
    }
}

fn section_bullets(content: &str, header: &str) -> Vec<String> {
    let Some(caps) = section_re(header).captures(content) else {
        return Vec::new();
    };
    bullet_re()
        .captures_iter(&caps[1])
        .map(|c| c[1].trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SPEC_MD: &str = "\
# User Authentication

Allow users to sign in.

## Requirements
- Email and password login
- OAuth with Google

## Acceptance Criteria
- Users can login with valid credentials
- Invalid passwords must be rejected
";

    #[test]
    fn parse_extracts_title_and_sections() {
        let spec = Spec::parse("001-user-auth", SPEC_MD).unwrap();
        assert_eq!(spec.title, "User Authentication");
        assert_eq!(spec.requirements.len(), 2);
        assert_eq!(spec.acceptance_criteria.len(), 2);
        assert!(spec.tasks.is_empty());
    }

    #[test]
    fn id_must_match_numbered_slug() {
        assert!(matches!(
            Spec::parse("user-auth", SPEC_MD),
            Err(SwarmError::InvalidSpecId(_))
        ));
        assert!(matches!(
            Spec::parse("01-auth", SPEC_MD),
            Err(SwarmError::InvalidSpecId(_))
        ));
    }

    #[test]
    fn title_is_required() {
        let content = "No heading here\n\n## Requirements\n- a thing\n";
        assert!(matches!(
            Spec::parse("001-x", content),
            Err(SwarmError::MissingTitle)
        ));
    }

    #[test]
    fn requirements_must_be_non_empty() {
        let content = "# Title\n\n## Acceptance Criteria\n- it should work\n";
        assert!(matches!(
            Spec::parse("001-x", content),
            Err(SwarmError::EmptyRequirements)
        ));
    }

    #[test]
    fn criteria_must_be_testable() {
        let content = "\
# Title

## Requirements
- a thing

## Acceptance Criteria
- nice colors
";
        assert!(matches!(
            Spec::parse("001-x", content),
            Err(SwarmError::UntestableCriterion(_))
        ));
    }

    #[test]
    fn load_reads_spec_md_from_directory() {
        let dir = TempDir::new().unwrap();
        let spec_dir = dir.path().join("002-checkout");
        std::fs::create_dir(&spec_dir).unwrap();
        std::fs::write(
            spec_dir.join("spec.md"),
            "# Checkout\n\n## Requirements\n- pay\n\n## Acceptance Criteria\n- users can pay\n",
        )
        .unwrap();

        let spec = Spec::load(&spec_dir).unwrap();
        assert_eq!(spec.id, "002-checkout");
        assert_eq!(spec.title, "Checkout");
    }

    #[test]
    fn load_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let spec_dir = dir.path().join("003-empty");
        std::fs::create_dir(&spec_dir).unwrap();
        assert!(matches!(
            Spec::load(&spec_dir),
            Err(SwarmError::SpecNotFound(_))
        ));
    }

    #[test]
    fn task_queries_filter_by_agent_and_status() {
        let mut spec = Spec::parse("001-user-auth", SPEC_MD).unwrap();
        spec.add_task(Task::new("T001", "API", "@copilot").unwrap());
        spec.add_task(Task::new("T002", "UI", "@codex").unwrap());
        let mut done = Task::new("T003", "Review", "@claude").unwrap();
        done.start().unwrap();
        done.complete().unwrap();
        spec.add_task(done);

        assert_eq!(spec.tasks_for_agent("@codex").len(), 1);
        assert_eq!(spec.pending_tasks().len(), 2);
        assert_eq!(spec.completed_tasks().len(), 1);
    }
}
