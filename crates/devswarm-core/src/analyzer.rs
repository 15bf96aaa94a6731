use crate::classify::{classify, deployment_targets};
use crate::error::{Result, SwarmError};
use crate::router::Router;
use crate::score::contains_any;
use crate::types::Complexity;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// SpecAnalysis
// ---------------------------------------------------------------------------

/// Requirement categories and flags scanned out of spec text.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RequirementFlags {
    pub functional: Vec<String>,
    pub non_functional: Vec<String>,
    pub security: bool,
    pub performance: bool,
    pub accessibility: bool,
    pub i18n: bool,
}

/// Aggregated analysis of one spec directory. Constructed fresh per
/// invocation; callers may serialize it but the core never persists it.
#[derive(Debug, Clone, Serialize)]
pub struct SpecAnalysis {
    pub spec_path: PathBuf,
    pub title: String,
    pub description: String,
    pub components_needed: Vec<String>,
    pub stack_detected: BTreeMap<String, String>,
    pub agents_recommended: Vec<String>,
    pub deployment_targets: Vec<String>,
    pub requirements: RequirementFlags,
    pub tasks_count: usize,
    pub complexity: Complexity,
    pub estimated_effort: String,
}

impl SpecAnalysis {
    fn empty(spec_path: PathBuf) -> Self {
        Self {
            spec_path,
            title: String::new(),
            description: String::new(),
            components_needed: Vec::new(),
            stack_detected: BTreeMap::new(),
            agents_recommended: Vec::new(),
            deployment_targets: Vec::new(),
            requirements: RequirementFlags::default(),
            tasks_count: 0,
            complexity: Complexity::Medium,
            estimated_effort: Complexity::Medium.estimated_effort().to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// SpecAnalyzer
// ---------------------------------------------------------------------------

fn task_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^- \[([ x])\] T\d+").expect("task line pattern compiles"))
}

fn handle_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@(\w+)").expect("handle pattern compiles"))
}

fn task_description_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // "- [ ] T001 [P] @agent Description in path/to/file"
    RE.get_or_init(|| {
        Regex::new(r"@\w+\s+(.+?)(?:\s+in\s+\S+)?$").expect("description pattern compiles")
    })
}

/// Analyzes a spec directory (spec.md, tasks.md, plan.md) into a single
/// [`SpecAnalysis`]. Every input file is optional; a missing file skips its
/// contribution instead of failing.
#[derive(Debug, Clone, Default)]
pub struct SpecAnalyzer {
    router: Router,
}

impl SpecAnalyzer {
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    pub fn analyze(&self, spec_path: &Path) -> Result<SpecAnalysis> {
        if spec_path.as_os_str().is_empty() {
            return Err(SwarmError::EmptySpecPath);
        }

        let mut analysis = SpecAnalysis::empty(spec_path.to_path_buf());

        let spec_file = spec_path.join("spec.md");
        if spec_file.exists() {
            let content = std::fs::read_to_string(&spec_file)?;
            self.analyze_content(&content, &mut analysis);
        }

        let tasks_file = spec_path.join("tasks.md");
        if tasks_file.exists() {
            let content = std::fs::read_to_string(&tasks_file)?;
            self.analyze_tasks(&content, &mut analysis);
        }

        let plan_file = spec_path.join("plan.md");
        if plan_file.exists() {
            let content = std::fs::read_to_string(&plan_file)?;
            enhance_from_plan(&content, &mut analysis);
        }

        // Deployment targets are never empty, even with no spec.md at all.
        if analysis.deployment_targets.is_empty() {
            analysis.deployment_targets.push("docker".to_string());
        }

        calculate_complexity(&mut analysis);
        tracing::debug!(
            title = %analysis.title,
            complexity = %analysis.complexity,
            tasks = analysis.tasks_count,
            "spec analyzed"
        );
        Ok(analysis)
    }

    fn analyze_content(&self, content: &str, analysis: &mut SpecAnalysis) {
        // Title: first top-level heading.
        for line in content.lines() {
            if let Some(title) = line.strip_prefix("# ") {
                analysis.title = title.trim().to_string();
                break;
            }
        }

        // Description: first contiguous run of non-empty, non-heading lines
        // after the first line.
        let mut description_lines = Vec::new();
        let mut in_paragraph = false;
        for line in content.lines().skip(1) {
            if !line.trim().is_empty() && !line.starts_with('#') {
                in_paragraph = true;
                description_lines.push(line.trim());
            } else if in_paragraph && line.trim().is_empty() {
                break;
            }
        }
        analysis.description = description_lines.join(" ");

        let classification = classify(content);
        analysis.components_needed = classification.components;
        analysis.stack_detected = classification.stack;
        analysis.deployment_targets = deployment_targets(content, &analysis.stack_detected);
        analysis.requirements = extract_requirements(content);
    }

    fn analyze_tasks(&self, content: &str, analysis: &mut SpecAnalysis) {
        let mut task_lines = Vec::new();
        let mut mentions = BTreeSet::new();

        for line in content.lines() {
            if task_line_re().is_match(line) {
                analysis.tasks_count += 1;
                task_lines.push(line);
                if let Some(cap) = handle_re().captures(line) {
                    mentions.insert(format!("@{}", &cap[1]));
                }
            }
        }

        if !mentions.is_empty() {
            // Explicit mentions take precedence over inference.
            analysis.agents_recommended = mentions.into_iter().collect();
        } else {
            let descriptions: Vec<String> = task_lines
                .iter()
                .map(|line| extract_task_description(line))
                .collect();
            analysis.agents_recommended = self.router.recommend_agents(&descriptions);
        }
    }
}

/// Strip the checklist prefix and trailing "in path" clause, keeping the
/// free-text description. Lines without an agent mention pass through whole.
fn extract_task_description(task_line: &str) -> String {
    match task_description_re().captures(task_line) {
        Some(cap) => cap[1].to_string(),
        None => task_line.to_string(),
    }
}

/// Additive hints from plan.md: certain topics guarantee a specialist is on
/// the recommendation list. Never removes previously recommended agents.
fn enhance_from_plan(content: &str, analysis: &mut SpecAnalysis) {
    let lower = content.to_lowercase();

    let hints: [(&[&str], &str); 3] = [
        (&["performance", "fast", "speed", "optimiz"], "@qwen"),
        (&["security", "auth", "encrypt", "secure"], "@claude"),
        (&["ui", "frontend", "react", "component", "interactive"], "@codex"),
    ];
    for (keywords, handle) in hints {
        if contains_any(&lower, keywords)
            && !analysis.agents_recommended.iter().any(|a| a == handle)
        {
            analysis.agents_recommended.push(handle.to_string());
        }
    }
}

fn extract_requirements(content: &str) -> RequirementFlags {
    let mut flags = RequirementFlags::default();

    let mut in_requirements = false;
    let mut non_functional = false;
    for line in content.lines() {
        let lower = line.to_lowercase();
        if lower.contains("requirement") {
            in_requirements = true;
        } else if in_requirements && line.starts_with('-') {
            if lower.contains("non-functional") {
                non_functional = true;
            } else if lower.contains("functional") {
                non_functional = false;
            } else {
                let text = line[1..].trim().to_string();
                if non_functional {
                    flags.non_functional.push(text);
                } else {
                    flags.functional.push(text);
                }
            }
        }
    }

    let lower = content.to_lowercase();
    flags.security = contains_any(&lower, &["security", "auth", "encrypt"]);
    flags.performance = contains_any(&lower, &["performance", "fast", "optimiz"]);
    flags.accessibility = contains_any(&lower, &["accessibility", "a11y", "wcag"]);
    flags.i18n = contains_any(&lower, &["i18n", "international", "localization"]);
    flags
}

/// Weighted complexity score with fixed constants: 2 per component, a task
/// bucket (1 if <20, 3 if <50, else 5), 1.5 per stack category, 2 each for
/// security/performance, 1 each for accessibility/i18n. Thresholds are
/// lower-bound inclusive: score < 5 is low, < 15 medium, otherwise high.
fn calculate_complexity(analysis: &mut SpecAnalysis) {
    let mut score = analysis.components_needed.len() as f64 * 2.0;

    score += if analysis.tasks_count < 20 {
        1.0
    } else if analysis.tasks_count < 50 {
        3.0
    } else {
        5.0
    };

    score += analysis.stack_detected.len() as f64 * 1.5;

    if analysis.requirements.security {
        score += 2.0;
    }
    if analysis.requirements.performance {
        score += 2.0;
    }
    if analysis.requirements.accessibility {
        score += 1.0;
    }
    if analysis.requirements.i18n {
        score += 1.0;
    }

    analysis.complexity = if score < 5.0 {
        Complexity::Low
    } else if score < 15.0 {
        Complexity::Medium
    } else {
        Complexity::High
    };
    analysis.estimated_effort = analysis.complexity.estimated_effort().to_string();
}

// ---------------------------------------------------------------------------
// Report rendering
// ---------------------------------------------------------------------------

/// Human-readable markdown report for an analysis.
pub fn render_report(analysis: &SpecAnalysis, router: &Router) -> String {
    let mut report = Vec::new();
    report.push(format!("# Spec Analysis Report: {}\n", analysis.title));
    report.push(format!("**Path**: {}", analysis.spec_path.display()));
    report.push(format!("**Description**: {}\n", analysis.description));

    report.push("## Detected Technology Stack".to_string());
    for (category, tech) in &analysis.stack_detected {
        report.push(format!("- **{category}**: {tech}"));
    }

    report.push("\n## Required Components".to_string());
    for component in &analysis.components_needed {
        report.push(format!("- {component}"));
    }

    report.push("\n## Recommended Agents".to_string());
    for handle in &analysis.agents_recommended {
        match router.registry().summary(handle) {
            Ok(summary) => {
                let best_for = summary
                    .best_for
                    .iter()
                    .take(2)
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ");
                report.push(format!("- **{handle}**: {} - Best for {best_for}", summary.name));
            }
            Err(_) => report.push(format!("- {handle}")),
        }
    }

    report.push("\n## Deployment Targets".to_string());
    for target in &analysis.deployment_targets {
        report.push(format!("- {target}"));
    }

    report.push("\n## Project Metrics".to_string());
    report.push(format!("- **Tasks Count**: {}", analysis.tasks_count));
    report.push(format!("- **Complexity**: {}", analysis.complexity));
    report.push(format!("- **Estimated Effort**: {}", analysis.estimated_effort));

    let flags = &analysis.requirements;
    if flags.security || flags.performance || flags.accessibility || flags.i18n {
        report.push("\n## Requirements".to_string());
        if flags.security {
            report.push("- Security requirements detected".to_string());
        }
        if flags.performance {
            report.push("- Performance requirements detected".to_string());
        }
        if flags.accessibility {
            report.push("- Accessibility requirements detected".to_string());
        }
        if flags.i18n {
            report.push("- Internationalization requirements detected".to_string());
        }
    }

    report.join("\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
