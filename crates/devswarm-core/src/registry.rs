use crate::error::{Result, SwarmError};
use crate::types::{ComplexityTier, CostTier, SpeedTier};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// AgentProfile
// ---------------------------------------------------------------------------

/// Static capability profile for one AI coding agent.
///
/// Keyword lists are lowercase and matched by substring containment against
/// lowercased task descriptions. Profiles are defined once at startup and
/// never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Unique handle, e.g. "@claude".
    pub handle: String,
    /// Human-readable name, e.g. "Claude (Anthropic)".
    pub name: String,
    pub languages: Vec<String>,
    /// "all" is a wildcard marker, never compared as a keyword.
    pub frameworks: Vec<String>,
    pub task_types: Vec<String>,
    pub complexity: ComplexityTier,
    pub speed: SpeedTier,
    pub cost: CostTier,
    /// Max simultaneous task assignments before the agent counts as overloaded.
    pub parallel_capacity: usize,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub best_for: Vec<String>,
}

/// Serializable slice of a profile for CLI rendering.
#[derive(Debug, Clone, Serialize)]
pub struct CapabilitySummary {
    pub handle: String,
    pub name: String,
    pub best_for: Vec<String>,
    pub strengths: Vec<String>,
    pub speed: SpeedTier,
    pub cost: CostTier,
    pub parallel_capacity: usize,
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// The canonical agent capability table. Declaration order is stable and
/// deterministic; router tie-breaking depends on it.
#[derive(Debug, Clone)]
pub struct Registry {
    profiles: Vec<AgentProfile>,
}

impl Registry {
    pub fn new(profiles: Vec<AgentProfile>) -> Self {
        Self { profiles }
    }

    /// The built-in capability matrix for the five known agents.
    pub fn builtin() -> Self {
        Self::new(vec![
            AgentProfile {
                handle: "@copilot".into(),
                name: "GitHub Copilot".into(),
                languages: strings(&[
                    "python",
                    "javascript",
                    "typescript",
                    "java",
                    "c#",
                    "go",
                    "ruby",
                ]),
                frameworks: strings(&[
                    "fastapi", "django", "flask", "express", "react", "vue", "spring",
                ]),
                task_types: strings(&[
                    "backend",
                    "api",
                    "crud",
                    "database",
                    "implementation",
                    "boilerplate",
                ]),
                complexity: ComplexityTier::All,
                speed: SpeedTier::Fastest,
                cost: CostTier::Free,
                parallel_capacity: 2,
                strengths: strings(&[
                    "Fast bulk code generation",
                    "Pattern recognition and replication",
                    "Boilerplate code creation",
                    "CRUD operations",
                    "API endpoint implementation",
                ]),
                weaknesses: strings(&[
                    "Complex architecture decisions",
                    "Security considerations",
                    "Performance optimization",
                ]),
                best_for: strings(&[
                    "Rapid prototyping",
                    "Backend API development",
                    "Database operations",
                    "Standard implementations",
                ]),
            },
            AgentProfile {
                handle: "@claude".into(),
                name: "Claude (Anthropic)".into(),
                languages: strings(&[
                    "python",
                    "javascript",
                    "typescript",
                    "go",
                    "rust",
                    "c++",
                    "java",
                ]),
                frameworks: strings(&["all"]),
                task_types: strings(&[
                    "architecture",
                    "security",
                    "integration",
                    "review",
                    "complex",
                    "design",
                ]),
                complexity: ComplexityTier::High,
                speed: SpeedTier::Medium,
                cost: CostTier::Medium,
                parallel_capacity: 1,
                strengths: strings(&[
                    "Complex architectural decisions",
                    "Security analysis and implementation",
                    "Code review and quality assurance",
                    "System design and integration",
                    "Strategic technical decisions",
                ]),
                weaknesses: strings(&[
                    "Slower for bulk code generation",
                    "Higher cost for simple tasks",
                ]),
                best_for: strings(&[
                    "Architecture design",
                    "Security reviews",
                    "Complex problem solving",
                    "Integration challenges",
                    "Code quality reviews",
                ]),
            },
            AgentProfile {
                handle: "@codex".into(),
                name: "OpenAI Codex".into(),
                languages: strings(&["javascript", "typescript", "html", "css", "python"]),
                frameworks: strings(&[
                    "react", "vue", "angular", "nextjs", "svelte", "tailwind",
                ]),
                task_types: strings(&[
                    "frontend",
                    "ui",
                    "components",
                    "interactive",
                    "styling",
                    "e2e-testing",
                ]),
                complexity: ComplexityTier::Medium,
                speed: SpeedTier::Fast,
                cost: CostTier::Free,
                parallel_capacity: 2,
                strengths: strings(&[
                    "Frontend component development",
                    "Interactive UI creation",
                    "CSS and styling",
                    "Browser-based testing",
                    "Responsive design",
                ]),
                weaknesses: strings(&[
                    "Backend architecture",
                    "Database design",
                    "System-level programming",
                ]),
                best_for: strings(&[
                    "React/Vue/Angular components",
                    "UI/UX implementation",
                    "Frontend testing",
                    "Interactive features",
                    "Design system implementation",
                ]),
            },
            AgentProfile {
                handle: "@qwen".into(),
                name: "Qwen (Alibaba)".into(),
                languages: strings(&["python", "javascript", "c++", "rust", "go"]),
                frameworks: strings(&[
                    "numpy",
                    "pandas",
                    "tensorflow",
                    "pytorch",
                    "scikit-learn",
                ]),
                task_types: strings(&[
                    "optimization",
                    "performance",
                    "algorithms",
                    "testing",
                    "analysis",
                ]),
                complexity: ComplexityTier::High,
                speed: SpeedTier::Medium,
                cost: CostTier::Low,
                parallel_capacity: 1,
                strengths: strings(&[
                    "Performance optimization",
                    "Algorithm implementation",
                    "Data structure optimization",
                    "Test generation and coverage",
                    "Benchmark creation",
                ]),
                weaknesses: strings(&["UI/UX development", "Creative design tasks"]),
                best_for: strings(&[
                    "Code optimization",
                    "Algorithm improvements",
                    "Performance tuning",
                    "Test suite creation",
                    "Data processing pipelines",
                ]),
            },
            AgentProfile {
                handle: "@gemini".into(),
                name: "Google Gemini".into(),
                languages: strings(&["markdown", "yaml", "json", "python", "javascript"]),
                frameworks: strings(&["documentation", "sphinx", "mkdocs", "docusaurus"]),
                task_types: strings(&[
                    "documentation",
                    "research",
                    "analysis",
                    "specs",
                    "planning",
                ]),
                complexity: ComplexityTier::Medium,
                speed: SpeedTier::Fast,
                cost: CostTier::Low,
                parallel_capacity: 1,
                strengths: strings(&[
                    "Documentation generation",
                    "Research and analysis",
                    "Spec writing",
                    "API documentation",
                    "Code explanation",
                ]),
                weaknesses: strings(&["Complex implementation", "Performance optimization"]),
                best_for: strings(&[
                    "README creation",
                    "API documentation",
                    "Research tasks",
                    "Spec refinement",
                    "Documentation updates",
                ]),
            },
        ])
    }

    /// Load a registry override from YAML (a sequence of profiles).
    /// Validates handle uniqueness and the capacity >= 1 invariant.
    pub fn from_yaml(text: &str) -> Result<Self> {
        let profiles: Vec<AgentProfile> = serde_yaml::from_str(text)?;
        for (i, profile) in profiles.iter().enumerate() {
            if profile.parallel_capacity < 1 {
                return Err(SwarmError::InvalidCapacity(profile.handle.clone()));
            }
            if profiles[..i].iter().any(|p| p.handle == profile.handle) {
                return Err(SwarmError::InvalidAgentHandle(profile.handle.clone()));
            }
        }
        Ok(Self::new(profiles))
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Profiles in declaration order.
    pub fn profiles(&self) -> impl Iterator<Item = &AgentProfile> {
        self.profiles.iter()
    }

    /// Handles in declaration order.
    pub fn handles(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|p| p.handle.as_str())
    }

    pub fn lookup(&self, handle: &str) -> Result<&AgentProfile> {
        self.profiles
            .iter()
            .find(|p| p.handle == handle)
            .ok_or_else(|| SwarmError::AgentNotFound(handle.to_string()))
    }

    pub fn summary(&self, handle: &str) -> Result<CapabilitySummary> {
        let profile = self.lookup(handle)?;
        Ok(CapabilitySummary {
            handle: profile.handle.clone(),
            name: profile.name.clone(),
            best_for: profile.best_for.clone(),
            strengths: profile.strengths.clone(),
            speed: profile.speed,
            cost: profile.cost,
            parallel_capacity: profile.parallel_capacity,
        })
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
