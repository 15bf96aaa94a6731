use thiserror::Error;

#[derive(Debug, Error)]
pub enum SwarmError {
    #[error("agent not found: {0}")]
    AgentNotFound(String),

    #[error("invalid task id '{0}': must match T###")]
    InvalidTaskId(String),

    #[error("invalid agent handle '{0}': must match @name")]
    InvalidAgentHandle(String),

    #[error("invalid dependency '{dep}' on task {task}: must match T###")]
    InvalidDependency { task: String, dep: String },

    #[error("invalid transition for task {id}: {from} -> {to}")]
    InvalidTransition {
        id: String,
        from: String,
        to: String,
    },

    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("invalid spec id '{0}': must match ###-feature-name")]
    InvalidSpecId(String),

    #[error("spec file not found: {0}")]
    SpecNotFound(String),

    #[error("spec path must not be empty")]
    EmptySpecPath,

    #[error("spec must have a title (H1 heading)")]
    MissingTitle,

    #[error("spec requirements must be non-empty")]
    EmptyRequirements,

    #[error("spec acceptance criteria must be non-empty")]
    EmptyAcceptanceCriteria,

    #[error("acceptance criterion is not testable: {0}")]
    UntestableCriterion(String),

    #[error("invalid swarm id '{0}': must match swarm-YYYYMMDD-name")]
    InvalidSwarmId(String),

    #[error("swarm agents list must be non-empty")]
    EmptySwarmAgents,

    #[error("agent {agent} is not a member of swarm {swarm}")]
    AgentNotInSwarm { agent: String, swarm: String },

    #[error("invalid capacity for agent {0}: must be at least 1")]
    InvalidCapacity(String),

    #[error("unsupported deployment target: {0}")]
    InvalidDeployTarget(String),

    #[error("missing required config for {target} deployment: {keys}")]
    MissingDeployConfig { target: String, keys: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SwarmError>;
