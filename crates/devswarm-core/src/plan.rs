use crate::error::{Result, SwarmError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Targets and environments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeployTarget {
    Docker,
    Azure,
    Aws,
    Script,
}

impl DeployTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Docker => "docker",
            Self::Azure => "azure",
            Self::Aws => "aws",
            Self::Script => "script",
        }
    }

    /// Required config keys for this target.
    fn required_keys(&self) -> &'static [&'static str] {
        match self {
            Self::Docker => &["image_name", "container_port"],
            Self::Azure => &["resource_group", "app_service_name"],
            Self::Aws => &["region", "cluster_name"],
            Self::Script => &["script_path"],
        }
    }
}

impl fmt::Display for DeployTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DeployTarget {
    type Err = SwarmError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "docker" => Ok(Self::Docker),
            "azure" => Ok(Self::Azure),
            "aws" => Ok(Self::Aws),
            "script" => Ok(Self::Script),
            other => Err(SwarmError::InvalidDeployTarget(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    #[default]
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Staging => "staging",
            Self::Prod => "prod",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DeploymentPlan
// ---------------------------------------------------------------------------

/// How and where to ship the application: a target platform, an environment,
/// and target-specific settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentPlan {
    pub target: DeployTarget,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub config: BTreeMap<String, Value>,
    #[serde(default = "default_true")]
    pub rollback_enabled: bool,
}

fn default_true() -> bool {
    true
}

impl DeploymentPlan {
    pub fn new(target: DeployTarget, environment: Environment) -> Self {
        Self {
            target,
            environment,
            config: BTreeMap::new(),
            rollback_enabled: true,
        }
    }

    /// Working defaults for each target, suitable as a starting point.
    pub fn create_default(target: DeployTarget) -> Self {
        let mut plan = Self::new(target, Environment::Dev);
        plan.config = match target {
            DeployTarget::Docker => BTreeMap::from([
                ("image_name".to_string(), json!("devswarm-app")),
                ("container_port".to_string(), json!(8000)),
                ("host_port".to_string(), json!(8000)),
            ]),
            DeployTarget::Azure => BTreeMap::from([
                ("resource_group".to_string(), json!("devswarm-rg")),
                ("app_service_name".to_string(), json!("devswarm-app")),
            ]),
            DeployTarget::Aws => BTreeMap::from([
                ("region".to_string(), json!("us-east-1")),
                ("cluster_name".to_string(), json!("devswarm-cluster")),
            ]),
            DeployTarget::Script => {
                BTreeMap::from([("script_path".to_string(), json!("./deploy.sh"))])
            }
        };
        plan
    }

    pub fn config_str(&self, key: &str) -> Option<&str> {
        self.config.get(key).and_then(Value::as_str)
    }

    pub fn set_config(&mut self, key: impl Into<String>, value: Value) {
        self.config.insert(key.into(), value);
    }

    /// Check that every key the target needs is present.
    pub fn validate_config(&self) -> Result<()> {
        let missing: Vec<String> = self
            .target
            .required_keys()
            .iter()
            .filter(|k| !self.config.contains_key(**k))
            .map(|k| k.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(SwarmError::MissingDeployConfig {
                target: self.target.to_string(),
                keys: missing.join(", "),
            });
        }
        Ok(())
    }

    /// Shell commands to deploy (and roll back, when enabled) this plan.
    pub fn deployment_commands(&self) -> BTreeMap<String, String> {
        let mut commands = BTreeMap::new();
        match self.target {
            DeployTarget::Docker => {
                let image = self.config_str("image_name").unwrap_or("devswarm-app");
                let container_port = self
                    .config
                    .get("container_port")
                    .and_then(Value::as_u64)
                    .unwrap_or(8000);
                let host_port = self
                    .config
                    .get("host_port")
                    .and_then(Value::as_u64)
                    .unwrap_or(container_port);
                commands.insert("build".to_string(), format!("docker build -t {image} ."));
                commands.insert(
                    "run".to_string(),
                    format!("docker run -d -p {host_port}:{container_port} {image}"),
                );
                if self.rollback_enabled {
                    commands.insert(
                        "rollback".to_string(),
                        format!("docker stop $(docker ps -q --filter ancestor={image})"),
                    );
                }
            }
            DeployTarget::Azure => {
                let group = self.config_str("resource_group").unwrap_or_default();
                let app = self.config_str("app_service_name").unwrap_or_default();
                commands.insert(
                    "deploy".to_string(),
                    format!("az webapp up --name {app} --resource-group {group}"),
                );
                if self.rollback_enabled {
                    commands.insert(
                        "rollback".to_string(),
                        format!(
                            "az webapp deployment slot swap --slot staging --name {app} --resource-group {group}"
                        ),
                    );
                }
            }
            DeployTarget::Aws => {
                let region = self.config_str("region").unwrap_or("us-east-1");
                let cluster = self.config_str("cluster_name").unwrap_or_default();
                commands.insert(
                    "deploy".to_string(),
                    format!(
                        "aws ecs update-service --cluster {cluster} --service devswarm --force-new-deployment --region {region}"
                    ),
                );
                if self.rollback_enabled {
                    commands.insert(
                        "rollback".to_string(),
                        format!(
                            "aws ecs update-service --cluster {cluster} --service devswarm --task-definition devswarm-rollback --region {region}"
                        ),
                    );
                }
            }
            DeployTarget::Script => {
                if let Some(path) = self.config_str("script_path") {
                    commands.insert("deploy".to_string(), format!("bash {path}"));
                }
                if self.rollback_enabled {
                    if let Some(path) = self.config_str("rollback_script") {
                        commands.insert("rollback".to_string(), format!("bash {path}"));
                    }
                }
            }
        }
        commands
    }
}

// ---------------------------------------------------------------------------
// spec-init artifact
// ---------------------------------------------------------------------------

/// Everything `ops spec-init` writes to `deployment_plan.json`: the plan, a
/// CI/CD pipeline sketch, and the standing QA checklist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitArtifact {
    pub deployment_plan: DeploymentPlan,
    pub ci_cd_pipeline: Value,
    pub qa_checks: Vec<String>,
    pub status: String,
}

pub const QA_CHECKS: &[&str] = &[
    "linting",
    "type_checking",
    "unit_tests",
    "integration_tests",
    "security_scan",
    "performance_test",
];

impl InitArtifact {
    /// Default docker/dev artifact generated when a spec is initialized.
    pub fn for_spec() -> Self {
        let mut plan = DeploymentPlan::new(DeployTarget::Docker, Environment::Dev);
        plan.set_config("auto_rollback", json!(true));
        Self {
            deployment_plan: plan,
            ci_cd_pipeline: json!({
                "stages": ["test", "build", "deploy"],
                "jobs": {
                    "test": {"script": ["ops qa"]},
                    "build": {"script": ["ops build"]},
                    "deploy": {"script": ["ops deploy-plan"]},
                },
            }),
            qa_checks: QA_CHECKS.iter().map(|c| c.to_string()).collect(),
            status: "success".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn target_parses_from_str() {
        assert_eq!(DeployTarget::from_str("docker").unwrap(), DeployTarget::Docker);
        assert_eq!(DeployTarget::from_str("azure").unwrap(), DeployTarget::Azure);
        assert!(matches!(
            DeployTarget::from_str("heroku"),
            Err(SwarmError::InvalidDeployTarget(_))
        ));
    }

    #[test]
    fn default_plans_pass_validation() {
        for target in [
            DeployTarget::Docker,
            DeployTarget::Azure,
            DeployTarget::Aws,
            DeployTarget::Script,
        ] {
            DeploymentPlan::create_default(target).validate_config().unwrap();
        }
    }

    #[test]
    fn missing_docker_config_is_reported() {
        let plan = DeploymentPlan::new(DeployTarget::Docker, Environment::Dev);
        let err = plan.validate_config().unwrap_err();
        match err {
            SwarmError::MissingDeployConfig { target, keys } => {
                assert_eq!(target, "docker");
                assert!(keys.contains("image_name"));
                assert!(keys.contains("container_port"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn docker_commands_use_configured_ports() {
        let mut plan = DeploymentPlan::create_default(DeployTarget::Docker);
        plan.set_config("host_port", json!(9000));
        let commands = plan.deployment_commands();
        assert_eq!(
            commands.get("run").map(String::as_str),
            Some("docker run -d -p 9000:8000 devswarm-app")
        );
        assert!(commands.contains_key("rollback"));
    }

    #[test]
    fn rollback_commands_respect_flag() {
        let mut plan = DeploymentPlan::create_default(DeployTarget::Azure);
        plan.rollback_enabled = false;
        let commands = plan.deployment_commands();
        assert!(commands.contains_key("deploy"));
        assert!(!commands.contains_key("rollback"));
    }

    #[test]
    fn script_rollback_needs_a_script() {
        let plan = DeploymentPlan::create_default(DeployTarget::Script);
        // rollback_enabled but no rollback_script configured.
        assert!(!plan.deployment_commands().contains_key("rollback"));
    }

    #[test]
    fn init_artifact_has_pipeline_and_checks() {
        let artifact = InitArtifact::for_spec();
        assert_eq!(artifact.deployment_plan.target, DeployTarget::Docker);
        assert_eq!(artifact.qa_checks.len(), 6);
        assert_eq!(artifact.status, "success");
        assert_eq!(
            artifact.ci_cd_pipeline["stages"],
            json!(["test", "build", "deploy"])
        );
    }

    #[test]
    fn plan_serializes_with_snake_case_enums() {
        let plan = DeploymentPlan::create_default(DeployTarget::Aws);
        let value = serde_json::to_value(&plan).unwrap();
        assert_eq!(value["target"], "aws");
        assert_eq!(value["environment"], "dev");
        assert_eq!(value["rollback_enabled"], true);
    }
}
