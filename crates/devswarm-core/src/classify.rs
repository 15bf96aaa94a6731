use crate::score::contains_any;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Pattern tables
// ---------------------------------------------------------------------------

/// Component detection patterns, in canonical declaration order. Output
/// follows this order, not text occurrence order. Word-boundary anchors keep
/// short fragments from matching inside arbitrary words.
const COMPONENT_PATTERNS: &[(&str, &[&str])] = &[
    (
        "multiagent-auth",
        &[
            r"\bauth(?:entication|orization)\b",
            r"\blogin\b",
            r"\bpassword\b",
            r"\boauth\b",
            r"\bjwt\b",
            r"\bsession\b",
            r"\buser\s+management\b",
            r"\baccess\s+control\b",
        ],
    ),
    (
        "multiagent-payments",
        &[
            r"\bpayment\b",
            r"\bstripe\b",
            r"\bpaypal\b",
            r"\bsubscription\b",
            r"\bbilling\b",
            r"\binvoice\b",
            r"\brefund\b",
            r"\btransaction\b",
        ],
    ),
    (
        "multiagent-testing",
        &[
            r"\btest(?:ing)?\b",
            r"\bqa\b",
            r"\bquality\s+assurance\b",
            r"\bcoverage\b",
            r"\be2e\b",
            r"\bintegration\s+test\b",
        ],
    ),
    (
        "multiagent-websockets",
        &[
            r"\breal[\s-]?time\b",
            r"\bwebsocket\b",
            r"\blive\s+update\b",
            r"\bstreaming\b",
            r"\bchat\b",
            r"\bnotification\b",
        ],
    ),
    (
        "multiagent-database",
        &[
            r"\bdatabase\b",
            r"\bpostgres(?:ql)?\b",
            r"\bmysql\b",
            r"\bmongodb?\b",
            r"\bschema\b",
            r"\bmigration\b",
        ],
    ),
    (
        "multiagent-cache",
        &[
            r"\bcach(?:e|ing)\b",
            r"\bredis\b",
            r"\bmemcached?\b",
            r"\bcdn\b",
            r"\bperformance\b",
        ],
    ),
    (
        "multiagent-email",
        &[
            r"\bemail\b",
            r"\bsmtp\b",
            r"\bsendgrid\b",
            r"\bmailgun\b",
            r"\bnewsletter\b",
            r"\bnotification\b",
        ],
    ),
    (
        "multiagent-storage",
        &[
            r"\bfile\s+upload\b",
            r"\bs3\b",
            r"\bblob\s+storage\b",
            r"\bimage\s+upload\b",
            r"\bmedia\b",
        ],
    ),
    (
        "multiagent-analytics",
        &[
            r"\banalytics\b",
            r"\bmetrics\b",
            r"\btracking\b",
            r"\bdashboard\b",
            r"\breporting\b",
            r"\bvisualization\b",
        ],
    ),
    (
        "multiagent-search",
        &[
            r"\bsearch\b",
            r"\belasticsearch\b",
            r"\bsolr\b",
            r"\bindex(?:ing)?\b",
            r"\bfull[\s-]?text\b",
        ],
    ),
];

/// Stack detection: per category, candidates are tried in declared order and
/// the first technology with any matching pattern wins.
const STACK_PATTERNS: &[(&str, &[(&str, &[&str])])] = &[
    (
        "backend",
        &[
            (
                "python",
                &[r"\bpython\b", r"\bdjango\b", r"\bfastapi\b", r"\bflask\b"],
            ),
            (
                "javascript",
                &[r"\bnode(?:\.?js)?\b", r"\bexpress\b", r"\bnest\.?js\b"],
            ),
            ("java", &[r"\bjava\b", r"\bspring\b", r"\bspringboot\b"]),
            ("go", &[r"\bgolang\b", r"\bgo\b", r"\bgin\b"]),
            ("ruby", &[r"\bruby\b", r"\brails\b"]),
        ],
    ),
    (
        "frontend",
        &[
            ("react", &[r"\breact\b", r"\bnext\.?js\b"]),
            ("vue", &[r"\bvue(?:\.?js)?\b", r"\bnuxt\b"]),
            ("angular", &[r"\bangular\b"]),
            ("svelte", &[r"\bsvelte\b", r"\bsveltekit\b"]),
        ],
    ),
    (
        "database",
        &[
            ("postgresql", &[r"\bpostgres(?:ql)?\b"]),
            ("mysql", &[r"\bmysql\b", r"\bmariadb\b"]),
            ("mongodb", &[r"\bmongodb?\b"]),
            ("redis", &[r"\bredis\b"]),
            ("sqlite", &[r"\bsqlite\b"]),
        ],
    ),
    (
        "deployment",
        &[
            ("docker", &[r"\bdocker\b", r"\bcontainer\b"]),
            ("kubernetes", &[r"\bkubernetes\b", r"\bk8s\b"]),
            (
                "serverless",
                &[r"\bserverless\b", r"\blambda\b", r"\bvercel\b"],
            ),
            ("vps", &[r"\bvps\b", r"\bdigitalocean\b", r"\blinode\b"]),
        ],
    ),
];

fn component_regexes() -> &'static Vec<(&'static str, Vec<Regex>)> {
    static COMPILED: OnceLock<Vec<(&'static str, Vec<Regex>)>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        COMPONENT_PATTERNS
            .iter()
            .map(|(id, patterns)| {
                let regexes = patterns
                    .iter()
                    .map(|p| Regex::new(p).expect("component pattern compiles"))
                    .collect();
                (*id, regexes)
            })
            .collect()
    })
}

#[allow(clippy::type_complexity)]
fn stack_regexes() -> &'static Vec<(&'static str, Vec<(&'static str, Vec<Regex>)>)> {
    static COMPILED: OnceLock<Vec<(&'static str, Vec<(&'static str, Vec<Regex>)>)>> =
        OnceLock::new();
    COMPILED.get_or_init(|| {
        STACK_PATTERNS
            .iter()
            .map(|(category, technologies)| {
                let techs = technologies
                    .iter()
                    .map(|(tech, patterns)| {
                        let regexes = patterns
                            .iter()
                            .map(|p| Regex::new(p).expect("stack pattern compiles"))
                            .collect();
                        (*tech, regexes)
                    })
                    .collect();
                (*category, techs)
            })
            .collect()
    })
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Result of classifying raw spec text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// Component ids whose patterns matched, in declaration order.
    pub components: Vec<String>,
    /// Category -> first-matching technology.
    pub stack: BTreeMap<String, String>,
}

/// Classify spec text into needed components and a detected technology
/// stack. Pure and idempotent: identical text yields identical output.
pub fn classify(text: &str) -> Classification {
    let lower = text.to_lowercase();

    let mut components = Vec::new();
    for (id, regexes) in component_regexes() {
        if regexes.iter().any(|re| re.is_match(&lower)) {
            components.push(id.to_string());
        }
    }

    let mut stack = BTreeMap::new();
    for (category, technologies) in stack_regexes() {
        for (tech, regexes) in technologies {
            if regexes.iter().any(|re| re.is_match(&lower)) {
                stack.insert(category.to_string(), tech.to_string());
                break;
            }
        }
    }

    Classification { components, stack }
}

/// Infer deployment targets from keyword mentions, independently of stack
/// detection. Never returns an empty list: "docker" is the default.
pub fn deployment_targets(text: &str, stack: &BTreeMap<String, String>) -> Vec<String> {
    let content = text.to_lowercase();
    let mut targets = Vec::new();

    if content.contains("docker") || content.contains("container") {
        targets.push("docker".to_string());
    } else if stack.contains_key("backend") {
        // Any backend suggests containerization.
        targets.push("docker".to_string());
    }

    if contains_any(&content, &["scale", "kubernetes", "k8s", "cluster"]) {
        targets.push("kubernetes".to_string());
    }
    if contains_any(&content, &["lambda", "vercel", "netlify", "serverless"]) {
        targets.push("serverless".to_string());
    }
    if contains_any(&content, &["vps", "digitalocean", "linode", "simple"]) {
        targets.push("vps".to_string());
    }

    if targets.is_empty() {
        targets.push("docker".to_string());
    }
    targets
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_text_detects_auth_component() {
        let text = "Users can login with email and password, OAuth with Google";
        let result = classify(text);
        assert!(result.components.contains(&"multiagent-auth".to_string()));
    }

    #[test]
    fn classification_is_idempotent() {
        let text = "A python backend with postgres, redis caching and react frontend";
        assert_eq!(classify(text), classify(text));
    }

    #[test]
    fn components_follow_declaration_order() {
        // Text mentions search before auth; output keeps registry order.
        let text = "Full-text search over user accounts, plus login with jwt";
        let result = classify(text);
        let auth = result
            .components
            .iter()
            .position(|c| c == "multiagent-auth")
            .unwrap();
        let search = result
            .components
            .iter()
            .position(|c| c == "multiagent-search")
            .unwrap();
        assert!(auth < search);
    }

    #[test]
    fn word_boundaries_prevent_fragment_matches() {
        // "authoring" must not trip the auth component.
        let result = classify("An authoring tool for writers");
        assert!(!result.components.contains(&"multiagent-auth".to_string()));
    }

    #[test]
    fn stack_detection_first_match_wins() {
        // Both python and ruby appear; python is declared first.
        let result = classify("Backend in python or maybe ruby on rails");
        assert_eq!(result.stack.get("backend").map(String::as_str), Some("python"));
    }

    #[test]
    fn stack_detects_all_categories() {
        let text = "A fastapi service with a react UI, postgresql storage, deployed on kubernetes";
        let result = classify(text);
        assert_eq!(result.stack.get("backend").map(String::as_str), Some("python"));
        assert_eq!(result.stack.get("frontend").map(String::as_str), Some("react"));
        assert_eq!(
            result.stack.get("database").map(String::as_str),
            Some("postgresql")
        );
        assert_eq!(
            result.stack.get("deployment").map(String::as_str),
            Some("kubernetes")
        );
    }

    #[test]
    fn empty_text_classifies_to_nothing() {
        let result = classify("");
        assert!(result.components.is_empty());
        assert!(result.stack.is_empty());
    }

    #[test]
    fn deployment_targets_default_to_docker() {
        let targets = deployment_targets("nothing relevant here", &BTreeMap::new());
        assert_eq!(targets, vec!["docker"]);
    }

    #[test]
    fn deployment_targets_never_empty() {
        for text in ["", "hello", "kubernetes cluster", "vps on linode", "lambda"] {
            let stack = classify(text).stack;
            assert!(!deployment_targets(text, &stack).is_empty());
        }
    }

    #[test]
    fn backend_stack_implies_docker_target() {
        let text = "A django web service";
        let stack = classify(text).stack;
        let targets = deployment_targets(text, &stack);
        assert!(targets.contains(&"docker".to_string()));
    }

    #[test]
    fn scale_mentions_add_kubernetes() {
        let text = "Must scale horizontally in docker containers";
        let stack = classify(text).stack;
        let targets = deployment_targets(text, &stack);
        assert_eq!(targets, vec!["docker", "kubernetes"]);
    }
}
