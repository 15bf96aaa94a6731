use crate::output::print_json;
use anyhow::Context;
use devswarm_core::io::write_json;
use devswarm_core::plan::InitArtifact;
use devswarm_core::spec::Spec;
use std::path::Path;

/// Parse the spec and write `deployment_plan.json` next to it.
pub fn run(spec_path: &Path, json: bool) -> anyhow::Result<()> {
    let spec = Spec::load(spec_path)
        .with_context(|| format!("failed to load spec from {}", spec_path.display()))?;

    let artifact = InitArtifact::for_spec();
    let plan_file = spec_path.join("deployment_plan.json");
    write_json(&plan_file, &artifact).context("failed to write deployment plan")?;

    if json {
        print_json(&serde_json::json!({
            "spec": spec.id,
            "title": spec.title,
            "plan_file": plan_file,
            "qa_checks": artifact.qa_checks.len(),
            "status": artifact.status,
        }))?;
    } else {
        println!("Spec loaded: {}", spec.title);
        println!("Deployment plan generated");
        println!("QA checks: {} configured", artifact.qa_checks.len());
        println!("Plan saved to {}", plan_file.display());
    }
    Ok(())
}
