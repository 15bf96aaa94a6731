use crate::output::print_json;
use anyhow::Context;
use devswarm_core::analyzer::{render_report, SpecAnalyzer};
use devswarm_core::registry::Registry;
use devswarm_core::router::Router;
use std::path::Path;

pub fn run(spec_path: &Path, registry: Registry, json: bool) -> anyhow::Result<()> {
    let router = Router::new(registry);
    let analyzer = SpecAnalyzer::new(router.clone());
    let analysis = analyzer
        .analyze(spec_path)
        .with_context(|| format!("failed to analyze {}", spec_path.display()))?;

    if json {
        print_json(&analysis)?;
    } else {
        println!("{}", render_report(&analysis, &router));
    }
    Ok(())
}
