mod cmd;
mod output;

use clap::{Parser, Subcommand};
use cmd::agent::AgentsSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ops",
    about = "Multi-agent devops orchestration — analyze specs, route tasks to agents",
    version,
    propagate_version = true
)]
struct Cli {
    /// Agent registry override (YAML; default: built-in five-agent matrix)
    #[arg(long, global = true, env = "OPS_AGENTS_FILE")]
    agents_file: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a spec directory (spec.md, tasks.md, plan.md)
    Analyze {
        /// Path to the spec directory
        spec_path: PathBuf,
    },

    /// Recommend the best agent for a task description
    Recommend {
        /// Task description (free text)
        #[arg(required = true, trailing_var_arg = true)]
        description: Vec<String>,
    },

    /// Recommend an agent per task in a spec's tasks.md
    Assign {
        /// Path to the spec directory
        spec_path: PathBuf,
    },

    /// Balance tasks across agent capacity and show workloads
    Balance {
        /// Path to the spec directory
        spec_path: PathBuf,
    },

    /// Inspect the agent capability registry
    Agents {
        #[command(subcommand)]
        subcommand: AgentsSubcommand,
    },

    /// Initialize devops for a spec: write deployment_plan.json
    SpecInit {
        /// Path to the spec directory
        spec_path: PathBuf,
    },

    /// Deploy an agent swarm for a spec: write swarm_status.json
    SwarmDeploy {
        /// Path to the spec directory
        spec_path: PathBuf,

        /// Comma-separated agent handles (default: recommended from tasks.md)
        #[arg(long)]
        agents: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let registry = match cmd::load_registry(cli.agents_file.as_deref()) {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Analyze { spec_path } => cmd::analyze::run(&spec_path, registry, cli.json),
        Commands::Recommend { description } => {
            cmd::route::recommend(&description.join(" "), registry, cli.json)
        }
        Commands::Assign { spec_path } => cmd::route::assign(&spec_path, registry, cli.json),
        Commands::Balance { spec_path } => cmd::route::balance(&spec_path, registry, cli.json),
        Commands::Agents { subcommand } => cmd::agent::run(subcommand, registry, cli.json),
        Commands::SpecInit { spec_path } => cmd::spec_init::run(&spec_path, cli.json),
        Commands::SwarmDeploy { spec_path, agents } => {
            cmd::swarm::run(&spec_path, agents.as_deref(), registry, cli.json)
        }
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
