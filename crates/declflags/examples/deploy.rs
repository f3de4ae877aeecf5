//! A small deploy tool.
//!
//! ```text
//! cargo run --example deploy -- -v push prod --replicas 3
//! DECLFLAGS_LOG=debug cargo run --example deploy -- status
//! ```
use declflags::{Action, Args, Loaded, Nargs, Ty};
use tracing_subscriber::EnvFilter;

/// Deploys services.
#[derive(Debug, Args)]
#[args(
    subcommand("push", Push, help = "Push a release"),
    subcommand("status", Status, help = "Show what is deployed")
)]
struct Deploy {
    /// More output
    #[arg("-v", "--verbose", action = Action::Count, default = 0)]
    verbose: i64,
    /// Configuration file
    #[arg("-c", "--config", default = "deploy.toml")]
    config: std::path::PathBuf,
}

#[derive(Debug, Args)]
#[args(alias("Env", Ty::literal(["dev", "staging", "prod"])))]
struct Push {
    /// Target environment
    #[arg("ENV", ty = Ty::named("Env"))]
    env: String,
    #[arg(default = 1)]
    replicas: i64,
    /// Labels as `key value` pairs
    #[arg("--label", action = Action::Append, nargs = Nargs::Exactly(2))]
    labels: Option<Vec<(String, String)>>,
    dry_run: Option<bool>,
}

#[derive(Debug, Args)]
struct Status;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("DECLFLAGS_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let program = Deploy::program().unwrap_or_else(|err| err.exit()).version("0.1.0");
    let loaded = program.from_env_or_exit();
    if let Err(err) = run(&loaded) {
        err.exit()
    }
}

fn run(loaded: &Loaded) -> declflags::Result<()> {
    let deploy = loaded.args::<Deploy>()?;
    if deploy.verbose > 0 {
        eprintln!("using {}", deploy.config.display());
    }

    if let Some(push) = loaded.subcommand::<Push>()? {
        let mode = if push.dry_run == Some(true) { "would push" } else { "pushing" };
        println!("{mode} to {} with {} replicas", push.env, push.replicas);
        for (key, value) in push.labels.unwrap_or_default() {
            println!("  {key}={value}");
        }
    } else if loaded.subcommand::<Status>()?.is_some() {
        println!("nothing deployed");
    }
    Ok(())
}
