use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use snowflake_manager::api::{self, DropCreateOptions, PermifrostOptions, RunOptions};
use snowflake_manager::diff::DEFAULT_DDL_ROLE;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const ENV_FILTER: &str = "snowflake_manager=info";

#[derive(Parser)]
#[command(name = "snowflake-manager")]
#[command(
    about = "Drop, create and alter Snowflake objects and set permissions with Permifrost",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct SpecArgs {
    /// Permifrost specification file (YAML)
    #[arg(
        short = 'p',
        long = "permifrost-spec-path",
        visible_alias = "filepath",
        alias = "permifrost_spec_path"
    )]
    spec_path: PathBuf,

    /// Log statements without executing them
    #[arg(long)]
    dry: bool,
}

#[derive(Args, Debug, Clone)]
struct DdlArgs {
    /// Role every DDL statement runs under
    #[arg(long, env = "SNOWFLAKE_MANAGER_DDL_ROLE", default_value = DEFAULT_DDL_ROLE)]
    ddl_role: String,
}

#[derive(Args, Debug, Clone)]
struct PermifrostArgs {
    /// Permifrost executable
    #[arg(long, env = "PERMIFROST_BIN", default_value = "permifrost")]
    permifrost_bin: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Drop, create and alter objects to match the specification
    #[command(name = "drop-create", alias = "drop_create")]
    DropCreate {
        #[command(flatten)]
        spec: SpecArgs,
        #[command(flatten)]
        ddl: DdlArgs,
    },

    /// Grant permissions with Permifrost
    Permifrost {
        #[command(flatten)]
        spec: SpecArgs,
        #[command(flatten)]
        permifrost: PermifrostArgs,
    },

    /// Run drop-create, then Permifrost
    Run {
        #[command(flatten)]
        spec: SpecArgs,
        #[command(flatten)]
        ddl: DdlArgs,
        #[command(flatten)]
        permifrost: PermifrostArgs,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(ENV_FILTER));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init();
}

fn drop_create_options(spec: &SpecArgs, ddl: &DdlArgs) -> DropCreateOptions {
    DropCreateOptions::new(&spec.spec_path)
        .dry_run(spec.dry)
        .with_ddl_role(&ddl.ddl_role)
}

fn permifrost_options(spec: &SpecArgs, permifrost: &PermifrostArgs) -> PermifrostOptions {
    PermifrostOptions::new(&spec.spec_path)
        .dry_run(spec.dry)
        .with_program(&permifrost.permifrost_bin)
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Credentials may live in a local .env file.
    let _ = dotenvy::dotenv();
    init_tracing();

    match cli.command {
        Commands::DropCreate { spec, ddl } => {
            api::drop_create(drop_create_options(&spec, &ddl))
                .await
                .context("drop-create failed")?;
        }
        Commands::Permifrost { spec, permifrost } => {
            api::permifrost(permifrost_options(&spec, &permifrost))
                .await
                .context("permifrost failed")?;
        }
        Commands::Run {
            spec,
            ddl,
            permifrost,
        } => {
            let options = RunOptions {
                drop_create: drop_create_options(&spec, &ddl),
                permifrost: permifrost_options(&spec, &permifrost),
            };
            api::run(options).await.context("run failed")?;
        }
    }

    Ok(())
}
