//! folio - plan PDF edits with a completion service

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use folio_ai::{Model, Provider, ProviderService, StreamOptions};
use tracing_subscriber::EnvFilter;

/// folio - AI-directed PDF task planning
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Provider (google, anthropic)
    #[arg(short, long, global = true)]
    provider: Option<String>,

    /// Model to use (default depends on the provider)
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plan an instruction against named documents without executing it
    Plan {
        instruction: String,
        /// Name of a loaded document, in load order (repeatable)
        #[arg(short, long = "doc")]
        docs: Vec<String>,
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Repair-parse model output (file or stdin) into a plan
    Parse { file: Option<PathBuf> },
    /// Suggest the action that fits a need
    Recommend { query: String },
    /// List the action vocabulary
    Actions,
    /// Initialize config file
    InitConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("folio_engine=debug,folio_ai=debug,folio=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cfg = config::Config::load();

    match args.command {
        Command::Actions => {
            commands::actions();
            Ok(())
        }
        Command::Parse { file } => commands::parse(file.as_deref()),
        Command::InitConfig => {
            let path = config::Config::init()?;
            println!("Config file at: {}", path.display());
            println!("\nExample config:\n{}", config::example_config());
            Ok(())
        }
        Command::Plan {
            instruction,
            docs,
            json,
        } => {
            let service = build_service(&cfg, args.provider, args.model)?;
            commands::plan(&service, &cfg.engine, &instruction, &docs, json).await
        }
        Command::Recommend { query } => {
            let service = build_service(&cfg, args.provider, args.model)?;
            commands::recommend(&service, &query).await
        }
    }
}

/// Merge config with CLI args (CLI takes precedence) and build the service
fn build_service(
    cfg: &config::Config,
    provider: Option<String>,
    model: Option<String>,
) -> anyhow::Result<ProviderService> {
    let name = provider
        .or(cfg.provider.clone())
        .unwrap_or_else(|| "google".to_string());
    let Some(provider) = Provider::parse(&name) else {
        anyhow::bail!("unknown provider '{}' (expected google or anthropic)", name);
    };

    let model_id = model
        .or(cfg.model.clone())
        .unwrap_or_else(|| provider.default_model_id().to_string());

    let Some(api_key) = cfg.api_key(provider) else {
        eprintln!("Error: No API key found for {}", provider.name());
        eprintln!("Set it with: export {}=your-key", provider.api_key_env_var());
        eprintln!("Or add it to the config file: folio init-config");
        std::process::exit(1);
    };

    tracing::debug!("Using {} model {}", provider.name(), model_id);
    Ok(
        ProviderService::new(Model::for_provider(provider, model_id), api_key).with_options(
            StreamOptions {
                max_tokens: cfg.max_tokens,
                temperature: cfg.temperature,
            },
        ),
    )
}
