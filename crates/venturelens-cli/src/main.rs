use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use venturelens_api::{init_tracing, AppState, Server};
use venturelens_core::{ConfigManager, FlowKind, IdeaText, Mode};
use venturelens_pipeline::IdeaPipeline;

#[derive(Parser)]
#[command(name = "venturelens")]
#[command(about = "VentureLens CLI - Validate startup ideas with live market context", long_about = None)]
#[command(version)]
struct Cli {
    /// Output format (json, pretty)
    #[arg(short, long, global = true, default_value = "pretty")]
    output: OutputFormat,

    /// Config file to load instead of the default search locations
    #[arg(long, global = true, env = "VENTURELENS_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

#[derive(Clone, ValueEnum)]
enum ModeArg {
    Default,
    Roast,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Default => Mode::Default,
            ModeArg::Roast => Mode::Roast,
        }
    }
}

#[derive(Args, Clone)]
struct IdeaArgs {
    /// Startup idea description
    idea: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Full viability report
    Validate {
        #[command(flatten)]
        args: IdeaArgs,

        /// Report style
        #[arg(short, long, value_enum, default_value = "default")]
        mode: ModeArg,
    },

    /// Alternative directions for the idea
    Pivot(IdeaArgs),

    /// Phased launch plan
    Roadmap(IdeaArgs),

    /// Competitive landscape
    Competitors(IdeaArgs),

    /// TAM, SAM and SOM estimate
    MarketSize(IdeaArgs),

    /// One-line roast
    Roast(IdeaArgs),

    /// Palette, slogan and naming ideas
    BrandVibe(IdeaArgs),

    /// Recommended technologies
    TechStack(IdeaArgs),

    /// Whether a domain name looks available
    DomainCheck {
        /// Domain name to check
        domain: String,
    },

    /// Run the HTTP API server
    Serve {
        /// Address to bind
        #[arg(long, env = "VENTURELENS_HOST")]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long, env = "VENTURELENS_PORT")]
        port: Option<u16>,
    },

    /// Write a default config file
    InitConfig {
        /// Destination path
        #[arg(default_value = ".venturelens.toml")]
        path: PathBuf,
    },
}

impl Commands {
    /// The flow, idea text and mode for flow commands
    fn flow_request(&self) -> Option<(FlowKind, &str, Mode)> {
        let (flow, args) = match self {
            Commands::Validate { args, mode } => {
                return Some((FlowKind::Validate, args.idea.as_str(), mode.clone().into()))
            }
            Commands::DomainCheck { domain } => {
                return Some((FlowKind::DomainCheck, domain.as_str(), Mode::Default))
            }
            Commands::Pivot(args) => (FlowKind::Pivot, args),
            Commands::Roadmap(args) => (FlowKind::Roadmap, args),
            Commands::Competitors(args) => (FlowKind::Competitors, args),
            Commands::MarketSize(args) => (FlowKind::MarketSize, args),
            Commands::Roast(args) => (FlowKind::Roast, args),
            Commands::BrandVibe(args) => (FlowKind::BrandVibe, args),
            Commands::TechStack(args) => (FlowKind::TechStack, args),
            Commands::Serve { .. } | Commands::InitConfig { .. } => return None,
        };
        Some((flow, args.idea.as_str(), Mode::Default))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::InitConfig { path } = &cli.command {
        ConfigManager::create_default_config(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("{} {}", "Wrote".green().bold(), path.display());
        return Ok(());
    }

    let manager = match &cli.config {
        Some(path) => ConfigManager::load_from_path(path),
        None => ConfigManager::load(),
    }
    .context("Failed to load configuration")?;
    let mut config = manager.config().clone();

    if cli.verbose {
        config.logging.level = "debug".to_string();
    } else if !matches!(cli.command, Commands::Serve { .. }) {
        config.logging.level = "warn".to_string();
    }
    init_tracing(&config.logging)?;
    manager.log_summary();

    if let Commands::Serve { host, port } = &cli.command {
        if let Some(host) = host {
            config.server.host = host.clone();
        }
        if let Some(port) = port {
            config.server.port = *port;
        }
        let state = AppState::from_config(&config)?;
        return Server::new(state, &config.server).run().await;
    }

    let Some((flow, idea, mode)) = cli.command.flow_request() else {
        return Ok(());
    };

    let entitlement = config.pipeline.entitlement();
    tracing::debug!(flow = %flow, %mode, tier = %entitlement.tier, "Running flow from CLI");
    let pipeline = IdeaPipeline::from_config(&config)?;
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let outcome = async {
        let idea = IdeaText::new(idea)?;
        pipeline
            .run_flow(flow, &idea, mode, entitlement, &cancel)
            .await
    }
    .await;

    match outcome {
        Ok(report) => {
            print_output(&cli.output, &serde_json::to_value(report)?)?;
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn print_output(format: &OutputFormat, value: &serde_json::Value) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        OutputFormat::Pretty => {
            print_pretty(value, 0);
        }
    }
    Ok(())
}

fn print_pretty(value: &serde_json::Value, depth: usize) {
    let indent = "  ".repeat(depth);
    match value {
        serde_json::Value::Object(map) => {
            for (key, val) in map {
                let key_colored = key.cyan().bold();
                match val {
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        println!("{}{}:", indent, key_colored);
                        print_pretty(val, depth + 1);
                    }
                    _ => println!("{}{}: {}", indent, key_colored, scalar(val)),
                }
            }
        }
        serde_json::Value::Array(arr) => {
            for item in arr {
                match item {
                    serde_json::Value::Object(_) => {
                        println!("{}{}", indent, "-".yellow());
                        print_pretty(item, depth + 1);
                    }
                    _ => println!("{}{} {}", indent, "-".yellow(), scalar(item)),
                }
            }
        }
        _ => println!("{}{}", indent, scalar(value)),
    }
}

fn scalar(value: &serde_json::Value) -> colored::ColoredString {
    match value {
        serde_json::Value::String(s) => s.green(),
        serde_json::Value::Number(n) => n.to_string().yellow(),
        serde_json::Value::Bool(true) => "true".green(),
        serde_json::Value::Bool(false) => "false".red(),
        other => other.to_string().normal(),
    }
}
