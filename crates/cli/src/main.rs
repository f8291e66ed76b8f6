//! WalkSafe CLI
//!
//! Runs either relay service, checks that a credential can be found, or
//! sends local pavement photos straight to the vision model.
//!
//! Copyright (c) 2025 Michael A Wright

mod images;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use llm_bridge::{ImageAnalyzer, PavementAnalyzer};
use serde_json::json;
use std::path::{Path, PathBuf};
use walksafe_server::startup::{init_tracing, serve};
use walksafe_server::{ServerConfig, ServiceKind};

mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\ncommit: ",
    env!("BUILT_GIT_COMMIT_HASH"),
    "\nbuilt: ",
    env!("BUILT_TIME_UTC"),
);

#[derive(Parser)]
#[command(name = "walksafe")]
#[command(about = "Pavement photo analysis relay", long_about = None)]
#[command(version, long_version = LONG_VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve one of the relay services
    Serve {
        /// api: page plus /api/analyze-image; page: static page only
        #[arg(short, long, value_enum, default_value_t = Mode::Api)]
        mode: Mode,

        /// Port to listen on (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Analyze a photo, or every photo in a directory, and print JSON lines
    Analyze {
        /// Input file or directory
        #[arg(short, long)]
        input: PathBuf,

        /// Clamp model output into documented ranges
        #[arg(long)]
        sanitize: bool,
    },

    /// Load configuration and report where the credential was found
    CheckConfig {
        #[arg(short, long, value_enum, default_value_t = Mode::Api)]
        mode: Mode,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Api,
    Page,
}

impl From<Mode> for ServiceKind {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Api => ServiceKind::Analysis,
            Mode::Page => ServiceKind::Page,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { mode, port } => {
            let mut config = load_config(mode)?;
            if let Some(port) = port {
                config.port = port;
            }
            serve(config).await
        }
        Commands::Analyze { input, sanitize } => analyze(&input, sanitize).await,
        Commands::CheckConfig { mode } => {
            let config = load_config(mode)?;
            println!("service:    {}", config.kind);
            println!("credential: {}", config.credential.source);
            println!("bind:       {}", config.bind_addr());
            if config.kind == ServiceKind::Analysis {
                println!("endpoint:   {}", config.groq_base_url);
                println!("model:      {}", config.groq_model);
                println!("timeout:    {}s", config.groq_timeout_secs);
                println!("sanitize:   {}", config.sanitize);
            }
            println!(
                "build:      {} {} ({})",
                built_info::PKG_VERSION,
                built_info::TARGET,
                built_info::RUSTC_VERSION
            );
            Ok(())
        }
    }
}

fn load_config(mode: Mode) -> Result<ServerConfig> {
    ServerConfig::from_env(mode.into()).map_err(|e| {
        tracing::error!("{}", e);
        e.into()
    })
}

async fn analyze(input: &Path, sanitize: bool) -> Result<()> {
    let config = load_config(Mode::Api)?;
    let analyzer =
        PavementAnalyzer::from_config(config.groq_config())?.with_sanitize(sanitize || config.sanitize);

    let files = images::collect_images(input)?;
    if files.is_empty() {
        anyhow::bail!("No images found in {}", input.display());
    }
    tracing::info!(count = files.len(), "Analyzing images");

    let mut failures = 0usize;
    for path in &files {
        let file = path.display().to_string();
        let request = match images::encode_image(path) {
            Ok(request) => request,
            Err(e) => {
                failures += 1;
                println!("{}", json!({ "file": file, "error": format!("{:#}", e) }));
                continue;
            }
        };

        match analyzer.analyze(&request).await {
            Ok(analysis) => println!("{}", json!({ "file": file, "analysis": analysis })),
            Err(e) => {
                failures += 1;
                tracing::warn!(file = %file, details = e.details(), "Analysis failed");
                println!(
                    "{}",
                    json!({ "file": file, "error": e.to_string(), "details": e.details() })
                );
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} images failed", failures, files.len());
    }
    Ok(())
}
