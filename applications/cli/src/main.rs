//! Segue - crossfaded timeline planner and renderer
use anyhow::Context;
use clap::{Parser, Subcommand};
use segue_cli::{commands, RenderRequest, SegueConfig};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "segue")]
#[command(about = "Play audio files as one crossfaded timeline", long_about = None)]
struct Cli {
    /// Configuration file path (default: ./segue.toml if present)
    #[arg(short, long, global = true, env = "SEGUE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the planned segments as JSON
    Plan {
        /// Audio files, in timeline order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Timeline position to start from, in seconds
        #[arg(long, default_value_t = 0.0)]
        from: f64,

        /// Crossfade length in seconds
        #[arg(long)]
        crossfade: Option<f64>,
    },
    /// Render the timeline to a 32-bit float WAV file
    Render {
        /// Audio files, in timeline order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output WAV path
        #[arg(short, long)]
        out: PathBuf,

        /// Timeline position to start from, in seconds
        #[arg(long, default_value_t = 0.0)]
        from: f64,

        /// Crossfade length in seconds
        #[arg(long)]
        crossfade: Option<f64>,

        /// Stop after this many seconds of playback
        #[arg(long)]
        sleep: Option<f64>,

        /// Output sample rate in Hz
        #[arg(long)]
        sample_rate: Option<u32>,
    },
    /// Print the effective configuration as TOML
    Config,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "segue=info,segue_cli=info,segue_playback=info,segue_audio=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config =
        SegueConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Plan {
            files,
            from,
            crossfade,
        } => {
            config.apply_overrides(crossfade, None)?;
            let report = segue_cli::plan(&files, from, &config)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Render {
            files,
            out,
            from,
            crossfade,
            sleep,
            sample_rate,
        } => {
            config.apply_overrides(crossfade, sample_rate)?;
            let request = RenderRequest {
                files,
                out,
                from,
                sleep,
            };
            let summary = commands::render::render(&request, &config)
                .with_context(|| format!("Failed to render {}", request.out.display()))?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}
