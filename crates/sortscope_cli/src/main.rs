//! Sortscope CLI
//!
//! Command-line front end for the step-playback engine.
//!
//! # Commands
//!
//! - `sortscope play` - Request a run from the service and play it back
//! - `sortscope replay` - Play back a saved run response
//! - `sortscope trial` - Compare every algorithm on one array

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use sortscope_client::HttpExecutionService;
use sortscope_core::{Algorithm, ExecutionService, RunRequest, RunResponse, TrialRequest};
use sortscope_player::{spawn_player, PlaybackConfig, PlayerEvent, PlayerHandle};
use std::fs;
use std::io::IsTerminal;
use std::path::PathBuf;
use tokio::io::BufReader;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod input;
mod render;
mod session;

use config::SortscopeConfig;
use input::InputArgs;
use render::Style;
use session::RunSource;

#[derive(Parser)]
#[command(name = "sortscope")]
#[command(author, version, about = "Step through sorting algorithms in the terminal", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./sortscope.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Algorithm-execution service URL (overrides the config file)
    #[arg(long, global = true)]
    server: Option<String>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Request a run and play it back
    Play {
        #[command(flatten)]
        input: InputArgs,

        /// Algorithm (bubble, selection, insertion, merge, quick, heap, counting)
        #[arg(short = 'A', long)]
        algorithm: Option<Algorithm>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Play back a saved run response (JSON with a `steps` array)
    Replay {
        /// Path to the saved response
        file: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Run every algorithm on one array and rank them
    Trial {
        #[command(flatten)]
        input: InputArgs,

        /// Print the raw response as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Speed multiplier (overrides the config file)
    #[arg(short, long)]
    speed: Option<f64>,

    /// Print each step as one JSON line
    #[arg(long)]
    json: bool,
}

impl OutputArgs {
    fn style(&self) -> Style {
        if self.json {
            Style::Json
        } else {
            Style::Text
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = SortscopeConfig::load(cli.config.as_deref())?;
    if let Some(server) = cli.server {
        config.server.url = server;
    }

    match cli.command {
        Commands::Play {
            input,
            algorithm,
            output,
        } => {
            let algorithm = algorithm.unwrap_or(config.playback.algorithm);
            let service = HttpExecutionService::new(config.client_config())?;
            let (player, events) = spawn_player(playback_config(&config, &output));
            let mut source = RunSource::Service {
                service: &service,
                request: RunRequest::new(input.initial_array(), algorithm),
                generator: input.generator(),
            };

            info!(%algorithm, server = %service.base_url(), "requesting run");
            source
                .load(&player)
                .await
                .with_context(|| format!("Failed to run {algorithm} sort"))?;

            play(&player, events, &mut source, &output).await?;
        }

        Commands::Replay { file, output } => {
            let body = fs::read(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let response = RunResponse::from_json(&body)
                .with_context(|| format!("Failed to parse {}", file.display()))?;
            let (player, events) = spawn_player(playback_config(&config, &output));
            let mut source = RunSource::<HttpExecutionService>::Saved(response.steps);

            info!(file = %file.display(), "replaying saved run");
            source
                .load(&player)
                .await
                .with_context(|| format!("Failed to load {}", file.display()))?;

            play(&player, events, &mut source, &output).await?;
        }

        Commands::Trial { input, json } => {
            let service = HttpExecutionService::new(config.client_config())?;
            let array = input.initial_array();

            info!(size = array.len(), server = %service.base_url(), "running time trial");
            let trial = service
                .time_trial(&TrialRequest { array })
                .await
                .context("Failed to run time trial")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&trial)?);
            } else {
                print!("{}", render::trial_table(&trial));
            }
        }
    }

    Ok(())
}

fn playback_config(config: &SortscopeConfig, output: &OutputArgs) -> PlaybackConfig {
    let playback = config.playback_config();
    match output.speed {
        Some(speed) => playback.with_speed(speed),
        None => playback,
    }
}

async fn play<S: ExecutionService>(
    player: &PlayerHandle,
    events: UnboundedReceiver<PlayerEvent>,
    source: &mut RunSource<'_, S>,
    output: &OutputArgs,
) -> Result<()> {
    let input = std::io::stdin()
        .is_terminal()
        .then(|| BufReader::new(tokio::io::stdin()));
    let mut stdout = std::io::stdout();
    session::run(player, events, source, input, &mut stdout, output.style()).await
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use input::Preset;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_play() {
        let cli = Cli::try_parse_from([
            "sortscope", "play", "--array", "5,-3,8", "-A", "quick", "--speed", "2", "--json",
        ])
        .unwrap();

        let Commands::Play {
            input,
            algorithm,
            output,
        } = cli.command
        else {
            panic!("expected play");
        };
        assert_eq!(input.initial_array(), vec![5, -3, 8]);
        assert_eq!(input.generator(), None);
        assert_eq!(algorithm, Some(Algorithm::Quick));
        assert_eq!(output.speed, Some(2.0));
        assert_eq!(output.style(), Style::Json);
    }

    #[test]
    fn test_parse_preset() {
        let cli = Cli::try_parse_from(["sortscope", "play", "--preset", "reversed", "--size", "12"])
            .unwrap();

        let Commands::Play { input, .. } = cli.command else {
            panic!("expected play");
        };
        let generator = input.generator().unwrap();
        assert_eq!(generator.preset, Preset::Reversed);
        assert_eq!(generator.size, 12);

        let array = input.initial_array();
        assert_eq!(array.len(), 12);
        assert!(array.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_parse_requires_one_input() {
        assert!(Cli::try_parse_from(["sortscope", "trial"]).is_err());
        assert!(Cli::try_parse_from(["sortscope", "trial", "-a", "1,2", "-p", "sorted"]).is_err());
        assert!(Cli::try_parse_from(["sortscope", "trial", "-p", "nearly"]).is_ok());
        assert!(Cli::try_parse_from(["sortscope", "trial", "-p", "sorted", "--size", "0"]).is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_algorithm() {
        assert!(Cli::try_parse_from(["sortscope", "play", "-a", "1,2", "-A", "bogo"]).is_err());
    }

    #[test]
    fn test_speed_flag_overrides_config() {
        let config = SortscopeConfig::default();
        let output = OutputArgs {
            speed: Some(4.0),
            json: false,
        };
        assert_eq!(playback_config(&config, &output).initial_speed, 4.0);

        let output = OutputArgs {
            speed: None,
            json: false,
        };
        assert_eq!(playback_config(&config, &output).initial_speed, 1.0);
    }
}
