mod check;
mod compare;
mod config_cmd;
mod facing;
mod score;
mod squat;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::Config;
use crate::source::RecordedPoseSource;

pub use check::CheckCommand;
pub use compare::CompareCommand;
pub use facing::FacingCommand;
pub use score::ScoreCommand;
pub use squat::SquatCommand;

#[derive(Parser)]
#[command(name = "pose-form")]
#[command(about = "Squat counting and pose similarity scoring over recorded keypoints", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(long, global = true, env = "POSE_FORM_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Count squat repetitions in a recording
    Squat(SquatCommand),

    /// Compare one pose against a reference pose
    Compare(CompareCommand),

    /// Stream a recording against a reference pose
    Score(ScoreCommand),

    /// Estimate which way the person faces in each frame
    Facing(FacingCommand),

    /// Run pose checks over a recording
    Check(CheckCommand),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigSubcommands),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Show current configuration
    Show,

    /// Initialize configuration with defaults
    Init {
        /// Overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub async fn execute(self) -> Result<()> {
        let config_path = self.config.as_deref();

        match self.command {
            Commands::Squat(cmd) => cmd.execute(&Config::load(config_path)?).await,
            Commands::Compare(cmd) => cmd.execute(&Config::load(config_path)?).await,
            Commands::Score(cmd) => cmd.execute(&Config::load(config_path)?).await,
            Commands::Facing(cmd) => cmd.execute(&Config::load(config_path)?).await,
            Commands::Check(cmd) => cmd.execute(&Config::load(config_path)?).await,
            Commands::Config(subcmd) => match subcmd {
                ConfigSubcommands::Show => config_cmd::show_config(config_path).await,
                ConfigSubcommands::Init { force } => config_cmd::init_config(config_path, force).await,
            },
            Commands::Completions { shell } => {
                generate_completions(shell);
                Ok(())
            }
        }
    }
}

/// Open a recording with the configured per-frame deadline; `-` reads stdin
async fn open_frames(input: &Path, config: &Config) -> Result<RecordedPoseSource> {
    let deadline = Duration::from_millis(config.session.frame_deadline_ms);
    if input == Path::new("-") {
        return Ok(RecordedPoseSource::from_reader(tokio::io::stdin(), "stdin", deadline));
    }
    RecordedPoseSource::open(input, deadline).await
}

fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
