//! CLI argument parsing using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use sentry_core::{PollingSpeed, PostAction};
use std::path::PathBuf;

/// file-sentry - Mirror watched files into a backup tree on change
#[derive(Parser, Debug)]
#[command(name = "file-sentry")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the configuration file (defaults to the platform config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start monitoring and run until interrupted
    Run,

    /// Process every rule once, then exit
    Once,

    /// Add a watch rule
    ///
    /// Examples:
    ///   file-sentry add-rule /home/me/notes.txt /backup
    ///   file-sentry add-rule app.cfg /backup --post-action git-commit
    AddRule {
        /// The file to watch
        source: PathBuf,

        /// Root of the mirror tree
        destination_root: PathBuf,

        /// Action to run after each successful copy
        #[arg(long, value_enum, default_value = "none")]
        post_action: PostActionArg,
    },

    /// Remove the rule watching the given file
    RemoveRule {
        /// The watched file
        source: PathBuf,
    },

    /// List configured rules and their current status
    ListRules,

    /// Change the polling interval
    SetSpeed {
        #[arg(value_enum)]
        speed: SpeedArg,
    },

    /// Show configuration summary
    Status,
}

/// Post-action choices exposed on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostActionArg {
    None,
    GitCommit,
    GitCommitAndPush,
}

impl From<PostActionArg> for PostAction {
    fn from(arg: PostActionArg) -> Self {
        match arg {
            PostActionArg::None => PostAction::None,
            PostActionArg::GitCommit => PostAction::GitCommit,
            PostActionArg::GitCommitAndPush => PostAction::GitCommitAndPush,
        }
    }
}

/// Polling speed choices exposed on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedArg {
    /// Every 10 minutes
    Slow,
    /// Every minute
    Medium,
    /// Every 10 seconds
    Fast,
}

impl From<SpeedArg> for PollingSpeed {
    fn from(arg: SpeedArg) -> Self {
        match arg {
            SpeedArg::Slow => PollingSpeed::Slow,
            SpeedArg::Medium => PollingSpeed::Medium,
            SpeedArg::Fast => PollingSpeed::Fast,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_add_rule_with_post_action() {
        let cli = Cli::try_parse_from([
            "file-sentry",
            "add-rule",
            "/tmp/a.txt",
            "/backup",
            "--post-action",
            "git-commit",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::AddRule {
                source,
                destination_root,
                post_action,
            }) => {
                assert_eq!(source, PathBuf::from("/tmp/a.txt"));
                assert_eq!(destination_root, PathBuf::from("/backup"));
                assert_eq!(post_action, PostActionArg::GitCommit);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_run_with_config_override() {
        let cli =
            Cli::try_parse_from(["file-sentry", "--config", "/tmp/c.json", "run"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.json")));
        assert_eq!(cli.command, Some(Commands::Run));
    }

    #[test]
    fn speed_values_map_to_core_enum() {
        assert_eq!(PollingSpeed::from(SpeedArg::Slow), PollingSpeed::Slow);
        assert_eq!(PollingSpeed::from(SpeedArg::Fast), PollingSpeed::Fast);
    }
}
