use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;

#[derive(Debug, Parser)]
#[command(
    name = "recap",
    version,
    about = "Coordinated screen and microphone recording sessions"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start a recording session and stream status until it finishes.
    Record(RecordArgs),
    /// Generate shell completion scripts.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Args)]
pub struct RecordArgs {
    /// Root directory offered by the directory prompt. Defaults to $HOME.
    #[arg(long, env = "RECAP_LIBRARY_DIR")]
    pub library_dir: Option<PathBuf>,

    /// Directory backing the download fallback. Defaults to $HOME/Downloads.
    #[arg(long, env = "RECAP_DOWNLOADS_DIR")]
    pub downloads_dir: Option<PathBuf>,

    /// Stop automatically after this many seconds instead of waiting for
    /// Ctrl-C.
    #[arg(long, value_name = "SECONDS")]
    pub duration: Option<u64>,

    /// Behave as if the directory prompt was cancelled.
    #[arg(long)]
    pub no_library: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn record_parses_flags() {
        let cli = Cli::try_parse_from([
            "recap",
            "record",
            "--library-dir",
            "/tmp/library",
            "--duration",
            "30",
        ])
        .unwrap();
        match cli.command {
            Command::Record(args) => {
                assert_eq!(args.library_dir, Some(PathBuf::from("/tmp/library")));
                assert_eq!(args.duration, Some(30));
                assert!(!args.no_library);
            }
            other => panic!("expected record, got {other:?}"),
        }
    }

    #[test]
    fn completions_requires_a_shell() {
        assert!(Cli::try_parse_from(["recap", "completions"]).is_err());
        assert!(Cli::try_parse_from(["recap", "completions", "bash"]).is_ok());
    }
}
