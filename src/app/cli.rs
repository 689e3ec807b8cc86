use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Validate and run CSS pruning descriptors"
)]
pub struct Cli {
    /// Descriptor to use instead of prune.toml / prune.json in the root
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Project root that sources are resolved against (defaults to the current directory)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Ignore ~/.config/css-prune/safelist.toml
    #[arg(long, global = true)]
    pub no_user_safelist: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load, validate and resolve the descriptor
    Check {
        /// Fail when a content glob matches no files
        #[arg(long)]
        strict: bool,
    },

    /// Print the resolved sources
    Plan {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render the descriptor as a PurgeCSS config module
    Export {
        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,

        /// Overwrite a file that css-prune did not generate
        #[arg(long)]
        force: bool,
    },

    /// Show whether selectors survive the safelist
    Verdict {
        /// Selectors to test (e.g. '.alert-danger' '.fade.show')
        #[arg(required = true, num_args = 1..)]
        selectors: Vec<String>,

        /// Names treated as found in content
        #[arg(long, num_args = 1..)]
        used: Vec<String>,
    },

    /// Resolve the sources and run PurgeCSS
    Run {
        /// PurgeCSS executable
        #[arg(long, default_value = "purgecss")]
        bin: PathBuf,

        /// Fail when a content glob matches no files
        #[arg(long)]
        strict: bool,
    },

    /// Write a starter prune.toml into the root
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "css-prune",
            "check",
            "--strict",
            "--root",
            "site",
            "--no-user-safelist",
        ])
        .unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("site")));
        assert!(cli.no_user_safelist);
        assert!(matches!(cli.command, Command::Check { strict: true }));
    }

    #[test]
    fn verdict_requires_a_selector() {
        assert!(Cli::try_parse_from(["css-prune", "verdict"]).is_err());

        let cli = Cli::try_parse_from([
            "css-prune",
            "verdict",
            ".foo",
            ".bar",
            "--used",
            "foo",
        ])
        .unwrap();
        match cli.command {
            Command::Verdict { selectors, used } => {
                assert_eq!(selectors, [".foo", ".bar"]);
                assert_eq!(used, ["foo"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
