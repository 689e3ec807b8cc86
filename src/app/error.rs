use std::path::PathBuf;
use thiserror::Error;

/// Which safelist category a pattern belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternCategory {
    Deep,
    Greedy,
}

impl std::fmt::Display for PatternCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatternCategory::Deep => f.write_str("deep"),
            PatternCategory::Greedy => f.write_str("greedy"),
        }
    }
}

/// Why a safelist pattern was rejected.
#[derive(Debug, Error)]
pub enum PatternProblem {
    #[error(transparent)]
    Syntax(#[from] regex::Error),

    /// Valid here, but the exported PurgeCSS config would read it differently.
    #[error("{0} has no JavaScript equivalent")]
    NotPortable(String),
}

/// A malformed or incomplete descriptor. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no content sources given; nothing would be scanned")]
    EmptyContent,

    #[error("no css sources given; nothing would be pruned")]
    EmptyCss,

    #[error("output path is empty or unset")]
    MissingOutput,

    #[error("blank entry in `{0}`")]
    BlankEntry(&'static str),

    #[error("output {0} would overwrite a css source (set `in_place = true` if the engine supports it)")]
    OutputOverwritesSource(String),

    #[error("invalid {category} safelist pattern `{pattern}`: {source}")]
    InvalidPattern {
        category: PatternCategory,
        pattern: String,
        #[source]
        source: PatternProblem,
    },

    #[error("invalid content glob `{pattern}`: {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("failed to read config {}: {1}", .0.display())]
    Read(PathBuf, #[source] std::io::Error),

    #[error("failed to parse config {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("no prune.toml or prune.json found in {}", .0.display())]
    NotFound(PathBuf),
}

/// A listed content or style path that resolves to no file.
#[derive(Debug, Error)]
#[error("{kind} source `{pattern}` did not resolve to any file under {}", .root.display())]
pub struct SourceNotFoundError {
    pub kind: &'static str,
    pub pattern: String,
    pub root: PathBuf,
}
