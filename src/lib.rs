//! Load, validate and hand off CSS pruning descriptors.
//!
//! A descriptor names the content scanned for class usage, the stylesheets to prune,
//! where the result goes, and a safelist of selectors that survive regardless.
//! Pruning itself is left to an external engine such as PurgeCSS.

pub mod app;

pub use app::error::{ConfigError, SourceNotFoundError};
pub use app::models::{PruneConfig, RawPruneConfig, RawSafelist, Safelist, SafelistRule};
pub use app::safelist::{Reason, Verdict};
