use crate::app::formatter::OutputGenerator;
use crate::app::models::{PruneConfig, SourcePlan};
use anyhow::{bail, Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::NamedTempFile;

/// Something that turns a descriptor into a pruned stylesheet.
pub trait PruneEngine {
    fn prune(&self, config: &PruneConfig, plan: &SourcePlan) -> Result<()>;
}

/// Runs the `purgecss` command-line tool with a generated config module.
///
/// The module goes to a temporary file that is removed when the run ends, so a
/// `purgecss.config.js` kept in the project is never touched.
pub struct PurgeCss {
    bin: PathBuf,
}

impl PurgeCss {
    pub fn new(bin: impl Into<PathBuf>) -> Self {
        Self { bin: bin.into() }
    }

    /// Command line for a config module already written to `config_path`.
    pub fn command(&self, root: &Path, config_path: &Path) -> Command {
        let mut cmd = Command::new(&self.bin);
        cmd.current_dir(root).arg("--config").arg(config_path);
        cmd
    }

    /// Writes the rendered module to a fresh temporary file; dropping it deletes the file.
    pub fn write_config(&self, config: &PruneConfig) -> Result<NamedTempFile> {
        let mut file = tempfile::Builder::new()
            .prefix("css-prune-")
            .suffix(".config.js")
            .tempfile()
            .context("Failed to create a temporary PurgeCSS config")?;
        file.write_all(OutputGenerator::render_purgecss(config).as_bytes())
            .with_context(|| format!("Failed to write {}", file.path().display()))?;
        Ok(file)
    }
}

impl Default for PurgeCss {
    fn default() -> Self {
        Self::new("purgecss")
    }
}

impl PruneEngine for PurgeCss {
    fn prune(&self, config: &PruneConfig, plan: &SourcePlan) -> Result<()> {
        let config_file = self.write_config(config)?;
        log::debug!("Wrote {}", config_file.path().display());

        log::info!(
            "Pruning {} stylesheet(s) against {} content file(s)",
            plan.css.len(),
            plan.content_files().len()
        );

        let status = self
            .command(&plan.root, config_file.path())
            .status()
            .with_context(|| format!("Failed to start {}", self.bin.display()))?;

        if !status.success() {
            bail!("{} exited with {}", self.bin.display(), status);
        }

        log::info!("Wrote {}", plan.output.display());
        Ok(())
    }
}
