use crate::app::error::ConfigError;
use crate::app::models::{PruneConfig, RawPruneConfig, RawSafelist, Safelist};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// File names looked up in the project root, in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["prune.toml", "prune.json"];

/// Starter descriptor written by `init`: Bootstrap pruned against Django templates.
pub const STARTER_TEMPLATE: &str = r#"# Sources scanned for class usage.
content = [
    "./templates/**/*.html",
    "./workouts/templates/**/*.html",
    "./goals/templates/**/*.html",
    "./users/templates/**/*.html",
    "./static/css/style.css",
]
# Stylesheets to prune.
css = ["./static/css/bootstrap.full.css"]
output = "./static/css/bootstrap.min.css"

[safelist]
# Classes added at runtime by Bootstrap's JavaScript.
standard = [
    "show",
    "fade",
    "collapse",
    "collapsing",
    "dropdown-menu-dark",
    "dropdown-menu-end",
    "modal-backdrop",
    "toast",
    "popover",
    "tooltip",
]
# Component families kept with all their variants.
deep = [
    "^alert-",
    "^btn-",
    "^bg-",
    "^text-",
    "^border-",
    "^dropdown-",
    "^navbar-",
    "^nav-",
    "^card-",
    "^badge-",
    "^form-",
    "^input-",
    "^modal-",
    "^tab-",
    "^list-group-",
]
greedy = ["data-bs-", "select2", "chart"]
"#;

#[derive(Deserialize, Debug, Default)]
struct UserSafelistFile {
    #[serde(default)]
    safelist: RawSafelist,
}

/// Finds the descriptor in `dir`.
pub fn discover_config(dir: &Path) -> Result<PathBuf, ConfigError> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
        .ok_or_else(|| ConfigError::NotFound(dir.to_path_buf()))
}

/// Reads a descriptor file without validating it. `.json` files are JSON, anything else TOML.
pub fn load_raw(path: &Path) -> Result<RawPruneConfig, ConfigError> {
    let content =
        fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let parsed: Result<RawPruneConfig, String> = if is_json {
        serde_json::from_str(&content).map_err(|e| e.to_string())
    } else {
        toml::from_str(&content).map_err(|e| e.to_string())
    };

    parsed.map_err(|message| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

/// Reads and validates a descriptor file.
pub fn load_config(path: &Path) -> Result<PruneConfig, ConfigError> {
    PruneConfig::from_raw(load_raw(path)?)
}

/// `~/.config/css-prune/safelist.toml`, if there is a home directory.
pub fn user_safelist_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| {
        home.join(".config")
            .join("css-prune")
            .join("safelist.toml")
    })
}

/// Loads a shared safelist file; a missing file is an empty safelist.
fn load_user_safelist(path: &Path) -> Result<RawSafelist> {
    if !path.exists() {
        return Ok(RawSafelist::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read user safelist at {:?}", path))?;
    let parsed: UserSafelistFile =
        toml::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))?;

    Safelist::from_raw(parsed.safelist.clone())
        .with_context(|| format!("Invalid user safelist {}", path.display()))?;

    log::debug!("Loaded user safelist from {}", path.display());
    Ok(parsed.safelist)
}

fn merge_vecs(base: Vec<String>, extra: Vec<String>) -> Vec<String> {
    let mut combined = base;
    combined.extend(extra);
    // Deduplicate while keeping order
    let mut seen = HashSet::new();
    combined.retain(|item| seen.insert(item.clone()));
    combined
}

/// User entries first, then the project's, without duplicates.
pub fn merge_safelist(user: RawSafelist, project: RawSafelist) -> RawSafelist {
    RawSafelist {
        standard: merge_vecs(user.standard, project.standard),
        deep: merge_vecs(user.deep, project.deep),
        greedy: merge_vecs(user.greedy, project.greedy),
    }
}

/// Locates, loads, merges and validates the descriptor, using the safelist in the
/// user's config directory unless `use_user_safelist` is false.
pub fn resolve_config(
    explicit: Option<&Path>,
    root: &Path,
    use_user_safelist: bool,
) -> Result<PruneConfig> {
    let user_path = if use_user_safelist {
        user_safelist_path()
    } else {
        None
    };
    if use_user_safelist && user_path.is_none() {
        log::debug!("No home directory; skipping user safelist");
    }
    resolve_config_with(explicit, root, user_path.as_deref())
}

/// [`resolve_config`] with an explicit user safelist file (`None` skips it).
pub fn resolve_config_with(
    explicit: Option<&Path>,
    root: &Path,
    user_safelist: Option<&Path>,
) -> Result<PruneConfig> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => discover_config(root)?,
    };
    log::info!("Using config {}", path.display());

    let mut raw = load_raw(&path)?;

    if let Some(user_path) = user_safelist {
        let user = load_user_safelist(user_path)?;
        raw.safelist = merge_safelist(user, raw.safelist);
    }

    let config = PruneConfig::from_raw(raw)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    Ok(config)
}

/// Writes [`STARTER_TEMPLATE`] to `path`.
pub fn write_starter(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    fs::write(path, STARTER_TEMPLATE)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
