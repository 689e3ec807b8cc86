use crate::app::error::{ConfigError, SourceNotFoundError};
use crate::app::models::{normalize_path, ContentMatch, PruneConfig, SourcePlan};
use anyhow::Result;
use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use pathdiff::diff_paths;
use std::path::{Path, PathBuf};

/// Compiles a content glob the way it is matched: relative to the root, `./` stripped,
/// `*` stopping at `/`.
pub fn compile_glob(pattern: &str) -> Result<Glob, ConfigError> {
    let trimmed = pattern.trim_start_matches("./");
    GlobBuilder::new(trimmed)
        .literal_separator(true)
        .build()
        .map_err(|e| ConfigError::InvalidGlob {
            pattern: pattern.to_string(),
            source: e,
        })
}

/// Resolves a descriptor's sources against a project root.
pub struct Scanner {
    root: PathBuf,
    strict: bool,
}

impl Scanner {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            strict: false,
        }
    }

    /// Treat content globs that match nothing as fatal instead of warning.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Style paths that don't exist fail with [`SourceNotFoundError`]; content globs
    /// matching nothing only warn unless the scanner is strict.
    pub fn resolve(&self, config: &PruneConfig) -> Result<SourcePlan> {
        let css = config
            .css()
            .iter()
            .map(|c| self.resolve_css(c))
            .collect::<Result<Vec<_>, _>>()?;

        let content = self.resolve_content(config.content())?;

        let output = self.root.join(normalize_path(config.output()));
        if let Some(parent) = output.parent() {
            if !parent.is_dir() {
                log::warn!(
                    "Output directory {} does not exist yet",
                    parent.display()
                );
            }
        }

        Ok(SourcePlan {
            root: self.root.clone(),
            content,
            css,
            output,
        })
    }

    fn resolve_css(&self, path: &str) -> Result<PathBuf, SourceNotFoundError> {
        let full = self.root.join(normalize_path(path));
        if full.is_file() {
            Ok(full)
        } else {
            Err(SourceNotFoundError {
                kind: "css",
                pattern: path.to_string(),
                root: self.root.clone(),
            })
        }
    }

    fn resolve_content(&self, patterns: &[String]) -> Result<Vec<ContentMatch>> {
        let set = build_globset(patterns)?;

        let mut matches: Vec<ContentMatch> = patterns
            .iter()
            .map(|p| ContentMatch {
                pattern: p.clone(),
                files: Vec::new(),
            })
            .collect();

        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            .git_ignore(true)
            .build();

        for result in walker {
            match result {
                Ok(entry) => {
                    let path = entry.path();
                    if !path.is_file() || path.components().any(|c| c.as_os_str() == ".git") {
                        continue;
                    }
                    let Some(relative) = self.relative(path) else {
                        continue;
                    };
                    for idx in set.matches(&relative) {
                        matches[idx].files.push(relative.clone());
                    }
                }
                Err(err) => log::warn!("Error walking entry: {}", err),
            }
        }

        for m in &mut matches {
            m.files.sort();
            if m.files.is_empty() {
                let err = SourceNotFoundError {
                    kind: "content",
                    pattern: m.pattern.clone(),
                    root: self.root.clone(),
                };
                if self.strict {
                    return Err(err.into());
                }
                log::warn!("{}", err);
            }
        }

        Ok(matches)
    }

    fn relative(&self, path: &Path) -> Option<PathBuf> {
        let relative = diff_paths(path, &self.root)?;
        if relative.as_os_str().is_empty() {
            None
        } else {
            Some(relative)
        }
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, ConfigError> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        builder.add(compile_glob(pat)?);
    }
    builder.build().map_err(|e| ConfigError::InvalidGlob {
        pattern: patterns.join(", "),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::RawPruneConfig;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("templates/partials")).unwrap();
        fs::create_dir_all(root.join("workouts/templates")).unwrap();
        fs::create_dir_all(root.join("static/css")).unwrap();
        fs::write(root.join("templates/base.html"), "<div class=\"foo\">").unwrap();
        fs::write(root.join("templates/partials/nav.html"), "<nav>").unwrap();
        fs::write(root.join("templates/notes.txt"), "x").unwrap();
        fs::write(root.join("workouts/templates/list.html"), "<ul>").unwrap();
        fs::write(root.join("static/css/bootstrap.full.css"), ".foo{}.bar{}").unwrap();
        dir
    }

    fn config(content: &[&str], css: &[&str]) -> PruneConfig {
        PruneConfig::from_raw(RawPruneConfig {
            content: content.iter().map(|s| s.to_string()).collect(),
            css: css.iter().map(|s| s.to_string()).collect(),
            output: Some("./static/css/bootstrap.min.css".into()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn content_globs_resolve_per_pattern() {
        let dir = project();
        let cfg = config(
            &["./templates/**/*.html", "./workouts/templates/**/*.html"],
            &["./static/css/bootstrap.full.css"],
        );
        let plan = Scanner::new(dir.path().to_path_buf()).resolve(&cfg).unwrap();

        assert_eq!(
            plan.content[0].files,
            [
                PathBuf::from("templates/base.html"),
                PathBuf::from("templates/partials/nav.html")
            ]
        );
        assert_eq!(
            plan.content[1].files,
            [PathBuf::from("workouts/templates/list.html")]
        );
        assert_eq!(plan.content_files().len(), 3);
        assert!(plan.css[0].ends_with("static/css/bootstrap.full.css"));
        assert!(plan.output.ends_with("static/css/bootstrap.min.css"));
    }

    #[test]
    fn single_star_does_not_cross_directories() {
        let dir = project();
        let cfg = config(&["templates/*.html"], &["static/css/bootstrap.full.css"]);
        let plan = Scanner::new(dir.path().to_path_buf()).resolve(&cfg).unwrap();
        assert_eq!(plan.content[0].files, [PathBuf::from("templates/base.html")]);
    }

    #[test]
    fn missing_css_is_fatal() {
        let dir = project();
        let cfg = config(&["templates/**/*.html"], &["static/css/missing.css"]);
        let err = Scanner::new(dir.path().to_path_buf())
            .resolve(&cfg)
            .unwrap_err();
        let err = err.downcast_ref::<SourceNotFoundError>().unwrap();
        assert_eq!(err.kind, "css");
        assert_eq!(err.pattern, "static/css/missing.css");
    }

    #[test]
    fn empty_content_glob_warns_unless_strict() {
        let dir = project();
        let cfg = config(
            &["templates/**/*.html", "goals/templates/**/*.html"],
            &["static/css/bootstrap.full.css"],
        );

        let plan = Scanner::new(dir.path().to_path_buf()).resolve(&cfg).unwrap();
        assert!(plan.content[1].files.is_empty());

        let err = Scanner::new(dir.path().to_path_buf())
            .strict(true)
            .resolve(&cfg)
            .unwrap_err();
        let err = err.downcast_ref::<SourceNotFoundError>().unwrap();
        assert_eq!(err.kind, "content");
        assert_eq!(err.pattern, "goals/templates/**/*.html");
    }
}
