use crate::app::error::{ConfigError, PatternCategory, PatternProblem};
use crate::app::js_pattern::{self, JsRegex};
use crate::app::scanner::compile_glob;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// The descriptor exactly as it appears on disk, before validation.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RawPruneConfig {
    #[serde(default, alias = "contentSources")]
    pub content: Vec<String>,
    #[serde(default, alias = "styleSources")]
    pub css: Vec<String>,
    #[serde(default, alias = "outputPath", skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, alias = "inPlace", skip_serializing_if = "std::ops::Not::not")]
    pub in_place: bool,
    #[serde(default)]
    pub safelist: RawSafelist,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RawSafelist {
    #[serde(default)]
    pub standard: Vec<String>,
    #[serde(default)]
    pub deep: Vec<String>,
    #[serde(default)]
    pub greedy: Vec<String>,
}

/// A compiled safelist pattern. Equality and serialization use the source text.
#[derive(Debug, Clone)]
pub struct SafelistPattern {
    source: String,
    regex: Regex,
    js: JsRegex,
}

impl SafelistPattern {
    /// Fails unless the pattern compiles and exports to an equivalent JavaScript regex.
    pub fn new(source: &str, category: PatternCategory) -> Result<Self, ConfigError> {
        let invalid = |problem: PatternProblem| ConfigError::InvalidPattern {
            category,
            pattern: source.to_string(),
            source: problem,
        };
        let regex = Regex::new(source).map_err(|e| invalid(e.into()))?;
        let js = js_pattern::translate(source).map_err(|e| invalid(PatternProblem::NotPortable(e)))?;
        Ok(Self {
            source: source.to_string(),
            regex,
            js,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The pattern as a JavaScript regex literal.
    pub fn js_literal(&self) -> String {
        self.js.literal()
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack)
    }
}

impl PartialEq for SafelistPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for SafelistPattern {}

/// One safelist rule, whatever its strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafelistRule<'a> {
    Standard(&'a str),
    Deep(&'a SafelistPattern),
    Greedy(&'a SafelistPattern),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Safelist {
    standard: Vec<String>,
    deep: Vec<SafelistPattern>,
    greedy: Vec<SafelistPattern>,
}

impl Safelist {
    pub fn from_raw(raw: RawSafelist) -> Result<Self, ConfigError> {
        if raw.standard.iter().any(|s| s.trim().is_empty()) {
            return Err(ConfigError::BlankEntry("safelist.standard"));
        }
        let deep = compile_patterns(&raw.deep, PatternCategory::Deep)?;
        let greedy = compile_patterns(&raw.greedy, PatternCategory::Greedy)?;
        Ok(Self {
            standard: raw.standard,
            deep,
            greedy,
        })
    }

    pub fn standard(&self) -> &[String] {
        &self.standard
    }

    pub fn deep(&self) -> &[SafelistPattern] {
        &self.deep
    }

    pub fn greedy(&self) -> &[SafelistPattern] {
        &self.greedy
    }

    pub fn is_empty(&self) -> bool {
        self.standard.is_empty() && self.deep.is_empty() && self.greedy.is_empty()
    }

    pub fn len(&self) -> usize {
        self.standard.len() + self.deep.len() + self.greedy.len()
    }

    /// All rules in declaration order, standard first.
    pub fn rules(&self) -> impl Iterator<Item = SafelistRule<'_>> {
        self.standard
            .iter()
            .map(|s| SafelistRule::Standard(s.as_str()))
            .chain(self.deep.iter().map(SafelistRule::Deep))
            .chain(self.greedy.iter().map(SafelistRule::Greedy))
    }

    fn to_raw(&self) -> RawSafelist {
        RawSafelist {
            standard: self.standard.clone(),
            deep: self.deep.iter().map(|p| p.source.clone()).collect(),
            greedy: self.greedy.iter().map(|p| p.source.clone()).collect(),
        }
    }
}

fn compile_patterns(
    sources: &[String],
    category: PatternCategory,
) -> Result<Vec<SafelistPattern>, ConfigError> {
    sources
        .iter()
        .map(|s| SafelistPattern::new(s, category))
        .collect()
}

/// A validated, read-only pruning descriptor.
///
/// The only ways to obtain one go through validation, so holding a
/// `PruneConfig` means every invariant holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPruneConfig", into = "RawPruneConfig")]
pub struct PruneConfig {
    content: Vec<String>,
    css: Vec<String>,
    output: String,
    in_place: bool,
    safelist: Safelist,
}

impl PruneConfig {
    pub fn new(
        content: Vec<String>,
        css: Vec<String>,
        output: impl Into<String>,
        safelist: RawSafelist,
    ) -> Result<Self, ConfigError> {
        Self::from_raw(RawPruneConfig {
            content,
            css,
            output: Some(output.into()),
            in_place: false,
            safelist,
        })
    }

    pub fn from_raw(raw: RawPruneConfig) -> Result<Self, ConfigError> {
        if raw.content.is_empty() {
            return Err(ConfigError::EmptyContent);
        }
        if raw.css.is_empty() {
            return Err(ConfigError::EmptyCss);
        }
        if raw.content.iter().any(|s| s.trim().is_empty()) {
            return Err(ConfigError::BlankEntry("content"));
        }
        if raw.css.iter().any(|s| s.trim().is_empty()) {
            return Err(ConfigError::BlankEntry("css"));
        }
        let output = match raw.output {
            Some(o) if !o.trim().is_empty() => o,
            _ => return Err(ConfigError::MissingOutput),
        };
        if !raw.in_place {
            let out = normalize_path(&output);
            if raw.css.iter().any(|c| normalize_path(c) == out) {
                return Err(ConfigError::OutputOverwritesSource(output));
            }
        }
        for pattern in &raw.content {
            compile_glob(pattern)?;
        }
        let safelist = Safelist::from_raw(raw.safelist)?;

        Ok(Self {
            content: raw.content,
            css: raw.css,
            output,
            in_place: raw.in_place,
            safelist,
        })
    }

    pub fn content(&self) -> &[String] {
        &self.content
    }

    pub fn css(&self) -> &[String] {
        &self.css
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn in_place(&self) -> bool {
        self.in_place
    }

    pub fn safelist(&self) -> &Safelist {
        &self.safelist
    }

    pub fn to_raw(&self) -> RawPruneConfig {
        RawPruneConfig {
            content: self.content.clone(),
            css: self.css.clone(),
            output: Some(self.output.clone()),
            in_place: self.in_place,
            safelist: self.safelist.to_raw(),
        }
    }
}

impl TryFrom<RawPruneConfig> for PruneConfig {
    type Error = ConfigError;

    fn try_from(raw: RawPruneConfig) -> Result<Self, Self::Error> {
        Self::from_raw(raw)
    }
}

impl From<PruneConfig> for RawPruneConfig {
    fn from(config: PruneConfig) -> Self {
        config.to_raw()
    }
}

/// Lexical normalisation: `./a/./b`, `a/x/../b` and `a/b` compare equal.
/// Does not touch the filesystem; `..` that would climb above the start is kept.
pub fn normalize_path(path: &str) -> PathBuf {
    let mut parts: Vec<Component> = Vec::new();
    for component in Path::new(path).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir if matches!(parts.last(), Some(Component::Normal(_))) => {
                parts.pop();
            }
            Component::ParentDir if matches!(parts.last(), Some(Component::RootDir)) => {}
            c => parts.push(c),
        }
    }
    parts.into_iter().collect()
}

/// A descriptor's sources resolved against a project root.
#[derive(Debug, Serialize)]
pub struct SourcePlan {
    pub root: PathBuf,
    pub content: Vec<ContentMatch>,
    pub css: Vec<PathBuf>,
    pub output: PathBuf,
}

/// Files matched by one content glob.
#[derive(Debug, Serialize)]
pub struct ContentMatch {
    pub pattern: String,
    pub files: Vec<PathBuf>,
}

impl SourcePlan {
    /// Every matched content file, deduplicated, in path order.
    pub fn content_files(&self) -> Vec<&Path> {
        let mut files: Vec<&Path> = self
            .content
            .iter()
            .flat_map(|m| m.files.iter().map(PathBuf::as_path))
            .collect();
        files.sort();
        files.dedup();
        files
    }
}
