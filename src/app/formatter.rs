use crate::app::models::{PruneConfig, SafelistPattern, SourcePlan};
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

/// First line of every exported module; marks files this tool may overwrite.
pub const GENERATED_HEADER: &str = "// Generated by css-prune. Edit prune.toml instead.";

pub struct OutputGenerator;

impl OutputGenerator {
    /// Human-readable summary of a resolved plan.
    pub fn generate_plan(config: &PruneConfig, plan: &SourcePlan) -> String {
        let mut output = String::new();

        output.push_str(&format!("root: {}\n", plan.root.display()));
        output.push_str("content:\n");
        for m in &plan.content {
            output.push_str(&format!("    {} ({} files)\n", m.pattern, m.files.len()));
            for file in &m.files {
                output.push_str(&format!("        {}\n", file.display()));
            }
        }

        output.push_str("css:\n");
        for css in &plan.css {
            output.push_str(&format!("    {}\n", css.display()));
        }

        let mode = if config.in_place() { " (in place)" } else { "" };
        output.push_str(&format!("output: {}{}\n", plan.output.display(), mode));

        let safelist = config.safelist();
        output.push_str(&format!(
            "safelist: {} standard, {} deep, {} greedy",
            safelist.standard().len(),
            safelist.deep().len(),
            safelist.greedy().len()
        ));

        output
    }

    pub fn generate_plan_json(plan: &SourcePlan) -> Result<String> {
        Ok(serde_json::to_string_pretty(plan)?)
    }

    /// A PurgeCSS `module.exports` config equivalent to the descriptor.
    pub fn render_purgecss(config: &PruneConfig) -> String {
        let mut out = format!("{}\nmodule.exports = {{\n", GENERATED_HEADER);

        out.push_str("  content: [\n");
        for c in config.content() {
            out.push_str(&format!("    {},\n", js_string(c)));
        }
        out.push_str("  ],\n");

        let css: Vec<String> = config.css().iter().map(|c| js_string(c)).collect();
        out.push_str(&format!("  css: [{}],\n", css.join(", ")));
        out.push_str(&format!("  output: {},\n", js_string(config.output())));

        let safelist = config.safelist();
        out.push_str("  safelist: {\n");
        out.push_str("    standard: [\n");
        for s in safelist.standard() {
            out.push_str(&format!("      {},\n", js_string(s)));
        }
        out.push_str("    ],\n");
        push_patterns(&mut out, "deep", safelist.deep());
        push_patterns(&mut out, "greedy", safelist.greedy());
        out.push_str("  }\n");

        out.push_str("}\n");
        out
    }

    /// Writes an exported module, refusing to replace a file this tool didn't generate.
    pub fn write_module(path: &Path, module: &str, force: bool) -> Result<()> {
        if !force && path.exists() {
            let existing = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            if !existing.starts_with(GENERATED_HEADER) {
                bail!(
                    "{} was not generated by css-prune (use --force to overwrite)",
                    path.display()
                );
            }
        }
        fs::write(path, module).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

fn push_patterns(out: &mut String, key: &str, patterns: &[SafelistPattern]) {
    out.push_str(&format!("    {}: [\n", key));
    for p in patterns {
        out.push_str(&format!("      {},\n", p.js_literal()));
    }
    out.push_str("    ],\n");
}

fn js_string(s: &str) -> String {
    // JSON string literals are valid JavaScript.
    serde_json::Value::String(s.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::{ContentMatch, RawSafelist};
    use std::path::PathBuf;

    fn config() -> PruneConfig {
        PruneConfig::new(
            vec!["./templates/**/*.html".into()],
            vec!["./static/css/bootstrap.full.css".into()],
            "./static/css/bootstrap.min.css",
            RawSafelist {
                standard: vec!["show".into()],
                deep: vec!["^alert-".into(), "(?i)^btn-".into()],
                greedy: vec!["data-bs-".into(), "a/b".into()],
            },
        )
        .unwrap()
    }

    #[test]
    fn purgecss_module_lists_every_field() {
        let js = OutputGenerator::render_purgecss(&config());
        let expected = r#"// Generated by css-prune. Edit prune.toml instead.
module.exports = {
  content: [
    "./templates/**/*.html",
  ],
  css: ["./static/css/bootstrap.full.css"],
  output: "./static/css/bootstrap.min.css",
  safelist: {
    standard: [
      "show",
    ],
    deep: [
      /^alert-/,
      /^btn-/i,
    ],
    greedy: [
      /data-bs-/,
      /a\/b/,
    ],
  }
}
"#;
        assert_eq!(js, expected);
    }

    #[test]
    fn plan_summary_counts_files() {
        let plan = SourcePlan {
            root: PathBuf::from("/srv/site"),
            content: vec![ContentMatch {
                pattern: "./templates/**/*.html".into(),
                files: vec![PathBuf::from("templates/base.html")],
            }],
            css: vec![PathBuf::from("/srv/site/static/css/bootstrap.full.css")],
            output: PathBuf::from("/srv/site/static/css/bootstrap.min.css"),
        };
        let text = OutputGenerator::generate_plan(&config(), &plan);
        assert!(text.contains("./templates/**/*.html (1 files)"));
        assert!(text.contains("        templates/base.html"));
        assert!(text.ends_with("safelist: 1 standard, 2 deep, 2 greedy"));

        let json = OutputGenerator::generate_plan_json(&plan).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["content"][0]["files"][0], "templates/base.html");
    }

    #[test]
    fn hand_written_module_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("purgecss.config.js");
        let hand_written = "// hand written\nmodule.exports = {};\n";
        fs::write(&path, hand_written).unwrap();

        let module = OutputGenerator::render_purgecss(&config());
        assert!(OutputGenerator::write_module(&path, &module, false).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), hand_written);

        OutputGenerator::write_module(&path, &module, true).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), module);
    }

    #[test]
    fn generated_module_is_refreshed_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("purgecss.config.js");
        let module = OutputGenerator::render_purgecss(&config());

        OutputGenerator::write_module(&path, "stale", false).unwrap();
        assert!(OutputGenerator::write_module(&path, &module, false).is_err());

        fs::write(&path, format!("{}\nold\n", GENERATED_HEADER)).unwrap();
        OutputGenerator::write_module(&path, &module, false).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), module);
    }
}
