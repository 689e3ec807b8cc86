//! Safelist matching.
//!
//! An engine asks, for each selector in a stylesheet, whether it survives given the
//! names it found in content. The rules, in order:
//!
//! - greedy patterns are tried against the whole selector text and against every
//!   name in it, so attribute selectors such as `[data-bs-toggle]` can match;
//! - deep patterns are tried against every name; a hit keeps the selector in full,
//!   including its pseudo-state variants and any rules nested below it;
//! - otherwise every name must be used in content or listed in `standard`.
//!
//! Patterns search rather than match, so anchoring is up to the pattern:
//! `^alert-` keeps `.alert-danger` but not `.alertdanger`.

use crate::app::models::Safelist;
use serde::Serialize;
use std::collections::HashSet;

/// Why a selector was kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Reason {
    Used,
    Standard,
    Deep,
    Greedy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "verdict", content = "reason")]
pub enum Verdict {
    Keep(Reason),
    Drop,
}

impl Verdict {
    pub fn is_keep(&self) -> bool {
        matches!(self, Verdict::Keep(_))
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Keep(Reason::Used) => f.write_str("keep (used)"),
            Verdict::Keep(Reason::Standard) => f.write_str("keep (standard)"),
            Verdict::Keep(Reason::Deep) => f.write_str("keep (deep)"),
            Verdict::Keep(Reason::Greedy) => f.write_str("keep (greedy)"),
            Verdict::Drop => f.write_str("drop"),
        }
    }
}

impl Safelist {
    /// Decides a single compound/complex selector (no top-level commas).
    pub fn verdict(&self, selector: &str, used: &HashSet<String>) -> Verdict {
        let selector = selector.trim();
        let names = selector_names(selector);

        if self
            .greedy()
            .iter()
            .any(|p| p.is_match(selector) || names.iter().any(|n| p.is_match(n)))
        {
            return Verdict::Keep(Reason::Greedy);
        }

        if self
            .deep()
            .iter()
            .any(|p| names.iter().any(|n| p.is_match(n)))
        {
            return Verdict::Keep(Reason::Deep);
        }

        let mut needed_standard = false;
        for name in &names {
            if used.contains(name.as_str()) {
                continue;
            }
            if self.standard().iter().any(|s| s == name) {
                needed_standard = true;
                continue;
            }
            return Verdict::Drop;
        }

        if needed_standard {
            Verdict::Keep(Reason::Standard)
        } else {
            Verdict::Keep(Reason::Used)
        }
    }

    /// Decides a selector list; the rule survives if any member does.
    ///
    /// A list with no members is judged like an empty selector.
    pub fn verdict_all(&self, selectors: &str, used: &HashSet<String>) -> Verdict {
        let members = split_selector_list(selectors);
        if members.is_empty() {
            return self.verdict("", used);
        }
        members
            .into_iter()
            .map(|s| self.verdict(s, used))
            .find(Verdict::is_keep)
            .unwrap_or(Verdict::Drop)
    }
}

/// Class, id and type names referenced by a selector, unescaped.
///
/// Attribute brackets, pseudo-classes and their arguments are skipped.
pub fn selector_names(selector: &str) -> Vec<String> {
    let chars: Vec<char> = selector.chars().collect();
    let mut names = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '[' => i = skip_balanced(&chars, i, '[', ']'),
            ':' => {
                while i < chars.len() && chars[i] == ':' {
                    i += 1;
                }
                let (_, next) = read_ident(&chars, i);
                i = next;
                if i < chars.len() && chars[i] == '(' {
                    i = skip_balanced(&chars, i, '(', ')');
                }
            }
            '.' | '#' => {
                let (name, next) = read_ident(&chars, i + 1);
                if !name.is_empty() {
                    names.push(name);
                }
                i = next.max(i + 1);
            }
            c if is_ident_char(c) || c == '\\' => {
                let (name, next) = read_ident(&chars, i);
                names.push(name);
                i = next;
            }
            _ => i += 1,
        }
    }

    names
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

fn read_ident(chars: &[char], mut i: usize) -> (String, usize) {
    let mut out = String::new();
    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            if let Some(&escaped) = chars.get(i + 1) {
                out.push(escaped);
            }
            i += 2;
        } else if is_ident_char(c) {
            out.push(c);
            i += 1;
        } else {
            break;
        }
    }
    (out, i.min(chars.len()))
}

/// Index just past the bracket that closes the one at `start`. Quoted text is opaque.
fn skip_balanced(chars: &[char], start: usize, open: char, close: char) -> usize {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut i = start;
    while i < chars.len() {
        let c = chars[i];
        match quote {
            Some(_) if c == '\\' => i += 1,
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == open => depth += 1,
            None if c == close => {
                depth -= 1;
                if depth == 0 {
                    return i + 1;
                }
            }
            None => {}
        }
        i += 1;
    }
    chars.len()
}

/// Splits `a, b:not(.c, .d)` into `a` and `b:not(.c, .d)`.
pub fn split_selector_list(list: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;
    let mut escaped = false;

    for (idx, c) in list.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, c) {
            (_, '\\') => escaped = true,
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') => depth = (depth - 1).max(0),
            (None, ',') if depth == 0 => {
                parts.push(list[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(list[start..].trim());
    parts.retain(|p| !p.is_empty());
    parts
}
