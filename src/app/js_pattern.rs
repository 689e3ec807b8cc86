//! Translation of safelist patterns into JavaScript regex literals.
//!
//! Patterns are written in `regex` syntax and exported to PurgeCSS as `/.../flags`.
//! Constructs that both dialects read the same way are copied; a leading inline
//! flag group becomes literal flags and `(?P<name>` becomes `(?<name>`. Anything
//! JavaScript would reject or read differently (`\A`, `\z`, `\p{..}`, `(?x)`,
//! nested classes, class set operations) is refused, so a descriptor that loads
//! always exports to the same matcher.

/// A pattern as it will appear in the PurgeCSS config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsRegex {
    body: String,
    flags: String,
}

impl JsRegex {
    /// The `/body/flags` literal.
    pub fn literal(&self) -> String {
        format!("/{}/{}", self.body, self.flags)
    }
}

/// Escapes that mean the same thing in both dialects.
const PORTABLE_ESCAPES: &[char] = &['d', 'D', 's', 'S', 'w', 'W', 'b', 'B', 'n', 'r', 't', 'f', 'v'];

/// Inline flags with a JavaScript counterpart.
const PORTABLE_FLAGS: &[char] = &['i', 'm', 's'];

pub fn translate(source: &str) -> Result<JsRegex, String> {
    let (flags, body) = leading_flags(source)?;
    let chars: Vec<char> = body.chars().collect();
    let mut out = String::with_capacity(body.len() + 2);
    let mut in_class = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\\' => {
                let Some(&next) = chars.get(i + 1) else {
                    return Err("a trailing `\\`".to_string());
                };
                match next {
                    'x' | 'u' if chars.get(i + 2) == Some(&'{') => {
                        return Err(format!("`\\{}{{...}}`", next));
                    }
                    'x' | 'u' => out.push_str(&format!("\\{}", next)),
                    c if PORTABLE_ESCAPES.contains(&c) => out.push_str(&format!("\\{}", c)),
                    '/' => out.push_str("\\/"),
                    c if c.is_ascii_alphanumeric() => return Err(format!("`\\{}`", c)),
                    c => {
                        out.push('\\');
                        out.push(c);
                    }
                }
                i += 2;
                continue;
            }
            '/' => out.push_str("\\/"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '[' if in_class => return Err("a nested character class".to_string()),
            '[' => {
                in_class = true;
                out.push('[');
                if chars.get(i + 1) == Some(&'^') {
                    out.push('^');
                    i += 1;
                }
                if chars.get(i + 1) == Some(&']') {
                    return Err("a leading `]` in a character class".to_string());
                }
            }
            ']' if in_class => {
                in_class = false;
                out.push(']');
            }
            '&' | '-' | '~' if in_class && chars.get(i + 1) == Some(&c) => {
                return Err(format!("the class operator `{}{}`", c, c));
            }
            '(' if !in_class && chars.get(i + 1) == Some(&'?') => {
                let rest: String = chars[i + 2..].iter().collect();
                if rest.starts_with(':') {
                    out.push_str("(?:");
                    i += 3;
                } else if rest.starts_with("P<") {
                    out.push_str("(?<");
                    i += 4;
                } else if rest.starts_with('<') {
                    out.push_str("(?<");
                    i += 3;
                } else {
                    return Err("an inline flag group".to_string());
                }
                continue;
            }
            c => out.push(c),
        }
        i += 1;
    }

    Ok(JsRegex { body: out, flags })
}

/// Splits `(?is)rest` into the JavaScript flags and the rest.
fn leading_flags(source: &str) -> Result<(String, &str), String> {
    let Some(after) = source.strip_prefix("(?") else {
        return Ok((String::new(), source));
    };
    let Some(end) = after.find(|c: char| !c.is_ascii_alphabetic() && c != '-') else {
        return Ok((String::new(), source));
    };
    if !after[end..].starts_with(')') || end == 0 {
        // A group such as `(?:` or `(?i:`; handled with the body.
        return Ok((String::new(), source));
    }

    let mut flags = String::new();
    for flag in after[..end].chars() {
        if !PORTABLE_FLAGS.contains(&flag) {
            return Err(format!("the inline flag `{}`", flag));
        }
        if !flags.contains(flag) {
            flags.push(flag);
        }
    }
    Ok((flags, &after[end + 1..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(source: &str) -> String {
        translate(source).unwrap().literal()
    }

    #[test]
    fn simple_patterns_are_copied() {
        assert_eq!(literal("^alert-"), "/^alert-/");
        assert_eq!(literal("\\d+$"), "/\\d+$/");
        assert_eq!(literal("^(?:btn|nav)-[a-z0-9_-]+"), "/^(?:btn|nav)-[a-z0-9_-]+/");
        assert_eq!(literal("\\.\\-x"), "/\\.\\-x/");
    }

    #[test]
    fn slashes_are_escaped_once() {
        assert_eq!(literal("a/b"), "/a\\/b/");
        assert_eq!(literal("a\\/b"), "/a\\/b/");
    }

    #[test]
    fn leading_flags_become_literal_flags() {
        assert_eq!(literal("(?i)^alert-"), "/^alert-/i");
        assert_eq!(literal("(?ims)x"), "/x/ims");
        assert_eq!(literal("(?P<fam>btn)-"), "/(?<fam>btn)-/");
    }

    #[test]
    fn constructs_javascript_reads_differently_are_refused() {
        for source in [
            "\\Abtn-",
            "btn-\\z",
            "\\p{L}+",
            "\\x{41}",
            "(?x)^ alert-",
            "(?-i)x",
            "^a(?i)b",
            "(?i:b)",
            "[[:alpha:]]",
            "[a-z&&[^x]]",
            "[]a]",
        ] {
            assert!(translate(source).is_err(), "{source} should be refused");
        }
    }
}
