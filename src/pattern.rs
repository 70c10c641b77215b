//! Glob-style file-name patterns used to restrict the directory scan.

use regex::Regex;

use crate::error::{ManifestError, Result};

/// A compiled file-name pattern such as `*.h5`.
///
/// Supports `*`, `?`, `[abc]` and `[!abc]`. Matching is anchored and applies to the
/// file name only, never to directory components.
#[derive(Debug, Clone)]
pub struct FilePattern {
    source: String,
    regex: Regex,
}

impl FilePattern {
    /// Compile a glob pattern.
    pub fn new(pattern: &str) -> Result<Self> {
        let translated = translate_glob(pattern);
        let regex = Regex::new(&translated).map_err(|source| ManifestError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Returns `true` when the file name matches the pattern.
    pub fn matches(&self, file_name: &str) -> bool {
        self.regex.is_match(file_name)
    }

    /// The pattern as originally written.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

fn translate_glob(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push('^');

    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '[' => {
                let negated = chars.peek() == Some(&'!');
                if negated {
                    chars.next();
                }

                let mut members = String::new();
                let mut closed = false;
                // A leading `]` is a literal member of the class.
                if chars.peek() == Some(&']') {
                    chars.next();
                    members.push(']');
                }
                for member in chars.by_ref() {
                    if member == ']' {
                        closed = true;
                        break;
                    }
                    members.push(member);
                }

                if closed {
                    out.push('[');
                    if negated {
                        out.push('^');
                    }
                    for member in members.chars() {
                        if matches!(member, '\\' | '[' | ']' | '^' | '&' | '~') {
                            out.push('\\');
                        }
                        out.push(member);
                    }
                    out.push(']');
                } else {
                    // Unterminated class: the bracket and its tail are literal text.
                    let bang = if negated { "!" } else { "" };
                    out.push_str(&regex::escape(&format!("[{bang}{members}")));
                }
            }
            other => out.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }

    out.push('$');
    out
}
