//! Java-style `.properties` files (`build.properties`, resolver tables).

use std::path::Path;

use anyhow::{Context, Result};

/// An ordered key/value list read from a properties file.
///
/// Later duplicates win on lookup; iteration keeps file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: Vec<(String, String)>,
}

impl Properties {
    pub fn new() -> Self {
        Properties {
            entries: Vec::new(),
        }
    }

    /// Load and parse a properties file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read properties file: {}", path.display()))?;
        Ok(Self::parse(&contents))
    }

    /// Parse properties text. Malformed lines degrade to keys with empty values.
    pub fn parse(contents: &str) -> Self {
        let mut properties = Properties::new();
        let mut logical = String::new();

        for raw in contents.lines() {
            let line = raw.trim_start();

            if logical.is_empty() && (line.is_empty() || line.starts_with('#') || line.starts_with('!')) {
                continue;
            }

            if ends_with_continuation(line) {
                logical.push_str(&line[..line.len() - 1]);
                continue;
            }

            logical.push_str(line);
            properties.push_line(&std::mem::take(&mut logical));
        }

        if !logical.is_empty() {
            properties.push_line(&logical);
        }

        properties
    }

    fn push_line(&mut self, line: &str) {
        let mut key = String::new();
        let mut chars = line.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        key.push(unescape(escaped));
                    }
                }
                '=' | ':' => break,
                c if c.is_whitespace() => {
                    while chars.peek().is_some_and(|c| c.is_whitespace()) {
                        chars.next();
                    }
                    if matches!(chars.peek(), Some('=') | Some(':')) {
                        chars.next();
                    }
                    break;
                }
                c => key.push(c),
            }
        }

        let rest: String = chars.collect();
        let mut value = String::new();
        let mut rest_chars = rest.trim_start().chars();
        while let Some(c) = rest_chars.next() {
            if c == '\\' {
                if let Some(escaped) = rest_chars.next() {
                    value.push(unescape(escaped));
                }
            } else {
                value.push(c);
            }
        }

        self.entries.push((key, value));
    }

    /// Look up a value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Look up a comma separated list value, trimmed, empty items removed.
    pub fn get_list(&self, key: &str) -> Vec<String> {
        self.get(key)
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Entries whose key starts with `prefix.`, with the prefix stripped.
    pub fn with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.entries.iter().filter_map(move |(k, v)| {
            k.strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix('.'))
                .filter(|rest| !rest.is_empty())
                .map(|rest| (rest, v.as_str()))
        })
    }

    /// Iterate over all entries in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn ends_with_continuation(line: &str) -> bool {
    let backslashes = line.chars().rev().take_while(|&c| c == '\\').count();
    backslashes % 2 == 1
}

fn unescape(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        other => other,
    }
}
