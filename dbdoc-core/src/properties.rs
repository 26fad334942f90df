//! Java-style properties files.
//!
//! Each `key = value` line defines one entry; lines that do not match (blank
//! lines, `#` comments) are ignored. A value may be wrapped in double
//! quotes. Values use backslash escapes for `= : space \t \r \n \f # ! \`
//! and `\uXXXX` for everything else outside printable ASCII. Saving writes
//! entries sorted by key, so output is deterministic.

use crate::{Result, error::DbDocError};
use regex::Regex;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::OnceLock;

#[allow(clippy::expect_used)]
fn property_line() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*([\w.\-]+)\s*=\s*(.*)$").expect("property line pattern is valid")
    })
}

/// Escape letter for a character that has one.
fn escape_letter(c: char) -> Option<char> {
    match c {
        '=' | ':' | ' ' | '#' | '!' | '\\' => Some(c),
        '\t' => Some('t'),
        '\r' => Some('r'),
        '\n' => Some('n'),
        '\u{0C}' => Some('f'),
        _ => None,
    }
}

/// Character an escape letter stands for.
fn unescape_letter(c: char) -> Option<char> {
    match c {
        '=' | ':' | ' ' | '#' | '!' | '\\' => Some(c),
        't' => Some('\t'),
        'r' => Some('\r'),
        'n' => Some('\n'),
        'f' => Some('\u{0C}'),
        _ => None,
    }
}

/// Escapes a value for writing.
pub fn escape_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if let Some(letter) = escape_letter(c) {
            escaped.push('\\');
            escaped.push(letter);
        } else if (' '..='~').contains(&c) {
            escaped.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                escaped.push_str(&format!("\\u{:04X}", unit));
            }
        }
    }
    escaped
}

/// Reads the four hex digits of a `\u` escape starting at `chars`.
fn read_unicode_unit(chars: &mut std::str::Chars<'_>) -> Result<u16> {
    let code: String = chars.by_ref().take(4).collect();
    if code.chars().count() != 4 {
        return Err(DbDocError::configuration(format!(
            "illegal unicode escape sequence \\u{}",
            code
        )));
    }
    u16::from_str_radix(&code, 16).map_err(|_| {
        DbDocError::configuration(format!("illegal unicode escape sequence \\u{}", code))
    })
}

/// Resolves the escapes in a raw value.
///
/// # Errors
/// Unknown escapes, truncated `\u` escapes and unpaired surrogates are
/// configuration errors.
pub fn unescape_value(raw: &str) -> Result<String> {
    let mut value = String::with_capacity(raw.len());
    let mut units: Vec<u16> = Vec::new();
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            flush_units(&mut units, &mut value)?;
            value.push(c);
            continue;
        }

        match chars.next() {
            Some('u') => units.push(read_unicode_unit(&mut chars)?),
            Some(letter) => {
                flush_units(&mut units, &mut value)?;
                let replacement = unescape_letter(letter).ok_or_else(|| {
                    DbDocError::configuration(format!("unknown escape \\{}", letter))
                })?;
                value.push(replacement);
            }
            None => {
                return Err(DbDocError::configuration(
                    "dangling backslash at end of value",
                ));
            }
        }
    }

    flush_units(&mut units, &mut value)?;
    Ok(value)
}

fn flush_units(units: &mut Vec<u16>, value: &mut String) -> Result<()> {
    for decoded in char::decode_utf16(units.drain(..)) {
        let c = decoded.map_err(|e| {
            DbDocError::configuration(format!(
                "unpaired surrogate \\u{:04X} in unicode escape",
                e.unpaired_surrogate()
            ))
        })?;
        value.push(c);
    }
    Ok(())
}

/// Strips one pair of surrounding double quotes.
fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(value)
}

/// Sorted key/value configuration loaded from a properties file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: BTreeMap<String, String>,
}

impl Properties {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses properties from text.
    pub fn parse(text: &str) -> Result<Self> {
        let mut properties = Self::new();
        properties.load(text.as_bytes())?;
        Ok(properties)
    }

    /// Reads a properties file.
    ///
    /// # Errors
    /// I/O failures and malformed escapes.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|e| DbDocError::io(format!("opening {}", path.display()), e))?;
        let mut properties = Self::new();
        properties.load(std::io::BufReader::new(file))?;
        tracing::debug!(
            "Loaded {} properties from {}",
            properties.len(),
            path.display()
        );
        Ok(properties)
    }

    /// Merges entries read from `reader`; later lines win.
    pub fn load<R: BufRead>(&mut self, reader: R) -> Result<()> {
        for (number, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| DbDocError::io("reading properties", e))?;
            let Some(captures) = property_line().captures(&line) else {
                continue;
            };

            let key = &captures[1];
            let value = unescape_value(unquote(&captures[2])).map_err(|e| {
                DbDocError::configuration(format!("line {} ({}): {}", number + 1, key, e))
            })?;
            self.entries.insert(key.to_string(), value);
        }
        Ok(())
    }

    /// Writes every entry as `key=value`, sorted by key.
    pub fn save<W: Write>(&self, mut writer: W) -> Result<()> {
        for (key, value) in &self.entries {
            writeln!(writer, "{}={}", key, escape_value(value))
                .map_err(|e| DbDocError::io("writing properties", e))?;
        }
        Ok(())
    }

    /// Looks up a value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Sets a value, returning the previous one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
