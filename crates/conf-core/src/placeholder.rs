//! Placeholder tokens embedded in string values
//!
//! ```text
//! ${key}        another configuration key
//! $sys{name}    a system property
//! $env{NAME}    an environment variable
//! ```

use regex::Regex;
use std::fmt;
use std::ops::Range;
use std::sync::LazyLock;

static PLACEHOLDER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(sys|env)?\{([^{}]+)\}").expect("Invalid placeholder regex")
});

/// The category of a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderKind {
    /// `${key}`
    Reference,
    /// `$sys{name}`
    System,
    /// `$env{NAME}`
    Environment,
}

impl PlaceholderKind {
    fn prefix(self) -> &'static str {
        match self {
            Self::Reference => "$",
            Self::System => "$sys",
            Self::Environment => "$env",
        }
    }

    /// The literal token for `name`, e.g. `$env{HOME}`.
    pub fn token(self, name: &str) -> String {
        format!("{}{{{}}}", self.prefix(), name)
    }
}

impl fmt::Display for PlaceholderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Reference => "configuration key",
            Self::System => "system property",
            Self::Environment => "environment variable",
        })
    }
}

/// A placeholder found in a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub kind: PlaceholderKind,
    pub name: String,
    /// Byte range of the whole token
    pub range: Range<usize>,
}

/// All placeholders in `text`, in order of appearance.
pub fn scan(text: &str) -> Vec<Placeholder> {
    if !text.contains('$') {
        return Vec::new();
    }
    PLACEHOLDER_REGEX
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let kind = match caps.get(1).map(|m| m.as_str()) {
                None => PlaceholderKind::Reference,
                Some("sys") => PlaceholderKind::System,
                Some(_) => PlaceholderKind::Environment,
            };
            Some(Placeholder {
                kind,
                name: caps.get(2)?.as_str().to_string(),
                range: whole.range(),
            })
        })
        .collect()
}

/// Names of every placeholder of `kind` in `text`.
pub fn names(text: &str, kind: PlaceholderKind) -> impl Iterator<Item = String> {
    scan(text)
        .into_iter()
        .filter(move |p| p.kind == kind)
        .map(|p| p.name)
}

pub fn contains(text: &str, kind: PlaceholderKind) -> bool {
    scan(text).iter().any(|p| p.kind == kind)
}

/// Replace every placeholder of `kind` with the value `lookup` returns for
/// its name. Other placeholders and literal text are copied through.
pub fn substitute<E>(
    text: &str,
    kind: PlaceholderKind,
    mut lookup: impl FnMut(&str) -> Result<String, E>,
) -> Result<String, E> {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for placeholder in scan(text).into_iter().filter(|p| p.kind == kind) {
        out.push_str(&text[last..placeholder.range.start]);
        out.push_str(&lookup(&placeholder.name)?);
        last = placeholder.range.end;
    }
    out.push_str(&text[last..]);
    Ok(out)
}
