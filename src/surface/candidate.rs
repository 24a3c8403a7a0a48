// ABOUTME: Selector candidates - alternative ways of locating one logical element.
// ABOUTME: A closed set of discovery strategies, each with its own payload.

use std::fmt;

use regex::Regex;

/// How a candidate's text is compared against an element's text.
#[derive(Debug, Clone)]
pub enum TextPattern {
    /// Whole-string equality after trimming.
    Exact(String),
    /// Substring match.
    Contains(String),
    /// Regular-expression match.
    Regex(Regex),
}

impl TextPattern {
    /// Build a regex pattern.
    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        Ok(TextPattern::Regex(Regex::new(pattern)?))
    }

    pub fn contains(text: impl Into<String>) -> Self {
        TextPattern::Contains(text.into())
    }

    pub fn matches(&self, text: &str) -> bool {
        match self {
            TextPattern::Exact(expected) => text.trim() == expected.as_str(),
            TextPattern::Contains(needle) => text.contains(needle.as_str()),
            TextPattern::Regex(re) => re.is_match(text),
        }
    }
}

impl From<&str> for TextPattern {
    fn from(text: &str) -> Self {
        TextPattern::Exact(text.to_string())
    }
}

impl From<String> for TextPattern {
    fn from(text: String) -> Self {
        TextPattern::Exact(text)
    }
}

impl From<Regex> for TextPattern {
    fn from(re: Regex) -> Self {
        TextPattern::Regex(re)
    }
}

impl fmt::Display for TextPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextPattern::Exact(text) => write!(f, "\"{text}\""),
            TextPattern::Contains(text) => write!(f, "*{text}*"),
            TextPattern::Regex(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

/// Discovery strategy tag of a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocatorStrategy {
    Role,
    Text,
    Css,
    Placeholder,
    Label,
}

impl LocatorStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            LocatorStrategy::Role => "role",
            LocatorStrategy::Text => "text",
            LocatorStrategy::Css => "css",
            LocatorStrategy::Placeholder => "placeholder",
            LocatorStrategy::Label => "label",
        }
    }
}

/// One way of finding an element.
///
/// Several candidates describe the same logical target; callers list them
/// from most to least stable and the resolver takes the first visible one.
#[derive(Debug, Clone)]
pub enum SelectorCandidate {
    /// ARIA role plus optional accessible name.
    Role {
        role: String,
        name: Option<TextPattern>,
    },
    /// Visible text content.
    Text(TextPattern),
    /// Structural (CSS) query.
    Css(String),
    /// Input placeholder text.
    Placeholder(TextPattern),
    /// Associated form label text.
    Label(TextPattern),
}

impl SelectorCandidate {
    pub fn role(role: impl Into<String>, name: impl Into<TextPattern>) -> Self {
        SelectorCandidate::Role {
            role: role.into(),
            name: Some(name.into()),
        }
    }

    pub fn any_role(role: impl Into<String>) -> Self {
        SelectorCandidate::Role {
            role: role.into(),
            name: None,
        }
    }

    pub fn text(pattern: impl Into<TextPattern>) -> Self {
        SelectorCandidate::Text(pattern.into())
    }

    pub fn css(query: impl Into<String>) -> Self {
        SelectorCandidate::Css(query.into())
    }

    pub fn placeholder(pattern: impl Into<TextPattern>) -> Self {
        SelectorCandidate::Placeholder(pattern.into())
    }

    pub fn label(pattern: impl Into<TextPattern>) -> Self {
        SelectorCandidate::Label(pattern.into())
    }

    pub fn strategy(&self) -> LocatorStrategy {
        match self {
            SelectorCandidate::Role { .. } => LocatorStrategy::Role,
            SelectorCandidate::Text(_) => LocatorStrategy::Text,
            SelectorCandidate::Css(_) => LocatorStrategy::Css,
            SelectorCandidate::Placeholder(_) => LocatorStrategy::Placeholder,
            SelectorCandidate::Label(_) => LocatorStrategy::Label,
        }
    }

    /// Stable human-readable label, used in traces and error payloads.
    pub fn label_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SelectorCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorCandidate::Role { role, name: None } => write!(f, "role={role}"),
            SelectorCandidate::Role {
                role,
                name: Some(name),
            } => write!(f, "role={role}[name={name}]"),
            SelectorCandidate::Text(p) => write!(f, "text={p}"),
            SelectorCandidate::Css(q) => write!(f, "css={q}"),
            SelectorCandidate::Placeholder(p) => write!(f, "placeholder={p}"),
            SelectorCandidate::Label(p) => write!(f, "label={p}"),
        }
    }
}
