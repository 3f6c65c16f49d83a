//! Structured element queries and the prioritized strategies that wrap them.

use std::fmt;

/// A single predicate the driver evaluates against the live UI tree.
///
/// The engine never interprets a query itself; it only builds them and hands
/// them to the driver. Variants are ordered here roughly by specificity, which
/// is also the order the standard strategy chain tries them in.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Exact match on the accessibility label or visible text.
    ExactLabel(String),
    /// Match on a named attribute value (e.g. `name`, `content-desc`).
    Attribute { name: String, value: String },
    /// Match on the node's class/type name.
    ClassName(String),
    /// Substring match over label and text. Broad; typically the last tier.
    Contains(String),
    /// Restrict an inner query to nodes whose vertical center falls within
    /// `[min_y, max_y)`. Used to separate UI layers (overlay vs. background)
    /// when textual identity is duplicated.
    WithinBand {
        inner: Box<Query>,
        min_y: f64,
        max_y: f64,
    },
    /// An intent string that could not be parsed, with the reason. Resolving
    /// it never matches; the chain logs and moves on.
    Invalid(String),
}

impl Query {
    /// Wrap this query in a vertical-band restriction.
    pub fn within_band(self, min_y: f64, max_y: f64) -> Query {
        Query::WithinBand {
            inner: Box::new(self),
            min_y,
            max_y,
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::ExactLabel(s) => write!(f, "label:{s}"),
            Query::Attribute { name, value } => write!(f, "attr:{name}={value}"),
            Query::ClassName(s) => write!(f, "class:{s}"),
            Query::Contains(s) => write!(f, "contains:{s}"),
            Query::WithinBand { inner, min_y, max_y } => {
                write!(f, "band:{min_y:.0}..{max_y:.0}({inner})")
            }
            Query::Invalid(reason) => write!(f, "invalid({reason})"),
        }
    }
}

impl From<&str> for Query {
    fn from(s: &str) -> Self {
        let s = s.trim();
        if let Some(rest) = s.strip_prefix("label:") {
            Query::ExactLabel(rest.trim().to_string())
        } else if let Some(rest) = s.strip_prefix("contains:") {
            Query::Contains(rest.trim().to_string())
        } else if let Some(rest) = s.strip_prefix("class:") {
            Query::ClassName(rest.trim().to_string())
        } else if let Some(rest) = s.strip_prefix("attr:") {
            match rest.split_once('=') {
                Some((name, value)) if !name.trim().is_empty() => Query::Attribute {
                    name: name.trim().to_string(),
                    value: value.trim().to_string(),
                },
                _ => Query::Invalid(format!(
                    "attribute query needs key=value, got \"{rest}\""
                )),
            }
        } else if s.is_empty() {
            Query::Invalid("empty query".to_string())
        } else {
            // Bare text is the common case; treat it as an exact label.
            Query::ExactLabel(s.to_string())
        }
    }
}

/// Expected result arity of a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// One target element; extra matches are disambiguated, not accumulated.
    Single,
    /// A set of elements (list rows, tabs); results accumulate across scrolls.
    Collection,
}

/// One prioritized attempt at locating elements: a query plus how many results
/// it is expected to produce.
#[derive(Debug, Clone, PartialEq)]
pub struct Strategy {
    pub query: Query,
    pub arity: Arity,
}

impl Strategy {
    pub fn single(query: Query) -> Self {
        Self {
            query,
            arity: Arity::Single,
        }
    }

    pub fn collection(query: Query) -> Self {
        Self {
            query,
            arity: Arity::Collection,
        }
    }
}
