//! Route template compilation and path matching.
//!
//! # Responsibilities
//! - Parse a route template into literal, parameter and wildcard segments
//! - Reject malformed templates at startup
//! - Match a request path against a compiled template and extract params
//!
//! # Design Decisions
//! - One leading `/` is ignored on both template and path (`A` == `/A`)
//! - Literal comparison is case-sensitive
//! - A failed constraint rejects the whole route, not just the parameter
//! - No regex: matching is a single left-to-right walk over the path

use std::collections::{HashMap, HashSet};
use std::fmt;

use thiserror::Error;

/// Route values extracted from a matched path, keyed by parameter name.
pub type Params = HashMap<String, String>;

/// Errors raised while compiling a route template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// A catch-all segment appears before the end of the template.
    #[error("wildcard `{name}` must be the last segment of `{template}`")]
    WildcardNotLast { template: String, name: String },

    /// Two segments declare the same parameter name.
    #[error("parameter `{name}` is declared more than once in `{template}`")]
    DuplicateParameter { template: String, name: String },

    /// A `{}` or `{**}` segment without a name.
    #[error("empty parameter name in `{template}`")]
    EmptyName { template: String },

    /// Only `int` is understood.
    #[error("unknown constraint `{constraint}` on parameter `{name}`")]
    UnknownConstraint { name: String, constraint: String },

    /// Unbalanced braces or braces mixed with literal text.
    #[error("malformed segment `{segment}` in `{template}`")]
    MalformedSegment { template: String, segment: String },
}

/// Restriction applied to a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    None,
    /// Base-10 `i32`, optional sign, no overflow.
    Int,
}

impl Constraint {
    fn parse(name: &str, raw: Option<&str>) -> Result<Self, PatternError> {
        match raw {
            None => Ok(Constraint::None),
            Some("int") => Ok(Constraint::Int),
            Some(other) => Err(PatternError::UnknownConstraint {
                name: name.to_string(),
                constraint: other.to_string(),
            }),
        }
    }

    fn accepts(&self, value: &str) -> bool {
        match self {
            Constraint::None => true,
            Constraint::Int => value.parse::<i32>().is_ok(),
        }
    }
}

/// One `/`-separated piece of a compiled template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Parameter { name: String, constraint: Constraint },
    /// Greedy: captures the rest of the path, `/` included.
    Wildcard(String),
}

impl Segment {
    fn name(&self) -> Option<&str> {
        match self {
            Segment::Literal(_) => None,
            Segment::Parameter { name, .. } | Segment::Wildcard(name) => Some(name),
        }
    }
}

/// A compiled route template. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    template: String,
    segments: Vec<Segment>,
}

impl Pattern {
    /// Compile a template such as `/customers/{id:int}` or `/files/{**path}`.
    pub fn compile(template: &str) -> Result<Self, PatternError> {
        let mut segments: Vec<Segment> = Vec::new();
        let mut names = HashSet::new();

        for raw in split_path(template) {
            if let Some(Segment::Wildcard(name)) = segments.last() {
                return Err(PatternError::WildcardNotLast {
                    template: template.to_string(),
                    name: name.clone(),
                });
            }

            let segment = parse_segment(template, raw)?;
            if let Some(name) = segment.name() {
                if !names.insert(name.to_string()) {
                    return Err(PatternError::DuplicateParameter {
                        template: template.to_string(),
                        name: name.to_string(),
                    });
                }
            }
            segments.push(segment);
        }

        Ok(Self {
            template: template.to_string(),
            segments,
        })
    }

    /// Match `path` against this pattern.
    ///
    /// Returns the extracted params, or `None` if the path does not match
    /// structurally or a constraint rejects a value.
    pub fn matches(&self, path: &str) -> Option<Params> {
        let mut rest = Some(path.strip_prefix('/').unwrap_or(path));
        let mut params = Params::new();

        for segment in &self.segments {
            let component = match (segment, rest) {
                (Segment::Wildcard(name), tail) => {
                    params.insert(name.clone(), tail.unwrap_or_default().to_string());
                    return Some(params);
                }
                (_, None) => return None,
                (_, Some(remaining)) => match remaining.split_once('/') {
                    Some((head, tail)) => {
                        rest = Some(tail);
                        head
                    }
                    None => {
                        rest = None;
                        remaining
                    }
                },
            };

            match segment {
                Segment::Literal(text) if text == component => {}
                Segment::Parameter { name, constraint }
                    if !component.is_empty() && constraint.accepts(component) =>
                {
                    params.insert(name.clone(), component.to_string());
                }
                _ => return None,
            }
        }

        // Unconsumed components mean the path is longer than the template.
        match rest {
            Some(_) => None,
            None => Some(params),
        }
    }

    /// The template text this pattern was compiled from.
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// True if the last segment is a catch-all.
    pub fn has_wildcard(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::Wildcard(_)))
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

fn split_path(path: &str) -> std::str::Split<'_, char> {
    path.strip_prefix('/').unwrap_or(path).split('/')
}

fn parse_segment(template: &str, raw: &str) -> Result<Segment, PatternError> {
    let malformed = || PatternError::MalformedSegment {
        template: template.to_string(),
        segment: raw.to_string(),
    };
    let empty = || PatternError::EmptyName {
        template: template.to_string(),
    };

    let Some(inner) = raw.strip_prefix('{') else {
        if raw.contains(['{', '}']) {
            return Err(malformed());
        }
        return Ok(Segment::Literal(raw.to_string()));
    };
    let inner = inner.strip_suffix('}').ok_or_else(malformed)?;
    if inner.contains(['{', '}']) {
        return Err(malformed());
    }

    if let Some(name) = inner.strip_prefix("**").or_else(|| inner.strip_prefix('*')) {
        if name.is_empty() {
            return Err(empty());
        }
        if name.contains([':', '*']) {
            return Err(malformed());
        }
        return Ok(Segment::Wildcard(name.to_string()));
    }

    let (name, constraint) = match inner.split_once(':') {
        Some((name, constraint)) => (name, Some(constraint)),
        None => (inner, None),
    };
    if name.is_empty() {
        return Err(empty());
    }
    let constraint = Constraint::parse(name, constraint)?;

    Ok(Segment::Parameter {
        name: name.to_string(),
        constraint,
    })
}
