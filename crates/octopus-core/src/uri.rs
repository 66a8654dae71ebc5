//! URI template path resolution.
//!
//! Octopus advertises its collections as RFC 6570 templates such as
//! `accounts{/id}{?skip,take,ids,partialName}`. This module supports the subset the
//! API uses (simple, path-segment, query and query-continuation expressions) and
//! turns a typed [`Lookup`] into a concrete request path.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};

/// Placeholder holding a single resource identifier.
pub const ID_VARIABLE: &str = "id";
/// Placeholder holding a comma-joined identifier list.
pub const IDS_VARIABLE: &str = "ids";
/// Placeholder holding an exact name.
pub const NAME_VARIABLE: &str = "name";
/// Placeholder holding a partial name.
pub const PARTIAL_NAME_VARIABLE: &str = "partialName";
/// Placeholder holding the space identifier.
pub const SPACE_VARIABLE: &str = "spaceId";

/// What a request is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    /// The whole collection; no substitution.
    All,
    /// One item by identifier.
    ById(&'a str),
    /// Several items by identifier.
    ByIds(&'a [String]),
    /// Items whose name matches exactly.
    ByName(&'a str),
    /// Items whose name contains the given text.
    ByPartialName(&'a str),
}

impl Lookup<'_> {
    /// Operation name reported in [`Error::InvalidParameter`].
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::All => "GetAll",
            Self::ById(_) => "GetByID",
            Self::ByIds(_) => "GetByIDs",
            Self::ByName(_) => "GetByName",
            Self::ByPartialName(_) => "GetByPartialName",
        }
    }

    fn variable(&self) -> Result<Option<(&'static str, String)>> {
        let operation = self.operation();
        match self {
            Self::All => Ok(None),
            Self::ById(id) => required(operation, ID_VARIABLE, id).map(Some),
            Self::ByIds(ids) => {
                if ids.is_empty() || ids.iter().any(|id| id.trim().is_empty()) {
                    return Err(Error::invalid_parameter(operation, IDS_VARIABLE));
                }
                Ok(Some((IDS_VARIABLE, ids.join(","))))
            }
            Self::ByName(name) => required(operation, NAME_VARIABLE, name).map(Some),
            Self::ByPartialName(name) => {
                required(operation, PARTIAL_NAME_VARIABLE, name).map(Some)
            }
        }
    }
}

fn required(
    operation: &'static str,
    variable: &'static str,
    value: &str,
) -> Result<(&'static str, String)> {
    if value.trim().is_empty() {
        return Err(Error::invalid_parameter(operation, variable));
    }
    Ok((variable, value.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Simple,
    PathSegment,
    Query,
    QueryContinuation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Expression {
        operator: Operator,
        variables: Vec<String>,
    },
}

/// A parsed URI template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriTemplate {
    raw: String,
    parts: Vec<Part>,
}

impl UriTemplate {
    /// Parse a template.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] for unbalanced braces, empty variable names, or
    /// operators outside the supported subset.
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        let mut parts = Vec::new();
        let mut rest = raw.as_str();

        while !rest.is_empty() {
            match rest.find(['{', '}']) {
                None => {
                    parts.push(Part::Literal(rest.to_string()));
                    break;
                }
                Some(index) if rest[index..].starts_with('}') => {
                    return Err(malformed(&raw, "unexpected `}`"));
                }
                Some(index) => {
                    if index > 0 {
                        parts.push(Part::Literal(rest[..index].to_string()));
                    }
                    let after = &rest[index + 1..];
                    let end = after
                        .find('}')
                        .ok_or_else(|| malformed(&raw, "unterminated expression"))?;
                    parts.push(parse_expression(&raw, &after[..end])?);
                    rest = &after[end + 1..];
                }
            }
        }

        Ok(Self { raw, parts })
    }

    /// The template text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether the template declares the named placeholder.
    #[must_use]
    pub fn declares(&self, variable: &str) -> bool {
        self.parts.iter().any(|part| match part {
            Part::Literal(_) => false,
            Part::Expression { variables, .. } => variables.iter().any(|v| v == variable),
        })
    }

    /// Expand the template; undefined placeholders are dropped.
    #[must_use]
    pub fn expand(&self, values: &BTreeMap<&str, String>) -> String {
        let mut path = String::with_capacity(self.raw.len());

        for part in &self.parts {
            match part {
                Part::Literal(text) => path.push_str(text),
                Part::Expression {
                    operator,
                    variables,
                } => {
                    let defined = variables
                        .iter()
                        .filter_map(|name| values.get(name.as_str()).map(|v| (name, v)));
                    for (position, (name, value)) in defined.enumerate() {
                        let encoded = urlencoding::encode(value);
                        match operator {
                            Operator::Simple => {
                                if position > 0 {
                                    path.push(',');
                                }
                                path.push_str(&encoded);
                            }
                            Operator::PathSegment => {
                                path.push('/');
                                path.push_str(&encoded);
                            }
                            Operator::Query | Operator::QueryContinuation => {
                                let lead = if position == 0 && *operator == Operator::Query {
                                    '?'
                                } else {
                                    '&'
                                };
                                path.push(lead);
                                path.push_str(name);
                                path.push('=');
                                path.push_str(&encoded);
                            }
                        }
                    }
                }
            }
        }

        path
    }

    /// Resolve a lookup into a request path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] when the lookup value is blank, when the
    /// template does not declare the placeholder the lookup needs, or when the template
    /// declares a space placeholder (use [`UriTemplate::resolve_in_space`]).
    pub fn resolve(&self, lookup: &Lookup<'_>) -> Result<String> {
        self.resolve_with(None, lookup)
    }

    /// Resolve a lookup into a request path, filling the space placeholder.
    ///
    /// # Errors
    ///
    /// As [`UriTemplate::resolve`], plus [`Error::InvalidParameter`] for a blank space.
    pub fn resolve_in_space(&self, space: &str, lookup: &Lookup<'_>) -> Result<String> {
        self.resolve_with(Some(space), lookup)
    }

    /// Resolve the collection path narrowed by query filters (e.g. `accountType`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] for a blank filter value, a filter the
    /// template does not declare, or a missing space.
    pub fn resolve_filters(
        &self,
        space: Option<&str>,
        filters: &[(&'static str, &str)],
    ) -> Result<String> {
        let operation = Lookup::All.operation();
        let mut values = self.space_values(operation, space)?;

        for &(name, value) in filters {
            if !self.declares(name) {
                return Err(Error::invalid_parameter(operation, name));
            }
            let (name, value) = required(operation, name, value)?;
            values.insert(name, value);
        }

        Ok(self.expand(&values))
    }

    fn space_values(
        &self,
        operation: &'static str,
        space: Option<&str>,
    ) -> Result<BTreeMap<&'static str, String>> {
        let mut values = BTreeMap::new();
        if self.declares(SPACE_VARIABLE) {
            let (name, value) = required(operation, SPACE_VARIABLE, space.unwrap_or_default())?;
            values.insert(name, value);
        }
        Ok(values)
    }

    fn resolve_with(&self, space: Option<&str>, lookup: &Lookup<'_>) -> Result<String> {
        let operation = lookup.operation();
        let mut values = self.space_values(operation, space)?;

        if let Some((name, value)) = lookup.variable()? {
            if !self.declares(name) {
                return Err(Error::invalid_parameter(operation, name));
            }
            values.insert(name, value);
        }

        Ok(self.expand(&values))
    }
}

impl fmt::Display for UriTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn parse_expression(raw: &str, body: &str) -> Result<Part> {
    let (operator, list) = match body.chars().next() {
        Some('/') => (Operator::PathSegment, &body[1..]),
        Some('?') => (Operator::Query, &body[1..]),
        Some('&') => (Operator::QueryContinuation, &body[1..]),
        Some('+' | '#' | '.' | ';' | '=' | ',' | '!' | '@' | '|') => {
            return Err(malformed(raw, "unsupported operator"));
        }
        _ => (Operator::Simple, body),
    };

    let variables = list
        .split(',')
        .map(str::trim)
        .map(|name| {
            if name.is_empty()
                || !name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
            {
                Err(malformed(raw, "invalid variable name"))
            } else {
                Ok(name.to_string())
            }
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Part::Expression {
        operator,
        variables,
    })
}

fn malformed(raw: &str, reason: &str) -> Error {
    Error::ConfigError(format!("Malformed URI template `{raw}`: {reason}"))
}
