//! Wire envelopes shared by every Octopus resource.
//!
//! Every entity carries the same identity fields, every collection arrives in the
//! same paged wrapper, and every server-reported failure uses the same error body.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Link relation pointing at the next page of a collection.
pub const PAGE_NEXT_LINK: &str = "Page.Next";

/// Link relation pointing at the resource itself.
pub const SELF_LINK: &str = "Self";

/// Navigation links keyed by relation name.
pub type Links = BTreeMap<String, String>;

/// Identity fields present on every entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Resource {
    /// Server-assigned identifier (e.g. `Accounts-1`); absent before creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Navigation links.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub links: Links,
    /// User that last modified the entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_by: Option<String>,
    /// Timestamp of the last modification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_on: Option<DateTime<Utc>>,
}

impl Resource {
    /// An empty envelope for a client-constructed entity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An envelope carrying only an identifier.
    #[must_use]
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// The identifier, if the entity has been persisted.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.trim().is_empty())
    }

    /// Look up a navigation link by relation.
    #[must_use]
    pub fn link(&self, relation: &str) -> Option<&str> {
        self.links.get(relation).map(String::as_str)
    }
}

/// One page of a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PagedCollection<T> {
    /// Items in server order.
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    /// Navigation links, including the optional next-page reference.
    #[serde(default)]
    pub links: Links,
    /// Item type reported by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
    /// Total number of results across all pages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_results: Option<u64>,
    /// Page size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items_per_page: Option<u64>,
}

impl<T> PagedCollection<T> {
    /// The next-page reference, when present and non-empty.
    #[must_use]
    pub fn next_page(&self) -> Option<&str> {
        self.links
            .get(PAGE_NEXT_LINK)
            .map(String::as_str)
            .filter(|link| !link.trim().is_empty())
    }
}

/// Error body returned by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorEnvelope {
    /// Summary message.
    #[serde(default)]
    pub error_message: Option<String>,
    /// Individual error strings, in server order.
    #[serde(default)]
    pub errors: Option<Vec<String>>,
    /// Raw exception text.
    #[serde(default)]
    pub full_exception: Option<String>,
}

impl ErrorEnvelope {
    /// Parse an error envelope out of a response body.
    ///
    /// Returns `None` unless the body is a JSON object with a non-empty `Errors` list.
    #[must_use]
    pub fn from_body(body: &str) -> Option<Self> {
        let envelope: Self = serde_json::from_str(body).ok()?;
        envelope.has_errors().then_some(envelope)
    }

    /// True when the server reported at least one error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors.as_ref().is_some_and(|errors| !errors.is_empty())
    }
}
