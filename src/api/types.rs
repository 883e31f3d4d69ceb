//! Wire types shared by several resource families.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Paginated list envelope returned by most list endpoints.
///
/// `links` is kept as an opaque document so whatever pagination shape the
/// Service returns is mirrored back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    /// Items on the current page. Required, so an object of any other
    /// shape fails to decode instead of reading as an empty page.
    pub results: Vec<T>,
    /// Pagination links, `{}` when the Service omits them.
    #[serde(default = "empty_object")]
    pub links: Value,
}

impl<T> ListResponse<T> {
    /// Transform every result while keeping `links` untouched.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> ListResponse<U> {
        ListResponse {
            results: self.results.into_iter().map(f).collect(),
            links: self.links,
        }
    }
}

/// A list that the Service returns either enveloped or as a bare array.
///
/// Serialization mirrors whichever shape was received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    /// Bare JSON array.
    Bare(Vec<T>),
    /// `{results, links}` envelope.
    Envelope(ListResponse<T>),
}

impl<T> Listing<T> {
    /// Items regardless of shape.
    #[must_use]
    pub fn items(&self) -> &[T] {
        match self {
            Self::Bare(items) => items,
            Self::Envelope(envelope) => &envelope.results,
        }
    }
}

/// Synthesized payload for operations whose success carries no body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    /// Always `true`; failures are reported as errors instead.
    pub success: bool,
    /// Human-readable confirmation such as `Project 1 deleted successfully`.
    pub message: String,
}

impl Acknowledgement {
    /// Successful acknowledgement with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// `<entity> <id> was successfully updated`.
    #[must_use]
    pub fn updated(entity: &str, id: impl std::fmt::Display) -> Self {
        Self::new(format!("{entity} {id} was successfully updated"))
    }

    /// `<entity> <id> deleted successfully`.
    #[must_use]
    pub fn deleted(entity: &str, id: impl std::fmt::Display) -> Self {
        Self::new(format!("{entity} {id} deleted successfully"))
    }
}

/// Result of an update that may or may not echo the updated resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UpdateOutcome<T> {
    /// The Service returned the updated resource.
    Updated(T),
    /// The Service returned an empty body.
    Acknowledged(Acknowledgement),
}

/// Remaining fields of a resource that the server does not model explicitly.
pub type Extra = Map<String, Value>;

pub(crate) fn empty_object() -> Value {
    Value::Object(Map::new())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
}

/// Accept an identifier sent as either a JSON string or a JSON number.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::Text(text) => text,
        StringOrNumber::Integer(value) => value.to_string(),
        StringOrNumber::Unsigned(value) => value.to_string(),
        StringOrNumber::Float(value) => value.to_string(),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseInteger {
    Integer(i64),
    Text(String),
}

/// Accept an integer sent as a JSON number or a numeric string.
///
/// Non-numeric strings normalize to `None`.
pub(crate) fn loose_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        match Option::<LooseInteger>::deserialize(deserializer)? {
            None => None,
            Some(LooseInteger::Integer(value)) => Some(value),
            Some(LooseInteger::Text(text)) => text.trim().parse().ok(),
        },
    )
}
