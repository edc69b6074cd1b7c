//! Registry documents and their structured field access.
//!
//! Upstream documents are free-form JSON objects whose fields may be missing, `null`,
//! blank strings or numbers depending on how the record was captured. [`RecordFields`]
//! wraps the raw object and exposes accessors that return `None` for every one of those
//! "absent" shapes, so the merge code never chains null checks.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;

use crate::constants::{MOTHER_NAME_FIELD, REFERRAL_CODE_FIELD};

/// Raw document fields as stored upstream.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordFields(Map<String, Value>);

impl RecordFields {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Text value of a field, trimmed.
    ///
    /// Strings, numbers and booleans are read as text. `null`, arrays, objects and
    /// blank strings are all reported as absent.
    pub fn text(&self, key: &str) -> Option<Cow<'_, str>> {
        match self.0.get(key)? {
            Value::String(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then_some(Cow::Borrowed(trimmed))
            }
            Value::Number(n) => Some(Cow::Owned(n.to_string())),
            Value::Bool(b) => Some(Cow::Owned(b.to_string())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// First present text value among `keys`, in order.
    pub fn first_text(&self, keys: &[&str]) -> Option<Cow<'_, str>> {
        keys.iter().find_map(|key| self.text(key))
    }

    /// Calendar date (`YYYY-MM-DD`) used to pair referrals with appointments.
    ///
    /// Taken as the first ten characters of the first present date field.
    pub fn join_key(&self, date_fields: &[&str]) -> Option<String> {
        self.first_text(date_fields)
            .map(|date| date.chars().take(10).collect())
    }

    pub fn referral_code(&self) -> Option<Cow<'_, str>> {
        self.text(REFERRAL_CODE_FIELD)
    }

    pub fn mother_name(&self) -> Option<Cow<'_, str>> {
        self.text(MOTHER_NAME_FIELD)
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }
}

/// Source envelope around a registry document, as returned to clients.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    #[serde(rename = "_source", default)]
    pub source: RecordFields,
}

impl Hit {
    pub fn new(source: RecordFields) -> Self {
        Self { source }
    }
}

/// Upstream `_search` response body.
#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    hits: SearchHits,
}

#[derive(Debug, Default, Deserialize)]
struct SearchHits {
    #[serde(default)]
    total: Option<HitTotal>,
    #[serde(default)]
    hits: Vec<Hit>,
}

/// Reported total, either a bare count or `{"value": n, "relation": ...}` depending on
/// the upstream search engine version.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HitTotal {
    Count(u64),
    Object { value: u64 },
}

impl SearchResponse {
    /// Total hits reported by the upstream, falling back to the returned page size.
    pub fn total(&self) -> u64 {
        match self.hits.total {
            Some(HitTotal::Count(n)) | Some(HitTotal::Object { value: n }) => n,
            None => self.hits.hits.len() as u64,
        }
    }

    pub fn into_hits(self) -> Vec<Hit> {
        self.hits.hits
    }
}
