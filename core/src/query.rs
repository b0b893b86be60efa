//! Query-string rendering for the backend's `q[...]` dialect.
//!
//! The backend's query parser expects bracket-notation keys under a single
//! `q` namespace: `q[s]` carries the JSON-encoded sort string, every filter
//! becomes an exact-match `q[<field>_eq]`, and batch lookups use
//! `q["id_in"][]` repeated once per id. Brackets in keys go on the wire
//! unescaped; everything else is escaped with the `encodeURIComponent` set.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;

use crate::types::{Filter, Identifier, Pagination, Sort};

/// Bytes escaped in values: everything but `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Keys additionally keep their brackets.
const KEY: &AsciiSet = &COMPONENT.remove(b'[').remove(b']');

/// Ordered list of query pairs, rendered on demand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryString {
    pairs: Vec<(String, String)>,
}

impl QueryString {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.pairs.push((key.into(), value.into()));
        self
    }

    /// `q[s]="<field> <order>"`.
    pub fn sort(&mut self, sort: &Sort) -> &mut Self {
        let text = format!("{} {}", sort.field, sort.order.as_str());
        self.push("q[s]", Value::String(text).to_string())
    }

    /// One `q[<field>_eq]` pair per filter entry, in key order.
    pub fn filter(&mut self, filter: &Filter) -> &mut Self {
        for (field, value) in filter {
            self.push(format!("q[{field}_eq]"), render_value(value));
        }
        self
    }

    pub fn pagination(&mut self, pagination: Pagination) -> &mut Self {
        self.push("page", pagination.page.to_string());
        self.push("per", pagination.per_page.to_string())
    }

    /// `q["id_in"][]=<id>` repeated in the given order. The quotes travel as
    /// `%22`, so the wire form `q[%22id_in%22][]` decodes to the literal key.
    pub fn id_in(&mut self, ids: &[Identifier]) -> &mut Self {
        for id in ids {
            self.push(r#"q["id_in"][]"#, id.to_string());
        }
        self
    }

    /// `ids=<JSON array>` as used by the batch `multi` endpoints.
    pub fn ids_json(&mut self, ids: &[Identifier]) -> &mut Self {
        let array = Value::Array(ids.iter().cloned().map(Value::from).collect());
        self.push("ids", array.to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Percent-encoded `k=v&k=v` form, without the leading `?`.
    pub fn render(&self) -> String {
        self.pairs
            .iter()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    utf8_percent_encode(key, KEY),
                    utf8_percent_encode(value, COMPONENT)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Strings go out verbatim, scalars as their JSON text, `null` as empty.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Percent-encode a single path segment such as a record id.
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, COMPONENT).to_string()
}
