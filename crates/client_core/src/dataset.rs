//! Things and datasets exchanged with the pod as expanded JSON-LD.
//!
//! A [`Thing`] is a subject IRI with its predicate/value pairs; a
//! [`SolidDataset`] is the ordered set of Things stored in one resource.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{json, Map, Value};
use shared::vocab::{RDF_TYPE, XSD_DATE, XSD_DATE_TIME};

use crate::error::{ClientError, ClientResult};

pub const JSON_LD: &str = "application/ld+json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    Node(String),
    Literal {
        value: String,
        datatype: Option<String>,
    },
}

impl Term {
    fn literal(value: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: None,
        }
    }

    fn to_json_ld(&self) -> Value {
        match self {
            Term::Node(id) => json!({ "@id": id }),
            Term::Literal {
                value,
                datatype: Some(datatype),
            } => json!({ "@value": value, "@type": datatype }),
            Term::Literal {
                value,
                datatype: None,
            } => json!({ "@value": value }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thing {
    url: String,
    predicates: BTreeMap<String, Vec<Term>>,
}

impl Thing {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            predicates: BTreeMap::new(),
        }
    }

    /// A Thing named `name` inside the resource at `resource_url`.
    pub fn local(resource_url: &url::Url, name: &str) -> Self {
        let mut url = resource_url.clone();
        url.set_fragment(Some(name));
        Self::new(url.to_string())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn add_type(self, class: &str) -> Self {
        self.add_term(RDF_TYPE, Term::Node(class.to_string()))
    }

    pub fn add_string(self, predicate: &str, value: impl Into<String>) -> Self {
        self.add_term(predicate, Term::literal(value))
    }

    pub fn add_url(self, predicate: &str, url: impl Into<String>) -> Self {
        self.add_term(predicate, Term::Node(url.into()))
    }

    pub fn add_datetime(self, predicate: &str, value: DateTime<Utc>) -> Self {
        self.add_term(
            predicate,
            Term::Literal {
                value: value.to_rfc3339(),
                datatype: Some(XSD_DATE_TIME.to_string()),
            },
        )
    }

    pub fn add_date(self, predicate: &str, value: NaiveDate) -> Self {
        self.add_term(
            predicate,
            Term::Literal {
                value: value.format("%Y-%m-%d").to_string(),
                datatype: Some(XSD_DATE.to_string()),
            },
        )
    }

    pub fn add_term(mut self, predicate: &str, term: Term) -> Self {
        self.push_term(predicate, term);
        self
    }

    fn push_term(&mut self, predicate: &str, term: Term) {
        let values = self.predicates.entry(predicate.to_string()).or_default();
        if !values.contains(&term) {
            values.push(term);
        }
    }

    pub fn terms(&self, predicate: &str) -> &[Term] {
        self.predicates
            .get(predicate)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn string(&self, predicate: &str) -> Option<&str> {
        self.terms(predicate).iter().find_map(|term| match term {
            Term::Literal { value, .. } => Some(value.as_str()),
            Term::Node(_) => None,
        })
    }

    pub fn get_url(&self, predicate: &str) -> Option<&str> {
        self.urls(predicate).next()
    }

    pub fn urls<'a>(&'a self, predicate: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.terms(predicate).iter().filter_map(|term| match term {
            Term::Node(id) => Some(id.as_str()),
            Term::Literal { .. } => None,
        })
    }

    pub fn datetime(&self, predicate: &str) -> Option<DateTime<Utc>> {
        let raw = self.string(predicate)?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|value| value.with_timezone(&Utc))
    }

    pub fn date(&self, predicate: &str) -> Option<NaiveDate> {
        let raw = self.string(predicate)?;
        NaiveDate::parse_from_str(raw.get(..10).unwrap_or(raw), "%Y-%m-%d").ok()
    }

    pub fn has_type(&self, class: &str) -> bool {
        self.urls(RDF_TYPE).any(|id| id == class)
    }

    fn to_json_ld(&self) -> Value {
        let mut node = Map::new();
        node.insert("@id".into(), Value::String(self.url.clone()));
        for (predicate, terms) in &self.predicates {
            if predicate == RDF_TYPE {
                let types = terms
                    .iter()
                    .filter_map(|term| match term {
                        Term::Node(id) => Some(Value::String(id.clone())),
                        Term::Literal { .. } => None,
                    })
                    .collect();
                node.insert("@type".into(), Value::Array(types));
                continue;
            }
            node.insert(
                predicate.clone(),
                Value::Array(terms.iter().map(Term::to_json_ld).collect()),
            );
        }
        Value::Object(node)
    }

    fn from_json_ld(node: &Map<String, Value>) -> Self {
        let url = node
            .get("@id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let mut thing = Thing::new(url);
        for (key, value) in node {
            match key.as_str() {
                "@type" => {
                    for id in string_values(value) {
                        thing.push_term(RDF_TYPE, Term::Node(id));
                    }
                }
                key if key.starts_with('@') => {}
                predicate => {
                    for term in parse_terms(value) {
                        thing.push_term(predicate, term);
                    }
                }
            }
        }
        thing
    }

    fn merge(&mut self, other: Thing) {
        for (predicate, terms) in other.predicates {
            for term in terms {
                self.push_term(&predicate, term);
            }
        }
    }
}

fn string_values(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn parse_terms(value: &Value) -> Vec<Term> {
    match value {
        Value::Array(items) => items.iter().flat_map(parse_terms).collect(),
        Value::Object(map) => {
            if let Some(id) = map.get("@id").and_then(Value::as_str) {
                return vec![Term::Node(id.to_string())];
            }
            match map.get("@value") {
                Some(raw) => vec![Term::Literal {
                    value: scalar_to_string(raw),
                    datatype: map.get("@type").and_then(Value::as_str).map(str::to_string),
                }],
                None => Vec::new(),
            }
        }
        Value::Null => Vec::new(),
        scalar => vec![Term::literal(scalar_to_string(scalar))],
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolidDataset {
    things: Vec<Thing>,
}

impl SolidDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn things(&self) -> &[Thing] {
        &self.things
    }

    pub fn thing(&self, url: &str) -> Option<&Thing> {
        self.things.iter().find(|thing| thing.url == url)
    }

    /// Inserts `thing`, replacing any Thing with the same URL.
    pub fn set_thing(&mut self, thing: Thing) {
        match self.things.iter_mut().find(|existing| existing.url == thing.url) {
            Some(existing) => *existing = thing,
            None => self.things.push(thing),
        }
    }

    pub fn remove_thing(&mut self, url: &str) -> bool {
        let before = self.things.len();
        self.things.retain(|thing| thing.url != url);
        self.things.len() != before
    }

    pub fn from_json_ld(value: &Value) -> ClientResult<Self> {
        let nodes = match value {
            Value::Array(items) => items.as_slice(),
            Value::Object(map) => match map.get("@graph") {
                Some(Value::Array(items)) => items.as_slice(),
                _ => std::slice::from_ref(value),
            },
            _ => {
                return Err(ClientError::Dataset(
                    "expected a JSON-LD array or object".into(),
                ))
            }
        };

        let mut dataset = SolidDataset::new();
        for node in nodes {
            let Value::Object(map) = node else {
                return Err(ClientError::Dataset("JSON-LD node is not an object".into()));
            };
            let thing = Thing::from_json_ld(map);
            match dataset.things.iter_mut().find(|t| t.url == thing.url) {
                Some(existing) => existing.merge(thing),
                None => dataset.things.push(thing),
            }
        }
        Ok(dataset)
    }

    pub fn to_json_ld(&self) -> Value {
        Value::Array(self.things.iter().map(Thing::to_json_ld).collect())
    }
}

#[cfg(test)]
#[path = "tests/dataset_tests.rs"]
mod tests;
