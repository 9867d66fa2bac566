//! Request definitions
//!
//! One inbound protocol call: scope, verb and arguments. Built once from
//! the query string or form body and never modified.

use std::collections::BTreeMap;

use super::Verb;
use crate::cursor::Scope;

/// A parsed protocol request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Verb, if exactly one recognised verb was supplied
    verb: Option<Verb>,

    /// The `verb` argument as sent, for logging
    raw_verb: Option<String>,

    scope: Scope,

    /// Arguments other than `verb`, first value wins
    params: BTreeMap<String, String>,

    /// Argument names that appeared more than once (including `verb`)
    repeated: Vec<String>,
}

impl Request {
    /// Build a request from raw `(name, value)` pairs
    pub fn from_pairs<I, K, V>(scope: Scope, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut verbs: Vec<String> = Vec::new();
        let mut params = BTreeMap::new();
        let mut repeated = Vec::new();

        for (name, value) in pairs {
            let name = name.into();
            let value = value.into();
            if name == "verb" {
                verbs.push(value);
                continue;
            }
            if params.contains_key(&name) {
                if !repeated.contains(&name) {
                    repeated.push(name);
                }
                continue;
            }
            params.insert(name, value);
        }

        if verbs.len() > 1 {
            repeated.push("verb".to_string());
        }
        let raw_verb = verbs.into_iter().next();
        let verb = if repeated.iter().any(|n| n == "verb") {
            None
        } else {
            raw_verb.as_deref().and_then(Verb::parse)
        };

        Self {
            verb,
            raw_verb,
            scope,
            params,
            repeated,
        }
    }

    pub fn verb(&self) -> Option<Verb> {
        self.verb
    }

    pub fn raw_verb(&self) -> Option<&str> {
        self.raw_verb.as_deref()
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Repeated argument names, excluding `verb`
    pub fn repeated_arguments(&self) -> impl Iterator<Item = &str> {
        self.repeated.iter().map(String::as_str).filter(|n| *n != "verb")
    }

    /// Whether `verb` itself was repeated
    pub fn verb_repeated(&self) -> bool {
        self.repeated.iter().any(|n| n == "verb")
    }
}
