#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Region label canonicalization.
//!
//! The statistical dataset labels regions as `"KABUPATEN BANDUNG"` or
//! `"KOTA BANDUNG"` while boundary files usually carry the bare name. Both
//! sides are reduced to a [`JoinKey`] with the same [`normalize`] function
//! before they are matched.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Qualifier tokens removed from labels, in removal order.
pub const QUALIFIER_TOKENS: &[&str] = &["KABUPATEN ", "KOTA ", "KAB. "];

/// A canonical region name used only for matching across datasets.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JoinKey(String);

impl JoinKey {
    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if canonicalization left nothing behind.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the key, returning the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for JoinKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for JoinKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Canonicalizes a region label into a [`JoinKey`].
///
/// Uppercases the label, removes every occurrence of the
/// [`QUALIFIER_TOKENS`] (anywhere in the label, not only as a leading
/// prefix), and trims surrounding whitespace. Removal repeats until the
/// label stops changing, so `normalize(normalize(x)) == normalize(x)` for
/// every input.
#[must_use]
pub fn normalize(label: &str) -> JoinKey {
    let mut current = label.to_uppercase();

    loop {
        let stripped = QUALIFIER_TOKENS
            .iter()
            .fold(current.clone(), |acc, token| acc.replace(token, ""));
        if stripped == current {
            break;
        }
        current = stripped;
    }

    JoinKey(current.trim().to_string())
}

/// Canonicalizes a raw JSON value into a [`JoinKey`].
///
/// Non-string values are coerced with [`label_text`] first, so this never
/// fails.
#[must_use]
pub fn normalize_value(value: &serde_json::Value) -> JoinKey {
    normalize(&label_text(value))
}

/// Returns the text form of a raw JSON label value.
///
/// Strings are returned as-is, numbers and booleans use their display form,
/// `null` becomes the empty string, and arrays/objects use their compact
/// JSON encoding.
#[must_use]
pub fn label_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
