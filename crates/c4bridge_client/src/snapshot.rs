use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::value::RawValue;

use crate::error::Error;

/// Raw variable values returned by one `get`, keyed by variable ID.
///
/// Values are kept exactly as the driver sent them; interpreting them is up
/// to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VariableSnapshot(BTreeMap<String, String>);

impl VariableSnapshot {
    /// Parse a `get` response body, checking every requested ID is present.
    pub(crate) fn from_body<S: AsRef<str>>(body: &str, requested: &[S]) -> Result<Self, Error> {
        let malformed = |message: String| Error::MalformedResponse {
            message,
            body: body.to_string(),
        };

        let raw: BTreeMap<String, Box<RawValue>> =
            serde_json::from_str(body).map_err(|e| malformed(e.to_string()))?;

        let values = raw
            .into_iter()
            .map(|(id, value)| {
                scalar_text(&value)
                    .map(|text| (id.clone(), text))
                    .map_err(|e| malformed(format!("variable {}: {}", id, e)))
            })
            .collect::<Result<BTreeMap<String, String>, Error>>()?;

        for id in requested {
            let id = id.as_ref();
            if !values.contains_key(id) {
                return Err(malformed(format!("variable {} missing from response", id)));
            }
        }

        Ok(Self(values))
    }

    /// Raw value of `variable_id`, if the driver returned it.
    pub fn get(&self, variable_id: &str) -> Option<&str> {
        self.0.get(variable_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for VariableSnapshot {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Text of a scalar variable value.
///
/// The driver quotes its values, but numbers and booleans are accepted and
/// kept exactly as written in the body. Nulls and nested values are rejected.
fn scalar_text(value: &RawValue) -> Result<String, String> {
    let raw = value.get().trim();
    match raw.as_bytes().first() {
        Some(b'"') => serde_json::from_str::<String>(raw).map_err(|e| e.to_string()),
        Some(b'n') | Some(b'[') | Some(b'{') | None => {
            Err(format!("expected a string, number, or boolean, found {}", raw))
        }
        Some(_) => Ok(raw.to_string()),
    }
}
