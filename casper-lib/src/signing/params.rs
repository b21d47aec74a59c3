//! Parameter sets and their canonical serialization.

use std::collections::BTreeMap;

/// Unordered string key/value parameters for one logical request.
///
/// Keys are unique; inserting an existing key replaces its value. Iteration
/// is always in ascending byte order of the keys, regardless of insertion
/// order.
///
/// # Example
///
/// ```
/// use casper_lib::signing::ParameterSet;
///
/// let params = ParameterSet::new()
///     .with("username", "alice")
///     .with("timestamp", "0123456789");
///
/// assert_eq!(params.canonical_string(), "timestamp0123456789usernamealice");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ParameterSet(BTreeMap<String, String>);

impl ParameterSet {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a parameter, returning the previous value for that key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Look up a parameter value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Remove a parameter.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    /// Whether the set contains `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over parameters in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serialize every parameter: keys ascending by byte value, each
    /// `key || value` concatenated with no delimiters.
    ///
    /// An empty set yields an empty string.
    pub fn canonical_string(&self) -> String {
        let capacity = self.0.iter().map(|(k, v)| k.len() + v.len()).sum();
        let mut out = String::with_capacity(capacity);
        for (key, value) in &self.0 {
            out.push_str(key);
            out.push_str(value);
        }
        out
    }

    /// Serialize an explicit, ordered subset of keys.
    ///
    /// The order of `fields` is used as-is. A key absent from the set
    /// contributes its name followed by an empty value. Keys not listed in
    /// `fields` are ignored.
    pub fn ordered_subset_string(&self, fields: &[&str]) -> String {
        let mut out = String::new();
        for field in fields {
            out.push_str(field);
            out.push_str(self.get(field).unwrap_or_default());
        }
        out
    }

    /// Pairs suitable for form or query encoding.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.0.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for ParameterSet {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl From<BTreeMap<String, String>> for ParameterSet {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

impl IntoIterator for ParameterSet {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
