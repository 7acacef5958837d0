use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Dimension name to dimension value pairs identifying one value column.
///
/// Pairs are kept sorted by name, so two label sets built in different
/// orders compare equal and share a signature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Labels(BTreeMap<String, String>);

impl Labels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a label, returning the previous value for that name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(name.into(), value.into())
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Canonical column key: `name=value` pairs sorted by name, joined by `", "`.
    pub fn signature(&self) -> String {
        self.iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Labels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.signature())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Labels {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Labels(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

impl From<Labels> for BTreeMap<String, String> {
    fn from(labels: Labels) -> Self {
        labels.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_is_order_independent() {
        let a = Labels::new().with("region", "us").with("device", "mobile");
        let b: Labels = [("device", "mobile"), ("region", "us")].into_iter().collect();

        assert_eq!(a, b);
        assert_eq!(a.signature(), "device=mobile, region=us");
        assert_eq!(b.signature(), a.signature());
    }

    #[test]
    fn test_empty_signature() {
        assert_eq!(Labels::new().signature(), "");
        assert!(Labels::new().is_empty());
    }

    #[test]
    fn test_insert_overwrites() {
        let mut labels = Labels::new();
        assert_eq!(labels.insert("region", "us"), None);
        assert_eq!(labels.insert("region", "eu"), Some("us".to_string()));
        assert_eq!(labels.get("region"), Some("eu"));
        assert_eq!(labels.len(), 1);
    }
}
