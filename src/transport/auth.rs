//! Access-key authentication for the TCP transport.

use std::collections::HashMap;

/// Maps access keys to the identity a client authenticates as.
///
/// Built during setup and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct KeyStore {
    keys: HashMap<String, String>,
}

impl KeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key, replacing the identity of an existing one.
    pub fn add(&mut self, key: impl Into<String>, identity: impl Into<String>) {
        self.keys.insert(key.into(), identity.into());
    }

    /// Identity for a presented key. Empty keys never authenticate.
    pub fn identity_for(&self, key: &str) -> Option<&str> {
        if key.is_empty() {
            return None;
        }
        self.keys.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for KeyStore
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut store = Self::new();
        for (key, identity) in iter {
            store.add(key, identity);
        }
        store
    }
}

/// Parse a `KEY=IDENTITY` pair as given on the command line or in the
/// environment.
pub fn parse_key_spec(spec: &str) -> Option<(String, String)> {
    let (key, identity) = spec.split_once('=')?;
    let (key, identity) = (key.trim(), identity.trim());
    if key.is_empty() || identity.is_empty() {
        return None;
    }
    Some((key.to_string(), identity.to_string()))
}
