//! Metric Subscription Ledger
//!
//! Reference counts per metric namespace. A namespace is an ordered list of
//! segments; its key is built by prefixing every segment with `/` and
//! escaping `/` and `\` inside segments, so two namespaces share a key only
//! when their segments are identical.

use std::fmt;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use crate::control::error::FatalFault;

/// Ordered metric namespace, e.g. `["intel", "cpu", "percent"]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct MetricNamespace(Vec<String>);

impl MetricNamespace {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn into_segments(self) -> Vec<String> {
        self.0
    }

    /// Derive the ledger key for this namespace
    pub fn key(&self) -> MetricKey {
        let mut key = String::new();
        for segment in &self.0 {
            key.push('/');
            for c in segment.chars() {
                if c == '/' || c == '\\' {
                    key.push('\\');
                }
                key.push(c);
            }
        }
        MetricKey(key)
    }
}

impl From<Vec<String>> for MetricNamespace {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

impl From<&[&str]> for MetricNamespace {
    fn from(segments: &[&str]) -> Self {
        Self::new(segments.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for MetricNamespace {
    fn from(segments: [&str; N]) -> Self {
        Self::new(segments)
    }
}

impl fmt::Display for MetricNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key().as_str())
    }
}

/// Stable ledger key derived from a `MetricNamespace`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetricKey(String);

impl MetricKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference counts of active metric subscriptions
#[derive(Debug, Default)]
pub struct SubscriptionLedger {
    counts: DashMap<String, u64>,
}

impl SubscriptionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a reference and return the new count
    pub fn subscribe(&self, key: &MetricKey) -> u64 {
        let mut count = self.counts.entry(key.0.clone()).or_insert(0);
        *count += 1;
        *count
    }

    /// Drop a reference and return the remaining count.
    ///
    /// The entry disappears when its count reaches zero. Dropping a reference
    /// that does not exist is a `FatalFault`.
    pub fn unsubscribe(&self, key: &MetricKey) -> Result<u64, FatalFault> {
        match self.counts.entry(key.0.clone()) {
            Entry::Occupied(mut entry) => {
                let count = entry.get_mut();
                if *count == 0 {
                    entry.remove();
                    return Err(FatalFault::subscription_underflow(key.as_str()));
                }
                *count -= 1;
                let remaining = *count;
                if remaining == 0 {
                    entry.remove();
                }
                Ok(remaining)
            }
            Entry::Vacant(_) => Err(FatalFault::subscription_underflow(key.as_str())),
        }
    }

    /// Current count for `key`; zero when absent
    pub fn count(&self, key: &MetricKey) -> u64 {
        self.counts.get(key.as_str()).map(|c| *c).unwrap_or(0)
    }

    /// Number of keys with at least one subscriber
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        self.counts.iter().map(|entry| entry.key().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_key_derivation() {
        assert_eq!(MetricNamespace::from(["cpu", "percent"]).key().as_str(), "/cpu/percent");
        assert_eq!(MetricNamespace::from(["a/b"]).key().as_str(), "/a\\/b");
        assert_eq!(MetricNamespace::default().key().as_str(), "");
        assert_eq!(MetricNamespace::from([""]).key().as_str(), "/");
    }

    #[test]
    fn test_key_is_order_sensitive() {
        let a = MetricNamespace::from(["cpu", "percent"]);
        let b = MetricNamespace::from(["percent", "cpu"]);
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn test_key_distinguishes_embedded_separators() {
        let split = MetricNamespace::from(["a", "b"]);
        let joined = MetricNamespace::from(["a/b"]);
        assert_ne!(split.key(), joined.key());
    }

    #[test]
    fn test_subscribe_counts() {
        let ledger = SubscriptionLedger::new();
        let key = MetricNamespace::from(["cpu", "percent"]).key();

        assert_eq!(ledger.subscribe(&key), 1);
        assert_eq!(ledger.subscribe(&key), 2);
        assert_eq!(ledger.count(&key), 2);
        assert_eq!(ledger.len(), 1);

        assert_eq!(ledger.unsubscribe(&key), Ok(1));
        assert_eq!(ledger.unsubscribe(&key), Ok(0));
        assert_eq!(ledger.count(&key), 0);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_unsubscribe_underflow() {
        let ledger = SubscriptionLedger::new();
        let key = MetricNamespace::from(["cpu", "percent"]).key();

        ledger.subscribe(&key);
        ledger.unsubscribe(&key).unwrap();

        let result = ledger.unsubscribe(&key);
        assert_eq!(result, Err(FatalFault::subscription_underflow("/cpu/percent")));
        assert_eq!(ledger.count(&key), 0);
    }

    #[test]
    fn test_unsubscribe_never_subscribed() {
        let ledger = SubscriptionLedger::new();
        let key = MetricNamespace::from(["memory", "free"]).key();
        assert!(ledger.unsubscribe(&key).is_err());
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_independent_keys() {
        let ledger = SubscriptionLedger::new();
        let cpu = MetricNamespace::from(["cpu"]).key();
        let mem = MetricNamespace::from(["memory"]).key();

        ledger.subscribe(&cpu);
        ledger.subscribe(&mem);
        ledger.subscribe(&mem);
        ledger.unsubscribe(&cpu).unwrap();

        assert_eq!(ledger.count(&cpu), 0);
        assert_eq!(ledger.count(&mem), 2);
        assert_eq!(ledger.keys(), vec!["/memory".to_string()]);
    }

    proptest! {
        #[test]
        fn prop_key_equal_iff_segments_equal(
            a in prop::collection::vec("[a-c/\\\\]{0,3}", 0..4),
            b in prop::collection::vec("[a-c/\\\\]{0,3}", 0..4),
        ) {
            let key_a = MetricNamespace::from(a.clone()).key();
            let key_b = MetricNamespace::from(b.clone()).key();
            prop_assert_eq!(key_a == key_b, a == b);
        }
    }
}
