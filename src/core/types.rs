use serde::{Deserialize, Serialize};

/// Name of a storage bucket, one per product type
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BucketId(String);

impl BucketId {
    /// Create a new bucket ID
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the raw name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BucketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BucketId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for BucketId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Units removed by one drain, in the order the buckets were picked
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    entries: Vec<(BucketId, u64)>,
}

impl Allocation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pick; zero-unit picks are not recorded
    pub(crate) fn push(&mut self, bucket: BucketId, units: u64) {
        if units > 0 {
            self.entries.push((bucket, units));
        }
    }

    /// Units taken from `bucket`, zero if it was not touched
    pub fn get(&self, bucket: &str) -> u64 {
        self.entries
            .iter()
            .find(|(id, _)| id.as_str() == bucket)
            .map_or(0, |(_, units)| *units)
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, units)| units).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BucketId, u64)> {
        self.entries.iter().map(|(id, units)| (id, *units))
    }
}

impl std::fmt::Display for Allocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .entries
            .iter()
            .map(|(id, units)| format!("{}={}", id, units))
            .collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}
