use xxhash_rust::xxh3::xxh3_64;

/// Resolved shader property identifier.
///
/// Derived from the property name alone, so every material and texture agrees on it without a
/// shared intern table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropertyId(u64);

impl PropertyId {
    pub fn from_name(name: &str) -> Self {
        Self(xxh3_64(name.as_bytes()))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}
