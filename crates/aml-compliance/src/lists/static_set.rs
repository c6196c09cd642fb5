use std::collections::HashSet;

/// Immutable set of addresses parsed once from a comma-separated config value.
///
/// Entries are trimmed and empty entries dropped. Matching is exact: base58 and
/// checksummed hex addresses are case-significant, so no case folding happens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticAddressSet {
    addresses: HashSet<String>,
}

impl StaticAddressSet {
    pub fn from_csv(raw: &str) -> Self {
        let addresses: HashSet<String> = split_csv(raw).map(str::to_string).collect();
        tracing::debug!("Parsed address set: {} entries", addresses.len());
        Self { addresses }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Exact lookup; the query is not trimmed or case-folded.
    pub fn contains(&self, address: &str) -> bool {
        self.addresses.contains(address)
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for StaticAddressSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let addresses = iter
            .into_iter()
            .map(Into::into)
            .map(|a: String| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
        Self { addresses }
    }
}

/// Immutable set of ISO 3166-1 alpha-2 country codes, stored uppercase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticCountrySet {
    codes: HashSet<String>,
}

impl StaticCountrySet {
    pub fn from_csv(raw: &str) -> Self {
        let codes: HashSet<String> = split_csv(raw).map(str::to_uppercase).collect();
        tracing::debug!("Parsed country set: {} entries", codes.len());
        Self { codes }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn contains(&self, country: &str) -> bool {
        self.codes.contains(&country.trim().to_uppercase())
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

fn split_csv(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|entry| !entry.is_empty())
}
