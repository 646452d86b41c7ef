//! Country-name reconciliation between data sources
//!
//! The UN, WHO and Our World in Data spell a handful of countries differently.
//! Names are mapped onto one canonical spelling (the OWID one) before any
//! grouping or joining.

use std::collections::HashMap;

/// Territories listed as part of a continent that have no permanent population
/// and never appear in the mortality data
pub const UNINHABITED_TERRITORIES: [&str; 1] = ["South Georgia and the South Sandwich Islands"];

/// Source spelling -> canonical spelling
#[derive(Debug, Clone, Default)]
pub struct CountryAliases {
    aliases: HashMap<String, String>,
}

impl CountryAliases {
    pub fn new() -> Self {
        Self::default()
    }

    /// UN/WHO long-form names mapped to their OWID spelling
    pub fn un_to_owid() -> Self {
        Self::new()
            .with_alias("Venezuela (Bolivarian Republic of)", "Venezuela")
            .with_alias("Bolivia (Plurinational State of)", "Bolivia")
            .with_alias("Falkland Islands (Malvinas)", "Falkland Islands")
    }

    pub fn with_alias(mut self, source: impl Into<String>, canonical: impl Into<String>) -> Self {
        self.aliases.insert(source.into(), canonical.into());
        self
    }

    /// Canonical spelling; names without an alias are returned unchanged
    pub fn canonical<'a>(&'a self, name: &'a str) -> &'a str {
        let name = name.trim();
        self.aliases.get(name).map(String::as_str).unwrap_or(name)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_aliases() {
        let aliases = CountryAliases::un_to_owid();
        assert_eq!(aliases.len(), 3);
        assert_eq!(aliases.canonical("Venezuela (Bolivarian Republic of)"), "Venezuela");
        assert_eq!(aliases.canonical("Bolivia (Plurinational State of)"), "Bolivia");
        assert_eq!(aliases.canonical("Falkland Islands (Malvinas)"), "Falkland Islands");
    }

    #[test]
    fn test_unknown_names_pass_through() {
        let aliases = CountryAliases::un_to_owid();
        assert_eq!(aliases.canonical("Brazil"), "Brazil");
        assert_eq!(aliases.canonical(" Chile "), "Chile");
    }
}
