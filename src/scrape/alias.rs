//! Display-name to URL-slug remapping for language names

use std::collections::HashMap;

/// Maps ranking display names (e.g. `C++`) to the keys used on topic pages
/// (e.g. `cpp`). Names without an entry pass through unchanged.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    aliases: HashMap<String, String>,
}

impl AliasTable {
    pub fn new(aliases: HashMap<String, String>) -> Self {
        Self { aliases }
    }

    pub fn normalize(&self, name: &str) -> String {
        match self.aliases.get(name) {
            Some(alias) => {
                tracing::trace!("Replacing {} with alias {}", name, alias);
                alias.clone()
            }
            None => name.to_string(),
        }
    }

    /// Normalizes every name, keeping order
    pub fn normalize_all(&self, names: &[String]) -> Vec<String> {
        names.iter().map(|name| self.normalize(name)).collect()
    }
}
