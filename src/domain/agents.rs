//! Agent display name → messaging-provider agent id.

use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// Agents known out of the box.
pub static DEFAULT_AGENT_IDS: Lazy<BTreeMap<&'static str, &'static str>> = Lazy::new(|| {
    BTreeMap::from([
        ("Silvia", "1784526"),
        ("Mar", "1805384"),
        ("Andrea", "1827862"),
        ("Miguel", "1597886"),
    ])
});

/// Lookup table used when assigning conversations.
///
/// Names are matched exactly after trimming surrounding whitespace; anything
/// unknown resolves to the fallback id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentDirectory {
    ids: BTreeMap<String, String>,
    fallback_id: String,
}

impl AgentDirectory {
    /// Id used when neither the table nor the environment provides one.
    pub const FALLBACK_ID: &'static str = "1784489";

    pub fn new(ids: BTreeMap<String, String>, fallback_id: impl Into<String>) -> Self {
        Self {
            ids,
            fallback_id: fallback_id.into(),
        }
    }

    /// Resolve a display name to the provider-side agent id.
    pub fn resolve(&self, name: &str) -> &str {
        self.ids
            .get(name.trim())
            .map(String::as_str)
            .unwrap_or(&self.fallback_id)
    }

    pub fn fallback_id(&self) -> &str {
        &self.fallback_id
    }
}

impl Default for AgentDirectory {
    fn default() -> Self {
        let ids = DEFAULT_AGENT_IDS
            .iter()
            .map(|(name, id)| (name.to_string(), id.to_string()))
            .collect();
        Self::new(ids, Self::FALLBACK_ID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_agents() {
        let agents = AgentDirectory::default();
        assert_eq!(agents.resolve("Silvia"), "1784526");
        assert_eq!(agents.resolve("Miguel"), "1597886");
        assert_eq!(agents.resolve("  Andrea "), "1827862");
    }

    #[test]
    fn test_resolve_unknown_falls_back() {
        let agents = AgentDirectory::default();
        assert_eq!(agents.resolve("Nobody"), AgentDirectory::FALLBACK_ID);
        assert_eq!(agents.resolve(""), AgentDirectory::FALLBACK_ID);
    }

    #[test]
    fn test_resolve_is_case_sensitive() {
        let agents = AgentDirectory::default();
        assert_eq!(agents.resolve("mar"), AgentDirectory::FALLBACK_ID);
    }

    #[test]
    fn test_injected_table() {
        let agents = AgentDirectory::new(
            BTreeMap::from([("Ana".to_string(), "42".to_string())]),
            "7",
        );
        assert_eq!(agents.resolve("Ana"), "42");
        assert_eq!(agents.resolve("Mar"), "7");
    }
}
