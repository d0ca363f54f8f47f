//! Tag registry: cache domains and the tags that purge them.
//!
//! Each domain maps to one or more [`TagConfig`] rows naming a tag and the
//! functional endpoints whose responses that tag is expected to cover. The
//! registry also carries the ordered table of spot-check candidates used to
//! prove that an invalidation stayed inside its domain.
//!
//! Loaded once at startup and never mutated.

mod builtin;
pub mod spot_check;

use figment::{
    Figment,
    providers::{Format, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::Error;

pub use spot_check::{DEFAULT_SPOT_CHECK_LIMIT, select, select_excluding};

/// A tag and the endpoints it covers.
///
/// `endpoints` may be empty: some tags have no known functional endpoint, in
/// which case only invalidation success and isolation can be verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagConfig {
    /// Human label for logging.
    pub label: String,
    /// Tag string passed to the invalidation endpoint.
    pub tag: String,
    /// Functional endpoints that populate this cache.
    #[serde(default)]
    pub endpoints: Vec<String>,
}

/// A logical cache domain (e.g. "bank", "category").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub name: String,
    pub tags: Vec<TagConfig>,
}

/// A representative endpoint of a domain, read to detect over-reaching purges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotCheck {
    pub domain: String,
    pub path: String,
    pub label: String,
}

/// On-disk shape of a registry file.
#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    domains: Vec<Domain>,
    #[serde(default)]
    spot_checks: Vec<SpotCheck>,
}

/// Immutable domain -> tag table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagRegistry {
    domains: Vec<Domain>,
    spot_checks: Vec<SpotCheck>,
}

impl TagRegistry {
    /// Build a registry, checking that tags are non-empty and domain names unique.
    pub fn new(domains: Vec<Domain>, spot_checks: Vec<SpotCheck>) -> Result<Self, Error> {
        let mut seen = HashSet::new();
        for domain in &domains {
            if domain.name.is_empty() {
                return Err(Error::Registry("domain name must not be empty".into()));
            }
            if !seen.insert(domain.name.as_str()) {
                return Err(Error::Registry(format!("duplicate domain: {}", domain.name)));
            }
            if let Some(row) = domain.tags.iter().find(|t| t.tag.is_empty()) {
                return Err(Error::Registry(format!("empty tag in domain {} ({})", domain.name, row.label)));
            }
        }

        if let Some(check) = spot_checks.iter().find(|c| c.path.is_empty()) {
            return Err(Error::Registry(format!("spot check {} has an empty path", check.label)));
        }

        Ok(Self { domains, spot_checks })
    }

    /// The registry compiled into the binary.
    pub fn builtin() -> Self {
        Self { domains: builtin::domains(), spot_checks: builtin::spot_checks() }
    }

    /// Load a registry from a TOML file.
    ///
    /// A file that omits `spot_checks` inherits the built-in candidates.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::Registry(format!("registry file not found: {}", path.display())));
        }

        let file: RegistryFile = Figment::from(Toml::file(path))
            .extract()
            .map_err(|e| Error::Registry(format!("{}: {e}", path.display())))?;

        let spot_checks = if file.spot_checks.is_empty() { builtin::spot_checks() } else { file.spot_checks };
        let registry = Self::new(file.domains, spot_checks)?;

        tracing::debug!(
            domains = registry.domains.len(),
            tags = registry.len(),
            "loaded tag registry from {}",
            path.display()
        );

        Ok(registry)
    }

    /// Load from `path` when given, otherwise use the built-in table.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(path) => Self::from_toml_file(path),
            None => Ok(Self::builtin()),
        }
    }

    pub fn domains(&self) -> &[Domain] {
        &self.domains
    }

    pub fn domain(&self, name: &str) -> Option<&Domain> {
        self.domains.iter().find(|d| d.name == name)
    }

    pub fn spot_checks(&self) -> &[SpotCheck] {
        &self.spot_checks
    }

    /// Every (domain, tag) row in registry order.
    pub fn rows(&self) -> impl Iterator<Item = (&str, &TagConfig)> {
        self.domains
            .iter()
            .flat_map(|d| d.tags.iter().map(move |t| (d.name.as_str(), t)))
    }

    /// Number of tag rows.
    pub fn len(&self) -> usize {
        self.domains.iter().map(|d| d.tags.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(label: &str, tag: &str, endpoints: &[&str]) -> TagConfig {
        TagConfig { label: label.into(), tag: tag.into(), endpoints: endpoints.iter().map(|e| e.to_string()).collect() }
    }

    #[test]
    fn test_builtin_registry_is_valid() {
        let registry = TagRegistry::builtin();
        let rebuilt = TagRegistry::new(registry.domains().to_vec(), registry.spot_checks().to_vec());
        assert!(rebuilt.is_ok());
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_builtin_domain_order() {
        let registry = TagRegistry::builtin();
        let names: Vec<&str> = registry.domains().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names.first(), Some(&"bank"));
        assert_eq!(names.last(), Some(&"state"));
        assert!(names.contains(&"news"));
    }

    #[test]
    fn test_builtin_bank_row() {
        let registry = TagRegistry::builtin();
        let bank = registry.domain("bank").unwrap();
        assert_eq!(bank.tags[0].tag, "bank");
        assert_eq!(bank.tags[0].endpoints, vec!["/v1/bank/index", "/v1/bank/detail?slug=hdfc-bank"]);
    }

    #[test]
    fn test_builtin_empty_endpoint_sets() {
        let registry = TagRegistry::builtin();
        let store = registry.domain("store").unwrap();
        assert!(store.tags.iter().all(|t| t.endpoints.is_empty()));
        let news = registry.domain("news").unwrap();
        assert_eq!(news.tags.len(), 4);
        assert!(news.tags.iter().all(|t| t.endpoints.is_empty()));
    }

    #[test]
    fn test_rows_in_order() {
        let registry = TagRegistry::builtin();
        let (domain, first) = registry.rows().next().unwrap();
        assert_eq!(domain, "bank");
        assert_eq!(first.tag, "bank");
        assert_eq!(registry.rows().count(), registry.len());
    }

    #[test]
    fn test_rejects_empty_tag() {
        let domains = vec![Domain { name: "bank".into(), tags: vec![tag("broken", "", &[])] }];
        let result = TagRegistry::new(domains, Vec::new());
        assert!(matches!(result, Err(Error::Registry(_))));
    }

    #[test]
    fn test_rejects_duplicate_domain() {
        let domains = vec![
            Domain { name: "bank".into(), tags: vec![tag("a", "bank", &[])] },
            Domain { name: "bank".into(), tags: vec![tag("b", "bank:x", &[])] },
        ];
        let result = TagRegistry::new(domains, Vec::new());
        assert!(matches!(result, Err(Error::Registry(msg)) if msg.contains("duplicate")));
    }

    #[test]
    fn test_missing_file() {
        let result = TagRegistry::from_toml_file("/nonexistent/registry.toml");
        assert!(matches!(result, Err(Error::Registry(_))));
    }

    #[test]
    fn test_load_from_toml() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "registry.toml",
                r#"
                [[domains]]
                name = "bank"

                [[domains.tags]]
                label = "Bank list"
                tag = "bank"
                endpoints = ["/v1/bank/index"]

                [[domains]]
                name = "store"

                [[domains.tags]]
                label = "Store inventory"
                tag = "store-inventory:all"
                "#,
            )?;

            let registry = TagRegistry::from_toml_file("registry.toml").map_err(|e| e.to_string())?;
            assert_eq!(registry.len(), 2);
            assert!(registry.domain("store").unwrap().tags[0].endpoints.is_empty());
            assert_eq!(registry.spot_checks(), TagRegistry::builtin().spot_checks());
            Ok(())
        });
    }
}
