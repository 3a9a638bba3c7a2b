//! Global platform registry for looking up platform definitions.

use std::sync::{LazyLock, RwLock};

use indexmap::IndexMap;

use super::definition::PlatformDefinition;
use super::vendors;
use crate::error::{PlatformError, Result};

/// Global platform registry.
static REGISTRY: LazyLock<RwLock<PlatformRegistry>> = LazyLock::new(|| {
    let mut registry = PlatformRegistry::new();
    registry.register_builtin_platforms();
    RwLock::new(registry)
});

/// Registry for platform definitions, in registration order.
#[derive(Debug, Default)]
pub struct PlatformRegistry {
    platforms: IndexMap<String, PlatformDefinition>,
}

impl PlatformRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            platforms: IndexMap::new(),
        }
    }

    /// Get the global registry.
    pub fn global() -> &'static RwLock<PlatformRegistry> {
        &REGISTRY
    }

    /// Look up a platform in the global registry, cloning it out.
    pub fn lookup(name: &str) -> Result<PlatformDefinition> {
        REGISTRY
            .read()
            .map_err(|_| PlatformError::InvalidDefinition {
                message: "Failed to acquire registry lock".to_string(),
            })?
            .get(name)
            .cloned()
            .ok_or_else(|| {
                PlatformError::UnknownPlatform {
                    name: name.to_string(),
                }
                .into()
            })
    }

    fn register_builtin_platforms(&mut self) {
        for platform in vendors::builtin() {
            self.platforms.insert(platform.name.clone(), platform);
        }
    }

    /// Register a platform definition.
    pub fn register(&mut self, platform: PlatformDefinition) -> Result<()> {
        if self.platforms.contains_key(&platform.name) {
            return Err(PlatformError::AlreadyRegistered {
                name: platform.name.clone(),
            }
            .into());
        }
        self.platforms.insert(platform.name.clone(), platform);
        Ok(())
    }

    /// Get a platform by name.
    pub fn get(&self, name: &str) -> Option<&PlatformDefinition> {
        self.platforms.get(name)
    }

    /// Check if a platform is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.platforms.contains_key(name)
    }

    /// List all registered platform names.
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.platforms.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_platforms_registered() {
        let registry = PlatformRegistry::global().read().unwrap();
        let names: Vec<&String> = registry.names().collect();
        assert_eq!(
            names,
            vec![
                "juniper_junos",
                "juniper_junos_telnet",
                "hp_comware",
                "hp_comware_telnet",
                "broadcom_icos",
            ]
        );
    }

    #[test]
    fn test_lookup() {
        let platform = PlatformRegistry::lookup("hp_comware_telnet").unwrap();
        assert_eq!(platform.line_terminator, "\r\n");

        let err = PlatformRegistry::lookup("cisco_ios").unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Platform(PlatformError::UnknownPlatform { .. })
        ));
    }

    #[test]
    fn test_register_duplicate() {
        let mut registry = PlatformRegistry::new();
        registry.register(vendors::juniper::platform()).unwrap();
        assert!(registry.contains("juniper_junos"));
        let err = registry.register(vendors::juniper::platform()).unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Platform(PlatformError::AlreadyRegistered { .. })
        ));
    }
}
