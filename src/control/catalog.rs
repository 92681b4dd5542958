//! Plugin Catalog
//!
//! Read-only snapshot of the loaded plugins, in load order.

use std::ops::Index;
use std::sync::Arc;
use crate::control::registry::PluginRegistry;
use crate::plugin::traits::{CatalogedPlugin, PluginIdentity};

/// Immutable copy of the plugin table
#[derive(Debug, Clone, Default)]
pub struct PluginCatalog(Vec<Arc<dyn CatalogedPlugin>>);

impl PluginCatalog {
    /// Copy the registry table while holding its lock
    pub(crate) async fn capture(registry: &PluginRegistry) -> Self {
        let table = registry.table().await;
        Self(table.iter().cloned().collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<dyn CatalogedPlugin>> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<dyn CatalogedPlugin>> {
        self.0.iter()
    }

    pub fn contains(&self, identity: &PluginIdentity) -> bool {
        self.0.iter().any(|p| &p.identity() == identity)
    }

    pub fn find(&self, name: &str) -> Option<&Arc<dyn CatalogedPlugin>> {
        self.0.iter().find(|p| p.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|p| p.name()).collect()
    }

    pub fn identities(&self) -> Vec<PluginIdentity> {
        self.0.iter().map(|p| p.identity()).collect()
    }
}

impl Index<usize> for PluginCatalog {
    type Output = Arc<dyn CatalogedPlugin>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IntoIterator for PluginCatalog {
    type Item = Arc<dyn CatalogedPlugin>;
    type IntoIter = std::vec::IntoIter<Arc<dyn CatalogedPlugin>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a PluginCatalog {
    type Item = &'a Arc<dyn CatalogedPlugin>;
    type IntoIter = std::slice::Iter<'a, Arc<dyn CatalogedPlugin>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
