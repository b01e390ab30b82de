use anyhow::Result;
use async_trait::async_trait;
use shared::domain::{Property, PropertyId};

mod catalog;
mod query;

pub use catalog::{builtin_properties, CatalogError, StaticCatalog};
pub use query::{ListSummary, ListingQuery};

/// Supplies property records to the map and list views.
#[async_trait]
pub trait PropertySource: Send + Sync {
    /// Properties matching `query`, in source order.
    async fn list(&self, query: &ListingQuery) -> Result<Vec<Property>>;
    async fn get(&self, id: PropertyId) -> Result<Option<Property>>;
    /// Distinct type labels, in first-seen order.
    async fn kinds(&self) -> Result<Vec<String>>;
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
