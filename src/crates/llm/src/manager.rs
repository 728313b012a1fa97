//! Ordered directory of configured vendors.

use crate::error::{LlmError, Result};
use crate::vendor::Vendor;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Mapping from model name to the name of the vendor serving it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelIndex {
    models: HashMap<String, String>,
}

impl ModelIndex {
    /// Record `model` as served by `vendor` unless an earlier vendor already
    /// claimed it.
    fn claim(&mut self, model: String, vendor: &str) {
        self.models
            .entry(model)
            .or_insert_with(|| vendor.to_string());
    }

    /// Vendor name serving `model`.
    pub fn vendor_for(&self, model: &str) -> Option<&str> {
        self.models.get(model).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// Directory of vendors in registration order.
///
/// Registration order is significant: the first vendor is the fallback when
/// no model is requested, and the first vendor listing a model owns it in
/// the [`ModelIndex`].
#[derive(Clone, Default)]
pub struct VendorsManager {
    vendors: Vec<Arc<dyn Vendor>>,
    by_name: HashMap<String, usize>,
}

impl VendorsManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a vendor. Names must be unique.
    pub fn add_vendor(&mut self, vendor: Arc<dyn Vendor>) -> Result<()> {
        let name = vendor.name().to_string();
        if name.is_empty() {
            return Err(LlmError::ConfigError("vendor name cannot be empty".to_string()));
        }
        if self.by_name.contains_key(&name) {
            return Err(LlmError::ConfigError(format!(
                "vendor '{}' already registered",
                name
            )));
        }

        debug!("Registered vendor '{}' at position {}", name, self.vendors.len());
        self.by_name.insert(name, self.vendors.len());
        self.vendors.push(vendor);
        Ok(())
    }

    /// Register several vendors, stopping at the first failure.
    pub fn add_vendors<I>(&mut self, vendors: I) -> Result<()>
    where
        I: IntoIterator<Item = Arc<dyn Vendor>>,
    {
        for vendor in vendors {
            self.add_vendor(vendor)?;
        }
        Ok(())
    }

    /// Vendors in registration order.
    pub fn vendors(&self) -> &[Arc<dyn Vendor>] {
        &self.vendors
    }

    /// The first registered vendor.
    pub fn first(&self) -> Option<Arc<dyn Vendor>> {
        self.vendors.first().cloned()
    }

    pub fn find_by_name(&self, name: &str) -> Option<Arc<dyn Vendor>> {
        self.by_name
            .get(name)
            .and_then(|&idx| self.vendors.get(idx))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.vendors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vendors.is_empty()
    }

    /// Build the model index by asking every vendor for its models.
    ///
    /// A vendor whose listing fails is skipped; its models simply do not
    /// resolve.
    pub async fn model_index(&self) -> ModelIndex {
        let mut index = ModelIndex::default();

        for vendor in &self.vendors {
            match vendor.list_models().await {
                Ok(models) => {
                    for model in models {
                        index.claim(model, vendor.name());
                    }
                }
                Err(e) => {
                    warn!("Skipping models of vendor '{}': {}", vendor.name(), e);
                }
            }
        }

        index
    }
}

impl fmt::Debug for VendorsManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.vendors.iter().map(|v| v.name()).collect();
        f.debug_struct("VendorsManager").field("vendors", &names).finish()
    }
}
