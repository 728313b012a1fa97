//! Vendor selection policy.

use llm::{Vendor, VendorsManager};
use std::sync::Arc;
use tracing::debug;

/// Pick the vendor for `model`.
///
/// An empty model selects the first vendor in registration order. Otherwise
/// the model index decides; an unknown model, or an index entry naming a
/// vendor that is no longer registered, yields `None`.
pub async fn select_vendor(vendors: &VendorsManager, model: &str) -> Option<Arc<dyn Vendor>> {
    if model.is_empty() {
        let vendor = vendors.first();
        debug!(
            "No model requested, using first vendor: {:?}",
            vendor.as_ref().map(|v| v.name().to_string())
        );
        return vendor;
    }

    let index = vendors.model_index().await;
    let Some(vendor_name) = index.vendor_for(model) else {
        debug!("Model '{}' is not served by any vendor", model);
        return None;
    };

    let vendor = vendors.find_by_name(vendor_name);
    debug!("Model '{}' resolved to vendor '{}' (found: {})", model, vendor_name, vendor.is_some());
    vendor
}
