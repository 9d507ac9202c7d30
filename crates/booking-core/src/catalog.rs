//! # Priceable Catalog
//!
//! Read-only view of one service and its bookable options, as returned by
//! the catalog collaborator's `GetActiveOptions(service_id)`.

use serde::{Deserialize, Serialize};

use crate::types::ServiceOption;

/// Options of a single service, indexed for resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceCatalog {
    service_id: String,
    options: Vec<ServiceOption>,
}

impl ServiceCatalog {
    /// Wraps the options supplied for `service_id`.
    pub fn new(service_id: impl Into<String>, options: Vec<ServiceOption>) -> Self {
        ServiceCatalog {
            service_id: service_id.into(),
            options,
        }
    }

    /// The service this view describes.
    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    /// All supplied options, in catalog order.
    pub fn options(&self) -> &[ServiceOption] {
        &self.options
    }

    /// Looks up an option that is active and belongs to this service.
    pub fn active_option(&self, option_id: &str) -> Option<&ServiceOption> {
        self.options
            .iter()
            .find(|o| o.id == option_id && o.service_id == self.service_id && o.is_active)
    }

    /// True when the service offers nothing bookable.
    pub fn is_empty(&self) -> bool {
        !self
            .options
            .iter()
            .any(|o| o.is_active && o.service_id == self.service_id)
    }
}
