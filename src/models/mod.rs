//! # Data Models
//!
//! SeaORM entities for the price-comparison service.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod attachment;
pub mod comparison;
pub mod comparison_row;
pub mod comparison_vendor;
pub mod item;
pub mod settings;
pub mod user;
pub mod vendor;

pub use attachment::Entity as Attachment;
pub use comparison::{ComparisonStatus, Entity as Comparison};
pub use comparison_row::Entity as ComparisonRow;
pub use comparison_vendor::Entity as ComparisonVendor;
pub use item::{Entity as Item, UnitOfMeasure};
pub use settings::Entity as Settings;
pub use user::{Entity as User, Role};
pub use vendor::Entity as Vendor;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "price-comparison".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
