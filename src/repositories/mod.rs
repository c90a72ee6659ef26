//! # Repository Layer
//!
//! Repositories wrap SeaORM operations per entity and return
//! [`RepositoryError`](crate::error::RepositoryError) so handlers can map
//! failures onto HTTP statuses in one place.

pub mod attachment;
pub mod comparison;
pub mod item;
pub mod settings;
pub mod user;
pub mod vendor;

pub use attachment::AttachmentRepository;
pub use comparison::ComparisonRepository;
pub use item::ItemRepository;
pub use settings::SettingsRepository;
pub use user::UserRepository;
pub use vendor::VendorRepository;
