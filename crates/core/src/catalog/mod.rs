//! Catalog module - account types, institutions and beneficiaries.

mod catalog_model;
mod catalog_traits;

pub use catalog_model::{AccountType, Beneficiary, Enseigne, EnseigneCategory};
pub use catalog_traits::CatalogRepositoryTrait;
