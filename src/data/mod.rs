//! Data module - dataset location, CSV loading and normalization

mod dataset;
pub mod loader;

pub use dataset::{Dataset, FilterSelection, GroupingMode, RegistrationRecord};
pub use loader::LoaderError;
