//! Domain module - Core entities and value objects
//!
//! This module contains the crawler's domain types: the records it produces
//! and the per-site extraction profiles that drive it.
//!
//! Modern Rust module organization (Rust 2018+ style):
//! - Each module is its own file in the domain/ directory
//! - Public exports are defined here for convenience

pub mod constants;
pub mod product;
pub mod profile;

// Re-export commonly used items for convenience
pub use product::{ProductRecord, ResultSet};
pub use profile::{ExtractionProfile, ProductDetailSelectors, Storefront};
