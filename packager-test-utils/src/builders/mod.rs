//! Test data builders

mod aip;
mod objects;

pub use aip::{AipTree, ManifestBuilder};
pub use objects::ObjectBuilder;
