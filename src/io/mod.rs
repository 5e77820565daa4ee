//! I/O modules for reading product attribute trees and describing assets

pub mod assets;
pub mod attributes;

pub use attributes::{AttrValue, AttributeStore};
