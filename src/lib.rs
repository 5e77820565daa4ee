//! tropostac: A Fast, Modular Sentinel-5P TROPOMI to STAC Metadata Extractor
//!
//! This library converts Sentinel-5P Level-2 product files (netCDF4 granules
//! or their pre-exported JSON metadata mirrors) into STAC Item records:
//! normalized metadata documents carrying the sensing footprint, temporal
//! extent, satellite facts, and a typed property dictionary for each of the
//! thirteen TROPOMI product types.

pub mod constants;
pub mod core;
pub mod io;
pub mod stac;
pub mod types;

// Re-export main types
pub use crate::core::{
    GeometryBuilder, ProductIdentity, ProductMetadata, ProductType, PropertyMapper,
    TemporalResolver,
};
pub use crate::io::{AttrValue, AttributeStore};
pub use crate::stac::{create_item, StacItem};
pub use crate::types::{
    BoundingBox, FootprintGeometry, MetadataRecord, ProcessingMode, S5pError, S5pResult,
    TemporalExtent,
};
