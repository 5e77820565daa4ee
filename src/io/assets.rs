//! Asset descriptors for the generated STAC items.
//!
//! Every item carries the manifest asset pointing at the source file; the
//! product types backed by TROPOMI radiance bands additionally carry a data
//! asset with their `eo:bands` entries.

use crate::constants::{
    tropomi_band, JSON_MEDIA_TYPE, NETCDF_MEDIA_TYPE, SAFE_MANIFEST_ASSET_KEY, TropomiBand,
};
use crate::core::product_type::ProductType;
use crate::types::{S5pError, S5pResult};
use std::path::Path;

/// One STAC asset before serialization
#[derive(Debug, Clone)]
pub struct AssetDescriptor {
    /// Key under the item's `assets` object
    pub key: String,
    pub href: String,
    pub media_type: &'static str,
    pub roles: Vec<&'static str>,
    pub description: Option<String>,
    /// TROPOMI bands backing the asset, empty for bandless products
    pub bands: Vec<&'static TropomiBand>,
}

/// Manifest asset pointing at the opened source file
pub fn manifest_asset<P: AsRef<Path>>(path: P) -> S5pResult<AssetDescriptor> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    let media_type = match extension {
        "nc" => NETCDF_MEDIA_TYPE,
        "json" => JSON_MEDIA_TYPE,
        _ => {
            return Err(S5pError::UnsupportedFormat(format!(
                "{}: expected a .nc or .json product file",
                path.display()
            )))
        }
    };

    Ok(AssetDescriptor {
        key: SAFE_MANIFEST_ASSET_KEY.to_string(),
        href: path.display().to_string(),
        media_type,
        roles: vec!["metadata"],
        description: None,
        bands: Vec::new(),
    })
}

/// Band data asset, keyed by the file stem. A JSON-mirror path is mapped
/// back to the netCDF file it mirrors.
pub fn band_asset<P: AsRef<Path>>(
    path: P,
    product_type: ProductType,
    description: String,
) -> S5pResult<AssetDescriptor> {
    let path = path.as_ref();
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| {
            S5pError::NamingConvention(format!("{}: no base file name", path.display()))
        })?;

    let href = path.display().to_string();
    let href = match href.strip_suffix(".json") {
        Some(stripped) => format!("{}.nc", stripped),
        None => href,
    };

    let bands = product_type
        .band_numbers()
        .iter()
        .filter_map(|&number| tropomi_band(number))
        .collect();

    Ok(AssetDescriptor {
        key: stem.to_string(),
        href,
        media_type: NETCDF_MEDIA_TYPE,
        roles: vec!["data"],
        description: Some(description),
        bands,
    })
}
