//! STAC Item assembly from extracted product metadata.
//!
//! Thin layer over the extraction core: merges the normalized record with
//! the item-level common metadata and the satellite/projection/electro-
//! optical extension fields, then attaches the asset descriptors.

use crate::constants::{
    EPSG, INTERNATIONAL_DESIGNATOR, SENTINEL_CONSTELLATION, SENTINEL_LICENSE_URL,
    SENTINEL_PROVIDER_NAME, SENTINEL_PROVIDER_ROLES, SENTINEL_PROVIDER_URL,
};
use crate::core::product_metadata::ProductMetadata;
use crate::io::assets::{band_asset, manifest_asset, AssetDescriptor};
use crate::types::{MetadataRecord, S5pResult};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::Path;

const STAC_VERSION: &str = "1.0.0";
const EO_EXTENSION: &str = "https://stac-extensions.github.io/eo/v1.0.0/schema.json";
const PROJECTION_EXTENSION: &str =
    "https://stac-extensions.github.io/projection/v1.0.0/schema.json";
const SAT_EXTENSION: &str = "https://stac-extensions.github.io/sat/v1.0.0/schema.json";

/// A serializable STAC Item document
#[derive(Debug, Clone, Serialize)]
pub struct StacItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub stac_version: String,
    pub stac_extensions: Vec<String>,
    pub id: String,
    pub geometry: Value,
    pub bbox: Vec<f64>,
    pub properties: MetadataRecord,
    pub links: Vec<Value>,
    pub assets: MetadataRecord,
}

impl StacItem {
    /// Pretty-printed JSON document
    pub fn to_json(&self) -> S5pResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Create a STAC Item from a Sentinel-5P product file.
///
/// The path may point at the netCDF granule or at its JSON metadata mirror;
/// both produce the same item.
pub fn create_item<P: AsRef<Path>>(path: P) -> S5pResult<StacItem> {
    let path = path.as_ref();
    let metadata = ProductMetadata::open(path)?;

    let mut properties = metadata.properties()?;
    properties.insert(
        "datetime".to_string(),
        Value::from(
            metadata
                .datetime()
                .format("%Y-%m-%dT%H:%M:%S%.6fZ")
                .to_string(),
        ),
    );
    properties.insert("platform".to_string(), Value::from(metadata.platform()?));
    properties.insert(
        "constellation".to_string(),
        Value::from(SENTINEL_CONSTELLATION),
    );
    properties.insert(
        "providers".to_string(),
        json!([{
            "name": SENTINEL_PROVIDER_NAME,
            "roles": SENTINEL_PROVIDER_ROLES,
            "url": SENTINEL_PROVIDER_URL,
        }]),
    );

    // sat extension
    properties.insert(
        "sat:platform_international_designator".to_string(),
        Value::from(INTERNATIONAL_DESIGNATOR),
    );
    if let Some(orbit) = metadata.absolute_orbit()? {
        properties.insert("sat:absolute_orbit".to_string(), Value::from(orbit));
    }

    // proj extension
    properties.insert("proj:epsg".to_string(), Value::from(EPSG));

    let mut assets = MetadataRecord::new();
    let manifest = manifest_asset(path)?;
    assets.insert(manifest.key.clone(), asset_to_json(&manifest));
    if metadata.product_type().has_band_asset() {
        let data = band_asset(path, metadata.product_type(), metadata.title()?)?;
        assets.insert(data.key.clone(), asset_to_json(&data));
    }

    Ok(StacItem {
        kind: "Feature".to_string(),
        stac_version: STAC_VERSION.to_string(),
        stac_extensions: vec![
            SAT_EXTENSION.to_string(),
            EO_EXTENSION.to_string(),
            PROJECTION_EXTENSION.to_string(),
        ],
        id: metadata.scene_id().to_string(),
        geometry: metadata.geometry().to_geojson(),
        bbox: metadata.bbox().to_vec(),
        properties,
        links: vec![json!({
            "rel": "license",
            "href": SENTINEL_LICENSE_URL,
        })],
        assets,
    })
}

fn asset_to_json(asset: &AssetDescriptor) -> Value {
    let mut document = json!({
        "href": asset.href,
        "type": asset.media_type,
        "roles": asset.roles,
    });
    if let Some(description) = &asset.description {
        document["description"] = Value::from(description.clone());
    }
    if !asset.bands.is_empty() {
        document["eo:bands"] = asset
            .bands
            .iter()
            .map(|band| {
                json!({
                    "name": band.name,
                    "description": band.description,
                    "center_wavelength": band.center_wavelength,
                    "full_width_half_max": band.full_width_half_max,
                })
            })
            .collect();
    }
    document
}
