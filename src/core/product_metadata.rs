//! Extraction entry point: one product file in, one normalized record out.
//!
//! Opens the attribute store, classifies the product, resolves geometry and
//! the sensing window, and applies the product type's mapping table. Each
//! call owns its store exclusively and releases it with the value; nothing
//! is shared or cached across files, so extracting N files in parallel
//! needs no coordination.

use crate::core::geometry::GeometryBuilder;
use crate::core::identity::ProductIdentity;
use crate::core::product_type::ProductType;
use crate::core::properties::PropertyMapper;
use crate::core::temporal::TemporalResolver;
use crate::io::attributes::AttributeStore;
use crate::types::{
    BoundingBox, FootprintGeometry, MetadataRecord, S5pError, S5pResult, TemporalExtent,
};
use chrono::NaiveDateTime;
use std::path::Path;

const GRANULE_DESCRIPTION: &str = "METADATA/GRANULE_DESCRIPTION";
const ISO_PLATFORM: &str = "METADATA/ISO_METADATA/gmi:acquisitionInformation/gmi:platform";

/// Normalized metadata of one Sentinel-5P granule
pub struct ProductMetadata {
    identity: ProductIdentity,
    product_type: ProductType,
    store: AttributeStore,
    geometry: FootprintGeometry,
    extent: TemporalExtent,
    /// Second sensing window of the combined ozone product
    troposphere_extent: Option<TemporalExtent>,
    after_upgrade: bool,
}

impl ProductMetadata {
    /// Open and extract a product file.
    ///
    /// The naming convention is validated before the file is touched; the
    /// attribute tree is only opened for a well-formed product name.
    pub fn open<P: AsRef<Path>>(path: P) -> S5pResult<Self> {
        let path = path.as_ref();
        let identity = ProductIdentity::from_path(path)?;
        let product_type = ProductType::classify(identity.scene_id())?;
        let store = AttributeStore::open(path)?;

        log::info!(
            "Extracting {:?} metadata from {}",
            product_type,
            identity.scene_id()
        );

        let extent = Self::read_extent(&store, "time_coverage_start", "time_coverage_end")?;
        let troposphere_extent = if product_type == ProductType::O3Tcl {
            Some(Self::read_extent(
                &store,
                "time_coverage_troposphere_start",
                "time_coverage_troposphere_end",
            )?)
        } else {
            None
        };

        // The stratosphere window decides the recalibration flag for the
        // combined ozone product; for everything else there is only one.
        let after_upgrade = TemporalResolver::is_after_upgrade(extent.start);

        let geometry = GeometryBuilder::footprint(&store, product_type)?;

        Ok(Self {
            identity,
            product_type,
            store,
            geometry,
            extent,
            troposphere_extent,
            after_upgrade,
        })
    }

    fn read_extent(
        store: &AttributeStore,
        start_attr: &str,
        end_attr: &str,
    ) -> S5pResult<TemporalExtent> {
        let start = store
            .root_attr(start_attr)?
            .as_string()
            .ok_or_else(|| S5pError::MissingAttribute(start_attr.to_string()))?;
        let end = store
            .root_attr(end_attr)?
            .as_string()
            .ok_or_else(|| S5pError::MissingAttribute(end_attr.to_string()))?;
        TemporalResolver::extent(&start, &end)
    }

    /// The validated product name, used as the STAC item id
    pub fn scene_id(&self) -> &str {
        self.identity.scene_id()
    }

    pub fn identity(&self) -> &ProductIdentity {
        &self.identity
    }

    pub fn product_type(&self) -> ProductType {
        self.product_type
    }

    /// Corrected ground footprint
    pub fn geometry(&self) -> &FootprintGeometry {
        &self.geometry
    }

    /// Planar bounds of the corrected footprint
    pub fn bbox(&self) -> BoundingBox {
        self.geometry.bounds()
    }

    /// Sensing window (stratosphere window for the combined ozone product)
    pub fn temporal_extent(&self) -> &TemporalExtent {
        &self.extent
    }

    /// Troposphere sensing window, present only for the combined ozone
    /// product
    pub fn troposphere_extent(&self) -> Option<&TemporalExtent> {
        self.troposphere_extent.as_ref()
    }

    /// Center of the sensing window, the item-level datetime
    pub fn datetime(&self) -> NaiveDateTime {
        self.extent.center
    }

    /// Whether the granule was sensed after the along-track resolution
    /// upgrade
    pub fn is_after_upgrade(&self) -> bool {
        self.after_upgrade
    }

    /// Platform name as recorded in the product metadata
    pub fn platform(&self) -> S5pResult<String> {
        let value = if self.product_type == ProductType::O3Tcl {
            self.store.group_attr(GRANULE_DESCRIPTION, "MissionName")?
        } else {
            self.store.group_attr(ISO_PLATFORM, "gmi:description")?
        };
        value
            .as_string()
            .ok_or_else(|| S5pError::MissingAttribute("platform".to_string()))
    }

    /// Absolute orbit number; the combined ozone product aggregates many
    /// orbits and reports none
    pub fn absolute_orbit(&self) -> S5pResult<Option<i64>> {
        if self.product_type == ProductType::O3Tcl {
            return Ok(None);
        }
        let orbit = self
            .store
            .root_attr("orbit")?
            .as_i64()
            .ok_or_else(|| S5pError::MissingAttribute("orbit".to_string()))?;
        Ok(Some(orbit))
    }

    /// Free-text product title, used as the data asset description
    pub fn title(&self) -> S5pResult<String> {
        self.store
            .root_attr("title")?
            .as_string()
            .ok_or_else(|| S5pError::MissingAttribute("title".to_string()))
    }

    /// The normalized, null-filtered property record
    pub fn properties(&self) -> S5pResult<MetadataRecord> {
        PropertyMapper::properties(&self.store, self.product_type, self.after_upgrade)
    }
}
