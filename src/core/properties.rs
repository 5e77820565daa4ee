//! Per-product-type property mapping tables.
//!
//! Each product type maps a fixed set of source attribute paths to
//! normalized, namespaced property names. The tables are declarative data
//! (path -> key -> transform), so adding or auditing a product type means
//! editing one table, not another branch of extraction code.
//!
//! Properties that resolve to an explicit null are dropped from the record;
//! properties whose attribute path is absent fail the extraction.

use crate::constants::{
    RESOLUTION_NEW_ALONG_TRACK, RESOLUTION_OLD_ALONG_TRACK, RESOLUTION_POST_UPGRADE,
    RESOLUTION_PRE_UPGRADE,
};
use crate::core::product_type::ProductType;
use crate::io::attributes::{AttrValue, AttributeStore};
use crate::types::{MetadataRecord, S5pError, S5pResult};
use serde_json::Value;

const GRANULE_DESCRIPTION: &str = "METADATA/GRANULE_DESCRIPTION";
const ALGORITHM_SETTINGS: &str = "METADATA/ALGORITHM_SETTINGS";
const EOP_PROCESSING: &str = "METADATA/EOP_METADATA/eop:metaDataProperty/eop:processing";
const EOP_INSTRUMENT: &str = "METADATA/EOP_METADATA/om:procedure/eop:instrument";

/// Source attribute path of one mapped value
#[derive(Debug, Clone, Copy)]
enum Source {
    /// Global attribute
    Root(&'static str),
    /// Attribute of a nested group
    Group(&'static str, &'static str),
}

impl Source {
    fn fetch(&self, store: &AttributeStore) -> S5pResult<AttrValue> {
        match self {
            Source::Root(name) => store.root_attr(name),
            Source::Group(group, name) => store.group_attr(group, name),
        }
    }

    fn path(&self) -> String {
        match self {
            Source::Root(name) => (*name).to_string(),
            Source::Group(group, name) => format!("{}/{}", group, name),
        }
    }
}

/// How one source value becomes a normalized property value
#[derive(Debug, Clone, Copy)]
enum Transform {
    /// String, as stored
    Text(Source),
    /// String with a trailing `Z` appended (19-char timestamp attributes)
    TextZ(Source),
    /// Integer
    Int(Source),
    /// Single-element string list
    TextList(Source),
    /// Single-element string list, uppercased
    UpperTextList(Source),
    /// `input.<i>.type` sequence from the algorithm settings; a count of 1
    /// yields a scalar string, otherwise an ordered list
    InputBands(u8),
    /// `input.<i>.irrType` picks; a single index yields a scalar string
    Irradiance(&'static [u8]),
    /// Integer list split on `";"` with empty tail entries dropped
    ViirsBands(Source),
    /// Integer list split on whitespace
    OrbitList(Source),
    /// Base names (no directories, no extensions) of a whitespace-separated
    /// path list
    FileBasenames(Source),
    /// Two dimension sizes `[along_track, across_track]` read from a group
    Shape(&'static str, &'static str, &'static str),
    /// Ground-pixel resolution with the recalibration-epoch correction
    SpatialResolution,
}

/// One entry of a product type's mapping table
struct FieldRule {
    key: &'static str,
    transform: Transform,
}

macro_rules! rule {
    ($key:literal, $transform:expr) => {
        FieldRule {
            key: $key,
            transform: $transform,
        }
    };
}

const AER_AI_RULES: &[FieldRule] = &[
    rule!("start_datetime", Transform::Text(Source::Root("time_coverage_start"))),
    rule!("end_datetime", Transform::Text(Source::Root("time_coverage_end"))),
    rule!("instruments", Transform::TextList(Source::Root("sensor"))),
    rule!("s5p:processing_mode", Transform::Text(Source::Group(EOP_PROCESSING, "eop:processingMode"))),
    rule!("s5p:product_type", Transform::Text(Source::Group(GRANULE_DESCRIPTION, "ProductShortName"))),
    rule!("s5p:shape", Transform::Shape("PRODUCT", "scanline", "ground_pixel")),
    rule!("s5p:spatial_resolution", Transform::SpatialResolution),
    rule!("aer_ai:geolocation_grid_from_band", Transform::Int(Source::Root("geolocation_grid_from_band"))),
    rule!("aer_ai:input_band", Transform::InputBands(1)),
    rule!("aer_ai:irradiance_accompanied", Transform::Irradiance(&[1])),
];

const AER_LH_RULES: &[FieldRule] = &[
    rule!("start_datetime", Transform::Text(Source::Root("time_coverage_start"))),
    rule!("end_datetime", Transform::Text(Source::Root("time_coverage_end"))),
    rule!("instruments", Transform::TextList(Source::Root("sensor"))),
    rule!("s5p:processing_mode", Transform::Text(Source::Group(EOP_PROCESSING, "eop:processingMode"))),
    rule!("s5p:product_type", Transform::Text(Source::Group(GRANULE_DESCRIPTION, "ProductShortName"))),
    rule!("s5p:shape", Transform::Shape("PRODUCT", "scanline", "ground_pixel")),
    rule!("s5p:spatial_resolution", Transform::SpatialResolution),
    rule!("aer_lh:geolocation_grid_from_band", Transform::Int(Source::Root("geolocation_grid_from_band"))),
    rule!("aer_lh:input_band", Transform::InputBands(5)),
    rule!("aer_lh:irradiance_accompanied", Transform::Irradiance(&[1])),
];

const CH4_RULES: &[FieldRule] = &[
    rule!("start_datetime", Transform::Text(Source::Root("time_coverage_start"))),
    rule!("end_datetime", Transform::Text(Source::Root("time_coverage_end"))),
    rule!("instruments", Transform::TextList(Source::Root("sensor"))),
    rule!("s5p:processing_mode", Transform::Text(Source::Group(EOP_PROCESSING, "eop:processingMode"))),
    rule!("s5p:product_type", Transform::Text(Source::Group(GRANULE_DESCRIPTION, "ProductShortName"))),
    rule!("s5p:shape", Transform::Shape("PRODUCT", "scanline", "ground_pixel")),
    rule!("s5p:spatial_resolution", Transform::SpatialResolution),
    rule!("ch4:geolocation_grid_from_band", Transform::Int(Source::Root("geolocation_grid_from_band"))),
    rule!("ch4:input_band", Transform::InputBands(7)),
    rule!("ch4:irradiance_accompanied", Transform::Irradiance(&[1, 3])),
];

const CLOUD_RULES: &[FieldRule] = &[
    rule!("start_datetime", Transform::TextZ(Source::Root("time_coverage_start"))),
    rule!("end_datetime", Transform::TextZ(Source::Root("time_coverage_end"))),
    rule!("instruments", Transform::TextList(Source::Root("sensor"))),
    rule!("s5p:processing_mode", Transform::Text(Source::Group(EOP_PROCESSING, "eop:processingMode"))),
    rule!("s5p:product_type", Transform::Text(Source::Group(GRANULE_DESCRIPTION, "ProductShortName"))),
    rule!("s5p:shape", Transform::Shape("PRODUCT", "scanline", "ground_pixel")),
    rule!("s5p:spatial_resolution", Transform::SpatialResolution),
    rule!("cloud:geolocation_grid_from_band", Transform::Int(Source::Root("geolocation_grid_from_band"))),
    rule!("cloud:cloud_mode", Transform::Text(Source::Root("cloud_mode"))),
];

const CO_RULES: &[FieldRule] = &[
    rule!("start_datetime", Transform::Text(Source::Root("time_coverage_start"))),
    rule!("end_datetime", Transform::Text(Source::Root("time_coverage_end"))),
    rule!("instruments", Transform::TextList(Source::Root("sensor"))),
    rule!("s5p:processing_mode", Transform::Text(Source::Group(EOP_PROCESSING, "eop:processingMode"))),
    rule!("s5p:product_type", Transform::Text(Source::Group(GRANULE_DESCRIPTION, "ProductShortName"))),
    rule!("s5p:shape", Transform::Shape("PRODUCT", "scanline", "ground_pixel")),
    rule!("s5p:spatial_resolution", Transform::SpatialResolution),
    rule!("co:geolocation_grid_from_band", Transform::Int(Source::Root("geolocation_grid_from_band"))),
    rule!("co:input_band", Transform::InputBands(2)),
    rule!("co:irradiance_accompanied", Transform::Irradiance(&[1])),
];

const HCHO_RULES: &[FieldRule] = &[
    rule!("start_datetime", Transform::TextZ(Source::Root("time_coverage_start"))),
    rule!("end_datetime", Transform::TextZ(Source::Root("time_coverage_end"))),
    rule!("instruments", Transform::TextList(Source::Root("sensor"))),
    rule!("s5p:processing_mode", Transform::Text(Source::Group(EOP_PROCESSING, "eop:processingMode"))),
    rule!("s5p:product_type", Transform::Text(Source::Group(GRANULE_DESCRIPTION, "ProductShortName"))),
    rule!("s5p:shape", Transform::Shape("PRODUCT", "scanline", "ground_pixel")),
    rule!("s5p:spatial_resolution", Transform::SpatialResolution),
    rule!("hcho:geolocation_grid_from_band", Transform::Int(Source::Root("geolocation_grid_from_band"))),
    rule!("hcho:cloud_mode", Transform::Text(Source::Root("cloud_mode"))),
];

const NO2_RULES: &[FieldRule] = &[
    rule!("start_datetime", Transform::Text(Source::Root("time_coverage_start"))),
    rule!("end_datetime", Transform::Text(Source::Root("time_coverage_end"))),
    rule!("instruments", Transform::TextList(Source::Root("sensor"))),
    rule!("s5p:processing_mode", Transform::Text(Source::Group(EOP_PROCESSING, "eop:processingMode"))),
    rule!("s5p:product_type", Transform::Text(Source::Group(GRANULE_DESCRIPTION, "ProductShortName"))),
    rule!("s5p:shape", Transform::Shape("PRODUCT", "scanline", "ground_pixel")),
    rule!("s5p:spatial_resolution", Transform::SpatialResolution),
    rule!("no2:geolocation_grid_from_band", Transform::Int(Source::Root("geolocation_grid_from_band"))),
    rule!("no2:input_band", Transform::InputBands(5)),
    rule!("no2:irradiance_accompanied", Transform::Irradiance(&[1])),
];

const O3_RULES: &[FieldRule] = &[
    rule!("start_datetime", Transform::TextZ(Source::Root("time_coverage_start"))),
    rule!("end_datetime", Transform::TextZ(Source::Root("time_coverage_end"))),
    rule!("instruments", Transform::TextList(Source::Root("sensor"))),
    rule!("s5p:processing_mode", Transform::Text(Source::Group(EOP_PROCESSING, "eop:processingMode"))),
    rule!("s5p:product_type", Transform::Text(Source::Group(GRANULE_DESCRIPTION, "ProductShortName"))),
    rule!("s5p:shape", Transform::Shape("PRODUCT", "scanline", "ground_pixel")),
    rule!("s5p:spatial_resolution", Transform::SpatialResolution),
    rule!("o3:geolocation_grid_from_band", Transform::Int(Source::Root("geolocation_grid_from_band"))),
    rule!("o3:cloud_mode", Transform::Text(Source::Root("cloud_mode"))),
];

const O3_TCL_RULES: &[FieldRule] = &[
    rule!("o3_tcl:shape_ccd", Transform::Shape("PRODUCT", "latitude_ccd", "longitude_ccd")),
    rule!("o3_tcl:shape_csa", Transform::Shape("PRODUCT", "latitude_csa", "longitude_csa")),
    rule!("instruments", Transform::UpperTextList(Source::Group(GRANULE_DESCRIPTION, "InstrumentName"))),
    rule!("s5p:processing_mode", Transform::Text(Source::Group("METADATA", "processingMode"))),
    rule!("s5p:product_type", Transform::Text(Source::Group(GRANULE_DESCRIPTION, "ProductShortName"))),
    rule!("s5p:spatial_resolution", Transform::SpatialResolution),
    rule!("o3_tcl:stratosphere_start_datetime", Transform::TextZ(Source::Root("time_coverage_start"))),
    rule!("o3_tcl:stratosphere_end_datetime", Transform::TextZ(Source::Root("time_coverage_end"))),
    rule!("o3_tcl:troposphere_start_datetime", Transform::TextZ(Source::Root("time_coverage_troposphere_start"))),
    rule!("o3_tcl:troposphere_end_datetime", Transform::TextZ(Source::Root("time_coverage_troposphere_end"))),
    rule!("o3_tcl:input_orbits", Transform::OrbitList(Source::Group("METADATA", "input_orbits"))),
    rule!("o3_tcl:input_files", Transform::FileBasenames(Source::Group("METADATA", "input_files"))),
];

const SO2_RULES: &[FieldRule] = &[
    rule!("start_datetime", Transform::TextZ(Source::Root("time_coverage_start"))),
    rule!("end_datetime", Transform::TextZ(Source::Root("time_coverage_end"))),
    rule!("instruments", Transform::TextList(Source::Root("sensor"))),
    rule!("s5p:processing_mode", Transform::Text(Source::Group(EOP_PROCESSING, "eop:processingMode"))),
    rule!("s5p:product_type", Transform::Text(Source::Group(GRANULE_DESCRIPTION, "ProductShortName"))),
    rule!("s5p:shape", Transform::Shape("PRODUCT", "scanline", "ground_pixel")),
    rule!("s5p:spatial_resolution", Transform::SpatialResolution),
    rule!("so2:geolocation_grid_from_band", Transform::Int(Source::Root("geolocation_grid_from_band"))),
    rule!("so2:cloud_mode", Transform::Text(Source::Root("cloud_mode"))),
];

const NPBD3_RULES: &[FieldRule] = &[
    rule!("start_datetime", Transform::Text(Source::Root("time_coverage_start"))),
    rule!("end_datetime", Transform::Text(Source::Root("time_coverage_end"))),
    rule!("instruments", Transform::TextList(Source::Group(EOP_INSTRUMENT, "eop:shortName"))),
    rule!("s5p:processing_mode", Transform::Text(Source::Group(EOP_PROCESSING, "eop:processingMode"))),
    rule!("s5p:product_type", Transform::Text(Source::Group(GRANULE_DESCRIPTION, "ProductShortName"))),
    rule!("s5p:shape", Transform::Shape("BAND3_NPPC", "scanline", "ground_pixel")),
    rule!("s5p:spatial_resolution", Transform::SpatialResolution),
    rule!("npbd3:analysed_s5p_band", Transform::Int(Source::Group(ALGORITHM_SETTINGS, "S5P_Band_Number"))),
    rule!("npbd3:VIIRS_band", Transform::ViirsBands(Source::Group(ALGORITHM_SETTINGS, "VIIRS_Bands"))),
    rule!("npbd3:number_of_scaled_fov", Transform::Int(Source::Group(ALGORITHM_SETTINGS, "Number_of_scaled_FOV"))),
];

const NPBD6_RULES: &[FieldRule] = &[
    rule!("start_datetime", Transform::Text(Source::Root("time_coverage_start"))),
    rule!("end_datetime", Transform::Text(Source::Root("time_coverage_end"))),
    rule!("instruments", Transform::TextList(Source::Group(EOP_INSTRUMENT, "eop:shortName"))),
    rule!("s5p:processing_mode", Transform::Text(Source::Group(EOP_PROCESSING, "eop:processingMode"))),
    rule!("s5p:product_type", Transform::Text(Source::Group(GRANULE_DESCRIPTION, "ProductShortName"))),
    rule!("s5p:shape", Transform::Shape("BAND6_NPPC", "scanline", "ground_pixel")),
    rule!("s5p:spatial_resolution", Transform::SpatialResolution),
    rule!("npbd6:analysed_s5p_band", Transform::Int(Source::Group(ALGORITHM_SETTINGS, "S5P_Band_Number"))),
    rule!("npbd6:VIIRS_band", Transform::ViirsBands(Source::Group(ALGORITHM_SETTINGS, "VIIRS_Bands"))),
    rule!("npbd6:number_of_scaled_fov", Transform::Int(Source::Group(ALGORITHM_SETTINGS, "Number_of_scaled_FOV"))),
];

const NPBD7_RULES: &[FieldRule] = &[
    rule!("start_datetime", Transform::Text(Source::Root("time_coverage_start"))),
    rule!("end_datetime", Transform::Text(Source::Root("time_coverage_end"))),
    rule!("instruments", Transform::TextList(Source::Group(EOP_INSTRUMENT, "eop:shortName"))),
    rule!("s5p:processing_mode", Transform::Text(Source::Group(EOP_PROCESSING, "eop:processingMode"))),
    rule!("s5p:product_type", Transform::Text(Source::Group(GRANULE_DESCRIPTION, "ProductShortName"))),
    rule!("s5p:shape", Transform::Shape("BAND7_NPPC", "scanline", "ground_pixel")),
    rule!("s5p:spatial_resolution", Transform::SpatialResolution),
    rule!("npbd7:analysed_s5p_band", Transform::Int(Source::Group(ALGORITHM_SETTINGS, "S5P_Band_Number"))),
    rule!("npbd7:VIIRS_band", Transform::ViirsBands(Source::Group(ALGORITHM_SETTINGS, "VIIRS_Bands"))),
    rule!("npbd7:number_of_scaled_fov", Transform::Int(Source::Group(ALGORITHM_SETTINGS, "Number_of_scaled_FOV"))),
];

fn rules(product_type: ProductType) -> &'static [FieldRule] {
    match product_type {
        ProductType::AerAi => AER_AI_RULES,
        ProductType::AerLh => AER_LH_RULES,
        ProductType::Ch4 => CH4_RULES,
        ProductType::Cloud => CLOUD_RULES,
        ProductType::Co => CO_RULES,
        ProductType::Hcho => HCHO_RULES,
        ProductType::No2 => NO2_RULES,
        ProductType::O3 => O3_RULES,
        ProductType::O3Tcl => O3_TCL_RULES,
        ProductType::So2 => SO2_RULES,
        ProductType::Npbd3 => NPBD3_RULES,
        ProductType::Npbd6 => NPBD6_RULES,
        ProductType::Npbd7 => NPBD7_RULES,
    }
}

/// Applies a product type's mapping table to an open attribute store
pub struct PropertyMapper;

impl PropertyMapper {
    /// Extract the normalized property record.
    ///
    /// `after_upgrade` is the recalibration flag from the temporal resolver
    /// and only influences the spatial-resolution value.
    pub fn properties(
        store: &AttributeStore,
        product_type: ProductType,
        after_upgrade: bool,
    ) -> S5pResult<MetadataRecord> {
        let mut record = MetadataRecord::new();
        for rule in rules(product_type) {
            if let Some(value) =
                Self::resolve(store, product_type, after_upgrade, rule.transform)?
            {
                record.insert(rule.key.to_string(), value);
            }
        }
        Ok(record)
    }

    fn resolve(
        store: &AttributeStore,
        product_type: ProductType,
        after_upgrade: bool,
        transform: Transform,
    ) -> S5pResult<Option<Value>> {
        match transform {
            Transform::Text(source) => Ok(Self::text(store, source)?.map(Value::from)),
            Transform::TextZ(source) => {
                Ok(Self::text(store, source)?.map(|s| Value::from(format!("{}Z", s))))
            }
            Transform::Int(source) => {
                let value = source.fetch(store)?;
                if value.is_null() {
                    return Ok(None);
                }
                let number = value
                    .as_i64()
                    .ok_or_else(|| S5pError::MissingAttribute(source.path()))?;
                Ok(Some(Value::from(number)))
            }
            Transform::TextList(source) => {
                Ok(Self::text(store, source)?.map(|s| Value::from(vec![s])))
            }
            Transform::UpperTextList(source) => {
                Ok(Self::text(store, source)?.map(|s| Value::from(vec![s.to_uppercase()])))
            }
            Transform::InputBands(count) => {
                let mut bands = Vec::with_capacity(count as usize);
                for i in 1..=count {
                    let name = format!("input.{}.type", i);
                    match store.group_attr(ALGORITHM_SETTINGS, &name)?.as_string() {
                        Some(band) => bands.push(band),
                        None => return Ok(None),
                    }
                }
                if count == 1 {
                    Ok(Some(Value::from(bands.remove(0))))
                } else {
                    Ok(Some(Value::from(bands)))
                }
            }
            Transform::Irradiance(indices) => {
                let mut values = Vec::with_capacity(indices.len());
                for i in indices {
                    let name = format!("input.{}.irrType", i);
                    match store.group_attr(ALGORITHM_SETTINGS, &name)?.as_string() {
                        Some(value) => values.push(value),
                        None => return Ok(None),
                    }
                }
                if indices.len() == 1 {
                    Ok(Some(Value::from(values.remove(0))))
                } else {
                    Ok(Some(Value::from(values)))
                }
            }
            Transform::ViirsBands(source) => {
                let text = match Self::text(store, source)? {
                    Some(text) => text,
                    None => return Ok(None),
                };
                let mut bands = Vec::new();
                for token in text.split(';') {
                    let token = token.trim();
                    if token.is_empty() {
                        continue;
                    }
                    let band: i64 = token.parse().map_err(|_| {
                        S5pError::MissingAttribute(format!(
                            "{}: non-numeric band `{}`",
                            source.path(),
                            token
                        ))
                    })?;
                    bands.push(band);
                }
                Ok(Some(Value::from(bands)))
            }
            Transform::OrbitList(source) => {
                let text = match Self::text(store, source)? {
                    Some(text) => text,
                    None => return Ok(None),
                };
                let mut orbits = Vec::new();
                for token in text.split_whitespace() {
                    let orbit: i64 = token.parse().map_err(|_| {
                        S5pError::MissingAttribute(format!(
                            "{}: non-numeric orbit `{}`",
                            source.path(),
                            token
                        ))
                    })?;
                    orbits.push(orbit);
                }
                Ok(Some(Value::from(orbits)))
            }
            Transform::FileBasenames(source) => {
                let text = match Self::text(store, source)? {
                    Some(text) => text,
                    None => return Ok(None),
                };
                let names: Vec<String> = text
                    .split_whitespace()
                    .map(|path| {
                        let base = path.rsplit('/').next().unwrap_or(path);
                        base.split('.').next().unwrap_or(base).to_string()
                    })
                    .collect();
                Ok(Some(Value::from(names)))
            }
            Transform::Shape(group, along, across) => {
                let along = store.dimension(group, along)?;
                let across = store.dimension(group, across)?;
                Ok(Some(Value::from(vec![along as i64, across as i64])))
            }
            Transform::SpatialResolution => {
                Self::spatial_resolution(store, product_type, after_upgrade)
            }
        }
    }

    fn text(store: &AttributeStore, source: Source) -> S5pResult<Option<String>> {
        Ok(source.fetch(store)?.as_string())
    }

    /// Resolution reported by the product, corrected for the along-track
    /// upgrade the source attribute does not reflect
    fn spatial_resolution(
        store: &AttributeStore,
        product_type: ProductType,
        after_upgrade: bool,
    ) -> S5pResult<Option<Value>> {
        if product_type.hardcoded_resolution() {
            let resolution = if after_upgrade {
                RESOLUTION_POST_UPGRADE
            } else {
                RESOLUTION_PRE_UPGRADE
            };
            return Ok(Some(Value::from(resolution)));
        }

        let raw = match store.root_attr("spatial_resolution")?.as_string() {
            Some(raw) => raw,
            None => return Ok(None),
        };
        let resolution = if after_upgrade {
            raw.replace(RESOLUTION_OLD_ALONG_TRACK, RESOLUTION_NEW_ALONG_TRACK)
        } else {
            raw
        };
        Ok(Some(Value::from(resolution)))
    }
}
