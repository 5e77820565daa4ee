//! Product identity derived from the Sentinel-5P file naming convention.
//!
//! `S5P_<mode>_<product>_<start>_<end>_<orbit>_<collection>_<processor>_<production>`
//! with fixed, underscore-delimited field widths. The validated stem doubles
//! as the STAC item id.

use crate::constants::MISSION_PREFIX;
use crate::types::{ProcessingMode, S5pError, S5pResult};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

fn product_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^S5P_(?P<mode>[A-Z]{4})_(?P<product>[0-9A-Z_]{10})_(?P<start>\d{8}T\d{6})_(?P<end>\d{8}T\d{6})_(?P<orbit>\d{5})_(?P<collection>\d{2})_(?P<processor>\d{6})_(?P<production>\d{8}T\d{6})$",
        )
        .expect("fixed naming grammar")
    })
}

/// Validated identity of one product granule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductIdentity {
    scene_id: String,
    pub mode: ProcessingMode,
    /// The 10-char product field, e.g. `L2__AER_AI`
    pub product_field: String,
    /// Sensing start/stop in compact `yyyymmddThhmmss` form
    pub start: String,
    pub end: String,
    pub orbit_number: u32,
    pub collection: String,
    pub processor_version: String,
    pub production: String,
}

impl ProductIdentity {
    /// Derive and validate the identity from a product file path.
    ///
    /// Runs before any attribute access, so a misnamed file fails without
    /// the attribute tree ever being opened.
    pub fn from_path<P: AsRef<Path>>(path: P) -> S5pResult<Self> {
        let path = path.as_ref();
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                S5pError::NamingConvention(format!("{}: no base file name", path.display()))
            })?;

        if !stem.starts_with(MISSION_PREFIX) {
            return Err(S5pError::NamingConvention(format!(
                "`{}` does not follow the Sentinel-5P naming convention (expected a `{}` prefix)",
                stem, MISSION_PREFIX
            )));
        }

        let captures = product_name_regex().captures(stem).ok_or_else(|| {
            S5pError::NamingConvention(format!(
                "`{}` does not match the Sentinel-5P product name grammar",
                stem
            ))
        })?;

        let mode = match &captures["mode"] {
            "NRTI" => ProcessingMode::Nrti,
            "OFFL" => ProcessingMode::Offl,
            "RPRO" => ProcessingMode::Rpro,
            other => {
                return Err(S5pError::NamingConvention(format!(
                    "`{}`: unknown processing mode `{}`",
                    stem, other
                )))
            }
        };

        let orbit_number = captures["orbit"].parse().map_err(|_| {
            S5pError::NamingConvention(format!("`{}`: orbit field is not numeric", stem))
        })?;

        Ok(Self {
            scene_id: stem.to_string(),
            mode,
            product_field: captures["product"].to_string(),
            start: captures["start"].to_string(),
            end: captures["end"].to_string(),
            orbit_number,
            collection: captures["collection"].to_string(),
            processor_version: captures["processor"].to_string(),
            production: captures["production"].to_string(),
        })
    }

    /// The validated file stem, used as the STAC item id
    pub fn scene_id(&self) -> &str {
        &self.scene_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AER_AI: &str =
        "S5P_OFFL_L2__AER_AI_20200303T013547_20200303T031717_12367_01_010302_20200306T032414";

    #[test]
    fn test_parses_valid_name() {
        let identity = ProductIdentity::from_path(format!("/data/{}.nc", AER_AI)).unwrap();
        assert_eq!(identity.scene_id(), AER_AI);
        assert_eq!(identity.mode, ProcessingMode::Offl);
        assert_eq!(identity.product_field, "L2__AER_AI");
        assert_eq!(identity.orbit_number, 12367);
        assert_eq!(identity.collection, "01");
        assert_eq!(identity.processor_version, "010302");
        assert_eq!(identity.start, "20200303T013547");
        assert_eq!(identity.production, "20200306T032414");
    }

    #[test]
    fn test_json_mirror_shares_the_scene_id() {
        let identity = ProductIdentity::from_path(format!("{}.json", AER_AI)).unwrap();
        assert_eq!(identity.scene_id(), AER_AI);
    }

    #[test]
    fn test_wrong_mission_prefix_fails() {
        let err = ProductIdentity::from_path(
            "S1A_IW_SLC__1SDV_20200103T170815_20200103T170842_030639_0382D5_DADE.zip",
        )
        .unwrap_err();
        assert!(matches!(err, S5pError::NamingConvention(_)));
    }

    #[test]
    fn test_truncated_name_fails_grammar() {
        let err = ProductIdentity::from_path("S5P_OFFL_L2__AER_AI.nc").unwrap_err();
        assert!(matches!(err, S5pError::NamingConvention(_)));
    }
}
