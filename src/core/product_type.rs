//! Product-type classification from Sentinel-5P file names.
//!
//! Each of the 13 Level-2 product types exposes a different attribute
//! schema, so everything downstream (geometry strategy, timestamp handling,
//! property mapping, band assets) keys off this closed enum instead of
//! re-testing file-name substrings.

use crate::types::{S5pError, S5pResult};

/// The Sentinel-5P Level-2 product types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductType {
    /// UV aerosol index
    AerAi,
    /// Aerosol layer height
    AerLh,
    /// Methane column
    Ch4,
    /// Cloud parameters
    Cloud,
    /// Carbon monoxide column
    Co,
    /// Formaldehyde column
    Hcho,
    /// Nitrogen dioxide column
    No2,
    /// Total ozone column
    O3,
    /// Tropospheric ozone column (combined stratosphere/troposphere)
    O3Tcl,
    /// Sulphur dioxide column
    So2,
    /// NPP-VIIRS band 3 cloud mask
    Npbd3,
    /// NPP-VIIRS band 6 cloud mask
    Npbd6,
    /// NPP-VIIRS band 7 cloud mask
    Npbd7,
}

/// Classification table: literal substring -> type, tested in this exact
/// order, first match wins. `_O3__` (five-underscore form) must precede
/// `O3_TCL` so the two ozone products never shadow each other.
const CLASSIFICATION: [(&str, ProductType); 13] = [
    ("AER_AI", ProductType::AerAi),
    ("AER_LH", ProductType::AerLh),
    ("_CH4_", ProductType::Ch4),
    ("_CLOUD_", ProductType::Cloud),
    ("_CO_", ProductType::Co),
    ("_HCHO_", ProductType::Hcho),
    ("_NO2_", ProductType::No2),
    ("_O3__", ProductType::O3),
    ("O3_TCL", ProductType::O3Tcl),
    ("_SO2_", ProductType::So2),
    ("_BD3_", ProductType::Npbd3),
    ("_BD6_", ProductType::Npbd6),
    ("_BD7_", ProductType::Npbd7),
];

impl ProductType {
    /// Classify a product from its base file name.
    ///
    /// Exactly one substring matches for any valid product name; an
    /// unmatched name is surfaced as an error rather than an empty mapping.
    pub fn classify(file_name: &str) -> S5pResult<ProductType> {
        for (needle, product_type) in CLASSIFICATION {
            if file_name.contains(needle) {
                log::debug!("Classified {} as {:?}", file_name, product_type);
                return Ok(product_type);
            }
        }
        Err(S5pError::UnclassifiedProductType(file_name.to_string()))
    }

    /// Short namespace prefixing this type's product-specific properties
    pub fn namespace(&self) -> &'static str {
        match self {
            ProductType::AerAi => "aer_ai",
            ProductType::AerLh => "aer_lh",
            ProductType::Ch4 => "ch4",
            ProductType::Cloud => "cloud",
            ProductType::Co => "co",
            ProductType::Hcho => "hcho",
            ProductType::No2 => "no2",
            ProductType::O3 => "o3",
            ProductType::O3Tcl => "o3_tcl",
            ProductType::So2 => "so2",
            ProductType::Npbd3 => "npbd3",
            ProductType::Npbd6 => "npbd6",
            ProductType::Npbd7 => "npbd7",
        }
    }

    /// TROPOMI band numbers backing this product's retrieval, in `eo:bands`
    /// order. Empty for the products whose data asset carries no band list.
    pub fn band_numbers(&self) -> &'static [u8] {
        match self {
            ProductType::AerAi | ProductType::Npbd3 => &[3],
            ProductType::AerLh | ProductType::Npbd6 => &[6],
            ProductType::Ch4 => &[6, 7, 8],
            ProductType::Co => &[7, 8],
            ProductType::No2 => &[4],
            ProductType::Npbd7 => &[7],
            ProductType::Cloud
            | ProductType::Hcho
            | ProductType::O3
            | ProductType::O3Tcl
            | ProductType::So2 => &[],
        }
    }

    /// Whether the spatial resolution is hardcoded by recalibration epoch
    /// instead of read from the `spatial_resolution` attribute. The combined
    /// ozone product and the NPP cloud masks carry no trustworthy value.
    pub fn hardcoded_resolution(&self) -> bool {
        matches!(
            self,
            ProductType::O3Tcl | ProductType::Npbd3 | ProductType::Npbd6 | ProductType::Npbd7
        )
    }

    /// Whether a STAC item for this product carries a band data asset
    /// alongside the manifest asset
    pub fn has_band_asset(&self) -> bool {
        !matches!(
            self,
            ProductType::Cloud
                | ProductType::Hcho
                | ProductType::O3
                | ProductType::O3Tcl
                | ProductType::So2
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifies_all_known_types() {
        let cases = [
            (
                "S5P_OFFL_L2__AER_AI_20200303T013547_20200303T031717_12367_01_010302_20200306T032414.nc",
                ProductType::AerAi,
            ),
            (
                "S5P_OFFL_L2__AER_LH_20200303T013547_20200303T031717_12367_01_010302_20200306T053814.nc",
                ProductType::AerLh,
            ),
            (
                "S5P_OFFL_L2__CH4____20200303T013547_20200303T031717_12367_01_010302_20200306T053811.nc",
                ProductType::Ch4,
            ),
            (
                "S5P_OFFL_L2__CLOUD__20200303T013547_20200303T031717_12367_01_010107_20200306T032410.nc",
                ProductType::Cloud,
            ),
            (
                "S5P_OFFL_L2__CO_____20200303T013547_20200303T031717_12367_01_010302_20200306T032410.nc",
                ProductType::Co,
            ),
            (
                "S5P_OFFL_L2__HCHO___20200303T013547_20200303T031717_12367_01_010107_20200306T053811.nc",
                ProductType::Hcho,
            ),
            (
                "S5P_OFFL_L2__NO2____20200303T013547_20200303T031717_12367_01_010302_20200306T053815.nc",
                ProductType::No2,
            ),
            (
                "S5P_OFFL_L2__O3_____20200303T013547_20200303T031717_12367_01_010107_20200306T053811.nc",
                ProductType::O3,
            ),
            (
                "S5P_OFFL_L2__O3_TCL_20200303T120623_20200309T125304_12373_01_010108_20200316T120353.nc",
                ProductType::O3Tcl,
            ),
            (
                "S5P_OFFL_L2__SO2____20200303T013547_20200303T031717_12367_01_010107_20200306T144427.nc",
                ProductType::So2,
            ),
            (
                "S5P_OFFL_L2__NP_BD3_20200303T013547_20200303T031717_12367_01_010002_20200306T032410.nc",
                ProductType::Npbd3,
            ),
            (
                "S5P_OFFL_L2__NP_BD6_20200303T013547_20200303T031717_12367_01_010002_20200306T032654.nc",
                ProductType::Npbd6,
            ),
            (
                "S5P_OFFL_L2__NP_BD7_20200303T013547_20200303T031717_12367_01_010002_20200306T032925.nc",
                ProductType::Npbd7,
            ),
        ];

        for (name, expected) in cases {
            assert_eq!(ProductType::classify(name).unwrap(), expected, "{}", name);
        }
    }

    #[test]
    fn test_classification_is_unambiguous() {
        // Every valid product name must match exactly one table entry; the
        // two ozone spellings are the near-collision to guard.
        let products = [
            "L2__AER_AI", "L2__AER_LH", "L2__CH4___", "L2__CLOUD_", "L2__CO____",
            "L2__HCHO__", "L2__NO2___", "L2__O3____", "L2__O3_TCL", "L2__SO2___",
            "L2__NP_BD3", "L2__NP_BD6", "L2__NP_BD7",
        ];
        for product in products {
            let name = format!(
                "S5P_OFFL_{}_20200303T013547_20200303T031717_12367_01_010302_20200306T032414.nc",
                product
            );
            let matches: Vec<_> = CLASSIFICATION
                .iter()
                .filter(|(needle, _)| name.contains(needle))
                .collect();
            assert_eq!(matches.len(), 1, "{} matched {:?}", name, matches);
        }
    }

    #[test]
    fn test_unknown_product_is_an_error() {
        let err = ProductType::classify("S5P_OFFL_L1B_RA_BD1_20200303T013547.nc").unwrap_err();
        assert!(matches!(err, S5pError::UnclassifiedProductType(_)));
    }
}
