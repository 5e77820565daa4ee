//! Mission-wide constant tables for Sentinel-5P / TROPOMI products.
//!
//! Everything in here is fixed, read-only configuration: band definitions,
//! provider and license facts, and the instrument recalibration epoch that
//! drives the spatial-resolution correction.

use chrono::{NaiveDate, NaiveDateTime};

/// Fixed prefix every Sentinel-5P product name must carry
pub const MISSION_PREFIX: &str = "S5P";

pub const SENTINEL_CONSTELLATION: &str = "Sentinel-5P";

/// The single instrument flown on Sentinel-5P
pub const SENTINEL_INSTRUMENTS: [&str; 1] = ["TROPOMI"];

/// COSPAR designator of the platform
pub const INTERNATIONAL_DESIGNATOR: &str = "2017-064A";

pub const SENTINEL_PROVIDER_NAME: &str = "ESA";
pub const SENTINEL_PROVIDER_URL: &str = "https://earth.esa.int/web/guest/home";
pub const SENTINEL_PROVIDER_ROLES: [&str; 3] = ["producer", "processor", "licensor"];

pub const SENTINEL_LICENSE_URL: &str =
    "https://sentinel.esa.int/documents/247904/690755/Sentinel_Data_Legal_Notice";

pub const SAFE_MANIFEST_ASSET_KEY: &str = "safe-manifest";

pub const NETCDF_MEDIA_TYPE: &str = "application/x-netcdf";
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// All Level-2 products are delivered on the WGS84 geographic grid
pub const EPSG: i32 = 4326;

/// Ground-pixel resolution strings before and after the along-track
/// resolution upgrade of 2019-08-06. The source `spatial_resolution`
/// attribute was not updated for every product type, so post-upgrade values
/// still reading `7x...` are rewritten.
pub const RESOLUTION_PRE_UPGRADE: &str = "7x3.5km2";
pub const RESOLUTION_POST_UPGRADE: &str = "5.5x3.5km2";
pub const RESOLUTION_OLD_ALONG_TRACK: &str = "7x";
pub const RESOLUTION_NEW_ALONG_TRACK: &str = "5.5x";

/// Instant of the along-track resolution upgrade (compared without timezone
/// conversion, matching the product timestamps)
pub fn upgrade_datetime() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2019, 8, 6)
        .and_then(|d| d.and_hms_opt(13, 30, 0))
        .expect("fixed calendar instant")
}

/// One TROPOMI spectral band, in the `eo:bands` vocabulary
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TropomiBand {
    pub name: &'static str,
    pub description: &'static str,
    /// Band center in micrometers
    pub center_wavelength: f64,
    /// Full width at half maximum in micrometers
    pub full_width_half_max: f64,
}

/// The eight TROPOMI detector bands (UV, UVIS, NIR, SWIR)
pub const TROPOMI_BANDS: [TropomiBand; 8] = [
    TropomiBand {
        name: "Band 1",
        description: "Ultraviolet detector",
        center_wavelength: 0.2835,
        full_width_half_max: 0.033,
    },
    TropomiBand {
        name: "Band 2",
        description: "Ultraviolet detector",
        center_wavelength: 0.316,
        full_width_half_max: 0.032,
    },
    TropomiBand {
        name: "Band 3",
        description: "Ultraviolet-visible detector",
        center_wavelength: 0.3625,
        full_width_half_max: 0.085,
    },
    TropomiBand {
        name: "Band 4",
        description: "Ultraviolet-visible detector",
        center_wavelength: 0.4525,
        full_width_half_max: 0.095,
    },
    TropomiBand {
        name: "Band 5",
        description: "Near-infrared detector",
        center_wavelength: 0.7,
        full_width_half_max: 0.05,
    },
    TropomiBand {
        name: "Band 6",
        description: "Near-infrared detector",
        center_wavelength: 0.75,
        full_width_half_max: 0.05,
    },
    TropomiBand {
        name: "Band 7",
        description: "Shortwave-infrared detector",
        center_wavelength: 2.325,
        full_width_half_max: 0.04,
    },
    TropomiBand {
        name: "Band 8",
        description: "Shortwave-infrared detector",
        center_wavelength: 2.365,
        full_width_half_max: 0.04,
    },
];

/// Look up a TROPOMI band by its 1-based number
pub fn tropomi_band(number: u8) -> Option<&'static TropomiBand> {
    match number {
        1..=8 => Some(&TROPOMI_BANDS[(number - 1) as usize]),
        _ => None,
    }
}
