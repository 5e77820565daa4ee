use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// A single lon/lat vertex of a footprint ring
pub type Coordinate = (f64, f64);

/// An ordered ring of lon/lat vertices (first vertex repeated at the end)
pub type Ring = Vec<Coordinate>;

/// Normalized product properties keyed by namespaced name (e.g. `s5p:product_type`)
pub type MetadataRecord = Map<String, Value>;

/// Sentinel-5P processing modes encoded in the product name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingMode {
    /// Near-real-time (~3 hours latency)
    Nrti,
    /// Offline (days latency, consolidated orbits)
    Offl,
    /// Reprocessed archive
    Rpro,
}

impl std::fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingMode::Nrti => write!(f, "NRTI"),
            ProcessingMode::Offl => write!(f, "OFFL"),
            ProcessingMode::Rpro => write!(f, "RPRO"),
        }
    }
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Planar bounds of a set of rings
    pub fn of_rings<'a, I: IntoIterator<Item = &'a Ring>>(rings: I) -> Self {
        let mut bbox = BoundingBox {
            min_lon: f64::INFINITY,
            min_lat: f64::INFINITY,
            max_lon: f64::NEG_INFINITY,
            max_lat: f64::NEG_INFINITY,
        };
        for ring in rings {
            for &(lon, lat) in ring {
                bbox.min_lon = bbox.min_lon.min(lon);
                bbox.min_lat = bbox.min_lat.min(lat);
                bbox.max_lon = bbox.max_lon.max(lon);
                bbox.max_lat = bbox.max_lat.max(lat);
            }
        }
        bbox
    }

    /// Bounding box as the STAC `[min_lon, min_lat, max_lon, max_lat]` array
    pub fn to_vec(&self) -> Vec<f64> {
        vec![self.min_lon, self.min_lat, self.max_lon, self.max_lat]
    }
}

/// Ground footprint of one product granule, after antimeridian correction
#[derive(Debug, Clone, PartialEq)]
pub enum FootprintGeometry {
    /// A single exterior ring
    Polygon(Ring),
    /// Split parts of a ring that wrapped across the ±180° meridian
    MultiPolygon(Vec<Ring>),
}

impl FootprintGeometry {
    /// All exterior rings of the geometry
    pub fn rings(&self) -> &[Ring] {
        match self {
            FootprintGeometry::Polygon(ring) => std::slice::from_ref(ring),
            FootprintGeometry::MultiPolygon(rings) => rings,
        }
    }

    /// Planar bounds of the geometry
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::of_rings(self.rings())
    }

    /// GeoJSON geometry document
    pub fn to_geojson(&self) -> Value {
        fn ring_coords(ring: &Ring) -> Vec<Vec<f64>> {
            ring.iter().map(|&(lon, lat)| vec![lon, lat]).collect()
        }
        match self {
            FootprintGeometry::Polygon(ring) => json!({
                "type": "Polygon",
                "coordinates": [ring_coords(ring)],
            }),
            FootprintGeometry::MultiPolygon(rings) => json!({
                "type": "MultiPolygon",
                "coordinates": rings.iter().map(|r| vec![ring_coords(r)]).collect::<Vec<_>>(),
            }),
        }
    }
}

/// Sensing window of one granule with its derived center instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalExtent {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// `start + (end - start) / 2`, exact to the half second
    pub center: NaiveDateTime,
}

/// Error types for Sentinel-5P metadata extraction
#[derive(Debug, thiserror::Error)]
pub enum S5pError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("netCDF error: {0}")]
    Netcdf(#[from] netcdf::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported source file format: {0}")]
    UnsupportedFormat(String),

    #[error("missing attribute `{0}` in product metadata tree")]
    MissingAttribute(String),

    #[error("cannot parse footprint geometry: {0}")]
    GeometryParse(String),

    #[error("unsupported timestamp format: `{0}` is neither 19 nor 20 characters")]
    UnsupportedTimeFormat(String),

    #[error("file name `{0}` matches no known Sentinel-5P product type")]
    UnclassifiedProductType(String),

    #[error("naming convention violation: {0}")]
    NamingConvention(String),
}

/// Result type for extraction operations
pub type S5pResult<T> = Result<T, S5pError>;
