//! Ground-footprint reconstruction from the product metadata.
//!
//! For almost every product type the footprint is a flat `lat lon lat lon …`
//! coordinate string buried in the EOP metadata group. The combined
//! tropospheric/stratospheric ozone product is the exception: its extent
//! attributes are unreliable, so a fixed equatorial band is used instead.

use crate::core::product_type::ProductType;
use crate::io::attributes::AttributeStore;
use crate::types::{FootprintGeometry, Ring, S5pError, S5pResult};

/// Group holding the footprint coordinate list
pub const FOOTPRINT_GROUP: &str =
    "METADATA/EOP_METADATA/om:featureOfInterest/eop:multiExtentOf/gml:surfaceMembers/gml:exterior";
/// Attribute holding the flat coordinate string
pub const FOOTPRINT_ATTR: &str = "gml:posList";

/// Latitude half-width of the fixed O3_TCL equatorial band
const O3_TCL_LAT: f64 = 19.75;

/// Reconstructs footprint polygons and applies antimeridian correction
pub struct GeometryBuilder;

impl GeometryBuilder {
    /// Footprint geometry for one product granule
    pub fn footprint(
        store: &AttributeStore,
        product_type: ProductType,
    ) -> S5pResult<FootprintGeometry> {
        if product_type == ProductType::O3Tcl {
            return Ok(Self::equatorial_band());
        }

        let pos_list = store
            .group_attr(FOOTPRINT_GROUP, FOOTPRINT_ATTR)
            .map_err(|_| {
                S5pError::GeometryParse(format!(
                    "footprint attribute {}/{} is missing",
                    FOOTPRINT_GROUP, FOOTPRINT_ATTR
                ))
            })?
            .as_string()
            .ok_or_else(|| {
                S5pError::GeometryParse("footprint attribute is not a string".to_string())
            })?;

        Self::from_pos_list(&pos_list)
    }

    /// The fixed pole-free band used for the combined ozone product:
    /// longitude −180..180, latitude −19.75..19.75
    pub fn equatorial_band() -> FootprintGeometry {
        FootprintGeometry::Polygon(vec![
            (-180.0, -O3_TCL_LAT),
            (180.0, -O3_TCL_LAT),
            (180.0, O3_TCL_LAT),
            (-180.0, O3_TCL_LAT),
            (-180.0, -O3_TCL_LAT),
        ])
    }

    /// Parse a flat space/comma-delimited `lat lon lat lon …` string into a
    /// corrected footprint. The source stores latitude first; the output
    /// ring is lon/lat with the winding preserved as read.
    pub fn from_pos_list(text: &str) -> S5pResult<FootprintGeometry> {
        let mut values = Vec::new();
        for token in text.replace(',', " ").split_whitespace() {
            let value: f64 = token.parse().map_err(|_| {
                S5pError::GeometryParse(format!("non-numeric coordinate `{}`", token))
            })?;
            values.push(value);
        }

        if values.is_empty() || values.len() % 2 != 0 {
            return Err(S5pError::GeometryParse(format!(
                "coordinate list has {} values, expected a non-empty even count",
                values.len()
            )));
        }

        let mut ring: Ring = values.chunks_exact(2).map(|pair| (pair[1], pair[0])).collect();
        if ring.first() != ring.last() {
            ring.push(ring[0]);
        }

        Ok(Self::fix_antimeridian(ring))
    }

    /// Split a ring that wraps across the ±180° meridian into parts so no
    /// edge implicitly takes the short way around the globe. A wrap shows up
    /// as a consecutive-vertex longitude jump of more than 180°.
    pub fn fix_antimeridian(ring: Ring) -> FootprintGeometry {
        if !Self::crosses_antimeridian(&ring) {
            return FootprintGeometry::Polygon(ring);
        }

        log::debug!("Footprint crosses the antimeridian, splitting into parts");

        // Shift into continuous 0..360 longitude space, clip at 180, then
        // move the eastern part back into -180..180.
        let shifted: Ring = ring
            .iter()
            .map(|&(lon, lat)| if lon < 0.0 { (lon + 360.0, lat) } else { (lon, lat) })
            .collect();

        let west = Self::clip_at_meridian(&shifted, true);
        let east: Ring = Self::clip_at_meridian(&shifted, false)
            .into_iter()
            .map(|(lon, lat)| (lon - 360.0, lat))
            .collect();

        let mut parts: Vec<Ring> = [west, east]
            .into_iter()
            .filter(|ring| ring.len() >= 4)
            .collect();

        if parts.len() == 1 {
            FootprintGeometry::Polygon(parts.remove(0))
        } else {
            FootprintGeometry::MultiPolygon(parts)
        }
    }

    fn crosses_antimeridian(ring: &Ring) -> bool {
        ring.windows(2)
            .any(|w| (w[1].0 - w[0].0).abs() > 180.0)
    }

    /// Sutherland-Hodgman clip of a closed ring against the lon = 180
    /// half-plane (`keep_west` selects which side survives)
    fn clip_at_meridian(ring: &Ring, keep_west: bool) -> Ring {
        let inside = |lon: f64| if keep_west { lon <= 180.0 } else { lon >= 180.0 };
        let mut out: Ring = Vec::new();

        for window in ring.windows(2) {
            let (lon1, lat1) = window[0];
            let (lon2, lat2) = window[1];
            if inside(lon1) {
                out.push(window[0]);
            }
            if inside(lon1) != inside(lon2) {
                let t = (180.0 - lon1) / (lon2 - lon1);
                out.push((180.0, lat1 + t * (lat2 - lat1)));
            }
        }

        if let Some(&first) = out.first() {
            if out.last() != Some(&first) {
                out.push(first);
            }
        }
        out
    }
}
