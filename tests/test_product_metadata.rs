use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;
use tropostac::core::ProductMetadata;
use tropostac::types::{FootprintGeometry, S5pError};

const AER_AI_NAME: &str =
    "S5P_OFFL_L2__AER_AI_20200303T013547_20200303T031717_12367_01_010302_20200306T032414";
const O3_TCL_NAME: &str =
    "S5P_OFFL_L2__O3_TCL_20200303T120623_20200309T125304_12373_01_010108_20200316T120353";

fn write_fixture(dir: &TempDir, name: &str, tree: &Value) -> PathBuf {
    let path = dir.path().join(format!("{}.json", name));
    std::fs::write(&path, tree.to_string()).expect("failed to write fixture");
    path
}

/// JSON mirror of an AER_AI granule, matching the attribute tree of the real
/// product down to the paths the extraction reads.
fn aer_ai_tree() -> Value {
    json!({
        "time_coverage_start": "2020-03-03T01:35:47Z",
        "time_coverage_end": "2020-03-03T03:17:20Z",
        "sensor": "TROPOMI",
        "orbit": 12367,
        "spatial_resolution": "7x3.5km2",
        "geolocation_grid_from_band": 3,
        "title": "TROPOMI/S5P Aerosol Index 1-Orbit L2 Swath 7x3.5km",
        "METADATA": {
            "GRANULE_DESCRIPTION": { "ProductShortName": "L2__AER_AI" },
            "ISO_METADATA": {
                "gmi:acquisitionInformation": {
                    "gmi:platform": { "gmi:description": "Sentinel 5 precursor" }
                }
            },
            "EOP_METADATA": {
                "eop:metaDataProperty": {
                    "eop:processing": { "eop:processingMode": "OFFL" }
                },
                "om:featureOfInterest": {
                    "eop:multiExtentOf": {
                        "gml:surfaceMembers": {
                            "gml:exterior": {
                                "gml:posList": "0.0 10.0 0.0 20.0 5.0 20.0 5.0 10.0 0.0 10.0"
                            }
                        }
                    }
                }
            },
            "ALGORITHM_SETTINGS": {
                "input.1.type": "L1B_RA_BD3",
                "input.1.irrType": "L1B_IR_UVN"
            }
        },
        "PRODUCT": { "dimensions": { "scanline": 4172, "ground_pixel": 450 } }
    })
}

fn o3_tcl_tree() -> Value {
    json!({
        "time_coverage_start": "2020-03-03T12:06:23",
        "time_coverage_end": "2020-03-09T12:53:04",
        "time_coverage_troposphere_start": "2020-03-03T12:06:23",
        "time_coverage_troposphere_end": "2020-03-07T12:00:00",
        "METADATA": {
            "processingMode": "OFFL",
            "input_orbits": "12373 12374 12375",
            "input_files": "/data/S5P_OFFL_L2__O3_____a.nc /data/S5P_OFFL_L2__O3_____b.nc",
            "GRANULE_DESCRIPTION": {
                "ProductShortName": "L2__O3_TCL",
                "InstrumentName": "Tropomi",
                "MissionName": "Sentinel-5 precursor"
            },
            // Extent attributes are present but known-unreliable; the
            // extraction must never read them for this product type.
            "EOP_METADATA": {
                "om:featureOfInterest": {
                    "eop:multiExtentOf": {
                        "gml:surfaceMembers": {
                            "gml:exterior": { "gml:posList": "0.0 0.0 0.0 1.0 1.0 1.0" }
                        }
                    }
                }
            }
        },
        "PRODUCT": {
            "dimensions": {
                "latitude_ccd": 80,
                "longitude_ccd": 360,
                "latitude_csa": 8,
                "longitude_csa": 18
            }
        }
    })
}

#[test]
fn test_aer_ai_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, AER_AI_NAME, &aer_ai_tree());

    let metadata = ProductMetadata::open(&path).unwrap();
    assert_eq!(metadata.scene_id(), AER_AI_NAME);

    let properties = metadata.properties().unwrap();
    assert_eq!(properties["aer_ai:input_band"], "L1B_RA_BD3");
    assert_eq!(properties["aer_ai:irradiance_accompanied"], "L1B_IR_UVN");
    assert_eq!(properties["s5p:processing_mode"], "OFFL");
    assert_eq!(properties["s5p:product_type"], "L2__AER_AI");
    assert_eq!(properties["s5p:shape"], json!([4172, 450]));
    assert_eq!(properties["instruments"], json!(["TROPOMI"]));
    assert_eq!(properties["aer_ai:geolocation_grid_from_band"], 3);
    assert_eq!(properties["start_datetime"], "2020-03-03T01:35:47Z");
    assert_eq!(properties["end_datetime"], "2020-03-03T03:17:20Z");
    // Sensed after the 2019-08-06 upgrade: the stale attribute is corrected.
    assert_eq!(properties["s5p:spatial_resolution"], "5.5x3.5km2");

    assert_eq!(
        metadata
            .datetime()
            .format("%Y-%m-%dT%H:%M:%S%.f")
            .to_string(),
        "2020-03-03T02:26:33.500"
    );
    assert_eq!(metadata.platform().unwrap(), "Sentinel 5 precursor");
    assert_eq!(metadata.absolute_orbit().unwrap(), Some(12367));
    assert_eq!(
        metadata.title().unwrap(),
        "TROPOMI/S5P Aerosol Index 1-Orbit L2 Swath 7x3.5km"
    );
}

#[test]
fn test_bbox_matches_footprint_bounds() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, AER_AI_NAME, &aer_ai_tree());

    let metadata = ProductMetadata::open(&path).unwrap();
    let bbox = metadata.bbox();
    assert_eq!(bbox, metadata.geometry().bounds());
    assert_eq!(bbox.to_vec(), vec![10.0, 0.0, 20.0, 5.0]);
}

#[test]
fn test_o3_tcl_uses_the_fixed_band_polygon() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, O3_TCL_NAME, &o3_tcl_tree());

    let metadata = ProductMetadata::open(&path).unwrap();
    assert_eq!(
        metadata.bbox().to_vec(),
        vec![-180.0, -19.75, 180.0, 19.75]
    );
    assert!(matches!(
        metadata.geometry(),
        FootprintGeometry::Polygon(_)
    ));

    let properties = metadata.properties().unwrap();
    assert_eq!(properties["o3_tcl:shape_ccd"], json!([80, 360]));
    assert_eq!(properties["o3_tcl:shape_csa"], json!([8, 18]));
    assert_eq!(properties["instruments"], json!(["TROPOMI"]));
    assert_eq!(properties["s5p:processing_mode"], "OFFL");
    assert_eq!(
        properties["o3_tcl:input_orbits"],
        json!([12373, 12374, 12375])
    );
    assert_eq!(
        properties["o3_tcl:input_files"],
        json!(["S5P_OFFL_L2__O3_____a", "S5P_OFFL_L2__O3_____b"])
    );
    assert_eq!(
        properties["o3_tcl:stratosphere_start_datetime"],
        "2020-03-03T12:06:23Z"
    );
    assert_eq!(
        properties["o3_tcl:troposphere_end_datetime"],
        "2020-03-07T12:00:00Z"
    );

    // Aggregated product: no single absolute orbit.
    assert_eq!(metadata.absolute_orbit().unwrap(), None);
    assert_eq!(metadata.platform().unwrap(), "Sentinel-5 precursor");
    assert!(metadata.troposphere_extent().is_some());
}

#[test]
fn test_resolution_attribute_kept_before_upgrade() {
    let dir = tempfile::tempdir().unwrap();
    let name =
        "S5P_OFFL_L2__AER_AI_20190101T013547_20190101T031717_06243_01_010302_20190104T032414";
    let mut tree = aer_ai_tree();
    tree["time_coverage_start"] = json!("2019-01-01T01:35:47Z");
    tree["time_coverage_end"] = json!("2019-01-01T03:17:17Z");
    let path = write_fixture(&dir, name, &tree);

    let metadata = ProductMetadata::open(&path).unwrap();
    assert!(!metadata.is_after_upgrade());
    let properties = metadata.properties().unwrap();
    assert_eq!(properties["s5p:spatial_resolution"], "7x3.5km2");
}

#[test]
fn test_null_valued_property_is_omitted() {
    let dir = tempfile::tempdir().unwrap();
    let mut tree = aer_ai_tree();
    tree["spatial_resolution"] = Value::Null;
    let path = write_fixture(&dir, AER_AI_NAME, &tree);

    let properties = ProductMetadata::open(&path).unwrap().properties().unwrap();
    assert!(!properties.contains_key("s5p:spatial_resolution"));
    assert!(properties.contains_key("s5p:product_type"));
}

#[test]
fn test_missing_footprint_is_a_geometry_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut tree = aer_ai_tree();
    tree["METADATA"]["EOP_METADATA"]
        .as_object_mut()
        .unwrap()
        .remove("om:featureOfInterest");
    let path = write_fixture(&dir, AER_AI_NAME, &tree);

    let err = ProductMetadata::open(&path).unwrap_err();
    assert!(matches!(err, S5pError::GeometryParse(_)));
}

#[test]
fn test_malformed_timestamp_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut tree = aer_ai_tree();
    tree["time_coverage_start"] = json!("2020-03-03T01:35:47.123456Z");
    let path = write_fixture(&dir, AER_AI_NAME, &tree);

    let err = ProductMetadata::open(&path).unwrap_err();
    assert!(matches!(err, S5pError::UnsupportedTimeFormat(_)));
}

#[test]
fn test_wrong_mission_prefix_fails_before_any_read() {
    // The path does not exist; identity validation must reject it before
    // the attribute tree is ever opened.
    let err = ProductMetadata::open("/nonexistent/SENTINEL3_thing.nc").unwrap_err();
    assert!(matches!(err, S5pError::NamingConvention(_)));
}

#[test]
fn test_unclassifiable_product_is_an_error() {
    let err = ProductMetadata::open(
        "/nonexistent/S5P_OFFL_L1B_RA_BD1_20200303T013547_20200303T031717_12367_01_010302_20200306T032414.nc",
    )
    .unwrap_err();
    assert!(matches!(err, S5pError::UnclassifiedProductType(_)));
}

#[test]
fn test_unsupported_extension_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(format!("{}.txt", AER_AI_NAME));
    std::fs::write(&path, "not a product").unwrap();

    let err = ProductMetadata::open(&path).unwrap_err();
    assert!(matches!(err, S5pError::UnsupportedFormat(_)));
}
