//! Uniform read-only access to a product's attribute tree.
//!
//! Sentinel-5P granules ship as netCDF4 files, but pipelines frequently work
//! from a pre-exported JSON mirror of the same attribute tree. Both encodings
//! answer the same logical queries (root attribute, group attribute,
//! dimension length) behind one interface, so the extraction layers never
//! branch on the physical format.

use crate::types::{S5pError, S5pResult};
use serde_json::Value;
use std::path::Path;
use std::sync::Once;

/// A scalar attribute value read from either encoding.
///
/// NetCDF numeric widths are widened to `i64`/`f64`; an explicit JSON `null`
/// becomes [`AttrValue::Null`], which downstream mapping drops from the
/// final record.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Str(String),
    Int(i64),
    Float(f64),
    Null,
}

impl AttrValue {
    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }

    /// String form of the value, coercing numbers the way the products'
    /// metadata conventions expect (`orbit = 12367` and `orbit = "12367"`
    /// are interchangeable in the wild)
    pub fn as_string(&self) -> Option<String> {
        match self {
            AttrValue::Str(s) => Some(s.clone()),
            AttrValue::Int(v) => Some(v.to_string()),
            AttrValue::Float(v) => Some(v.to_string()),
            AttrValue::Null => None,
        }
    }

    /// Integer form of the value, parsing numeric strings
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttrValue::Int(v) => Some(*v),
            AttrValue::Float(v) => Some(*v as i64),
            AttrValue::Str(s) => s.trim().parse().ok(),
            AttrValue::Null => None,
        }
    }
}

/// The capability surface both physical encodings implement
trait AttributeSource {
    fn root_attr(&self, name: &str) -> S5pResult<AttrValue>;
    fn group_attr(&self, group_path: &str, name: &str) -> S5pResult<AttrValue>;
    fn dimension(&self, group_path: &str, name: &str) -> S5pResult<usize>;
}

/// Read-only accessor over one product file's attribute tree.
///
/// Opened once per extraction call and released with it; nothing is cached
/// across files.
pub struct AttributeStore {
    source: Box<dyn AttributeSource>,
}

impl AttributeStore {
    /// Open a product file. `.nc` selects the native netCDF encoding,
    /// `.json` the mirror; anything else is unsupported.
    pub fn open<P: AsRef<Path>>(path: P) -> S5pResult<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        let source: Box<dyn AttributeSource> = match extension {
            "nc" => Box::new(NetcdfSource::open(path)?),
            "json" => Box::new(JsonSource::open(path)?),
            _ => {
                return Err(S5pError::UnsupportedFormat(format!(
                    "{}: expected a .nc or .json product file",
                    path.display()
                )))
            }
        };

        log::debug!("Opened attribute store for {}", path.display());
        Ok(Self { source })
    }

    /// Global (root-level) attribute
    pub fn root_attr(&self, name: &str) -> S5pResult<AttrValue> {
        self.source.root_attr(name)
    }

    /// Attribute of a nested group addressed by a slash-joined path
    pub fn group_attr(&self, group_path: &str, name: &str) -> S5pResult<AttrValue> {
        self.source.group_attr(group_path, name)
    }

    /// Length of a named dimension inside a group
    pub fn dimension(&self, group_path: &str, name: &str) -> S5pResult<usize> {
        self.source.dimension(group_path, name)
    }
}

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints diagnostics to stderr even when a missing
/// attribute is handled gracefully on the Rust side. Safe to call more than
/// once; only the first call has an effect.
fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 with null handlers is the documented way to
        // disable automatic error reporting.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Native netCDF4 encoding
struct NetcdfSource {
    file: netcdf::File,
}

impl NetcdfSource {
    fn open(path: &Path) -> S5pResult<Self> {
        silence_hdf5_errors();
        let file = netcdf::open(path)?;
        Ok(Self { file })
    }

    fn convert(value: netcdf::AttributeValue) -> AttrValue {
        use netcdf::AttributeValue as V;
        match value {
            V::Str(s) => AttrValue::Str(s),
            V::Strs(mut v) if v.len() == 1 => AttrValue::Str(v.remove(0)),
            V::Double(x) => AttrValue::Float(x),
            V::Float(x) => AttrValue::Float(x as f64),
            V::Longlong(x) => AttrValue::Int(x),
            V::Ulonglong(x) => AttrValue::Int(x as i64),
            V::Int(x) => AttrValue::Int(x as i64),
            V::Uint(x) => AttrValue::Int(x as i64),
            V::Short(x) => AttrValue::Int(x as i64),
            V::Ushort(x) => AttrValue::Int(x as i64),
            V::Schar(x) => AttrValue::Int(x as i64),
            V::Uchar(x) => AttrValue::Int(x as i64),
            _ => AttrValue::Null,
        }
    }

    /// Walk a slash-joined group path from the root, then apply `f` to the
    /// innermost group
    fn with_group<T>(
        &self,
        group_path: &str,
        f: impl FnOnce(&netcdf::Group) -> Option<T>,
    ) -> S5pResult<Option<T>> {
        let mut segments = group_path.split('/');
        let first = match segments.next() {
            Some(s) => s,
            None => return Ok(None),
        };
        let mut group = match self.file.group(first)? {
            Some(g) => g,
            None => return Ok(None),
        };
        for segment in segments {
            group = match group.group(segment) {
                Some(g) => g,
                None => return Ok(None),
            };
        }
        Ok(f(&group))
    }
}

impl AttributeSource for NetcdfSource {
    fn root_attr(&self, name: &str) -> S5pResult<AttrValue> {
        let attr = self
            .file
            .attribute(name)
            .ok_or_else(|| S5pError::MissingAttribute(name.to_string()))?;
        Ok(Self::convert(attr.value()?))
    }

    fn group_attr(&self, group_path: &str, name: &str) -> S5pResult<AttrValue> {
        let value = self
            .with_group(group_path, |group| {
                group.attribute(name).map(|attr| attr.value())
            })?
            .ok_or_else(|| S5pError::MissingAttribute(format!("{}/{}", group_path, name)))?;
        Ok(Self::convert(value?))
    }

    fn dimension(&self, group_path: &str, name: &str) -> S5pResult<usize> {
        self.with_group(group_path, |group| {
            group.dimension(name).map(|dim| dim.len())
        })?
        .ok_or_else(|| S5pError::MissingAttribute(format!("{}/{}", group_path, name)))
    }
}

/// JSON mirror encoding: root attributes are top-level keys, groups are
/// nested objects, dimension lengths live under a `dimensions` object inside
/// the owning group
struct JsonSource {
    root: Value,
}

impl JsonSource {
    fn open(path: &Path) -> S5pResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let root: Value = serde_json::from_str(&content)?;
        Ok(Self { root })
    }

    fn convert(value: &Value) -> AttrValue {
        match value {
            Value::String(s) => AttrValue::Str(s.clone()),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    AttrValue::Int(i)
                } else {
                    AttrValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            _ => AttrValue::Null,
        }
    }

    fn group(&self, group_path: &str) -> Option<&Value> {
        let mut node = &self.root;
        for segment in group_path.split('/') {
            node = node.get(segment)?;
        }
        Some(node)
    }
}

impl AttributeSource for JsonSource {
    fn root_attr(&self, name: &str) -> S5pResult<AttrValue> {
        let value = self
            .root
            .get(name)
            .ok_or_else(|| S5pError::MissingAttribute(name.to_string()))?;
        Ok(Self::convert(value))
    }

    fn group_attr(&self, group_path: &str, name: &str) -> S5pResult<AttrValue> {
        let value = self
            .group(group_path)
            .and_then(|group| group.get(name))
            .ok_or_else(|| S5pError::MissingAttribute(format!("{}/{}", group_path, name)))?;
        Ok(Self::convert(value))
    }

    fn dimension(&self, group_path: &str, name: &str) -> S5pResult<usize> {
        self.group(group_path)
            .and_then(|group| group.get("dimensions"))
            .and_then(|dims| dims.get(name))
            .and_then(|v| v.as_u64())
            .map(|v| v as usize)
            .ok_or_else(|| S5pError::MissingAttribute(format!("{}/{}", group_path, name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn mirror_store(content: &str) -> AttributeStore {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("granule.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        AttributeStore::open(&path).unwrap()
    }

    #[test]
    fn test_unsupported_extension_rejected() {
        let err = AttributeStore::open("granule.h5").unwrap_err();
        assert!(matches!(err, S5pError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_json_mirror_lookup() {
        let store = mirror_store(
            r#"{
                "orbit": 12367,
                "sensor": "TROPOMI",
                "METADATA": {
                    "GRANULE_DESCRIPTION": { "ProductShortName": "L2__AER_AI" },
                    "processingMode": "OFFL"
                },
                "PRODUCT": { "dimensions": { "scanline": 4172, "ground_pixel": 450 } }
            }"#,
        );

        assert_eq!(
            store.root_attr("sensor").unwrap(),
            AttrValue::Str("TROPOMI".to_string())
        );
        assert_eq!(store.root_attr("orbit").unwrap().as_i64(), Some(12367));
        assert_eq!(
            store
                .group_attr("METADATA/GRANULE_DESCRIPTION", "ProductShortName")
                .unwrap()
                .as_string()
                .unwrap(),
            "L2__AER_AI"
        );
        assert_eq!(store.dimension("PRODUCT", "scanline").unwrap(), 4172);
    }

    #[test]
    fn test_json_mirror_missing_attribute() {
        let store = mirror_store(r#"{"sensor": "TROPOMI"}"#);
        let err = store
            .group_attr("METADATA/GRANULE_DESCRIPTION", "ProductShortName")
            .unwrap_err();
        assert!(matches!(err, S5pError::MissingAttribute(_)));
    }

    #[test]
    fn test_json_null_is_preserved_as_null() {
        let store = mirror_store(r#"{"cloud_mode": null}"#);
        assert!(store.root_attr("cloud_mode").unwrap().is_null());
    }

    #[test]
    fn test_numeric_string_coercion() {
        assert_eq!(AttrValue::Str("12367".to_string()).as_i64(), Some(12367));
        assert_eq!(AttrValue::Int(3).as_string().unwrap(), "3");
        assert_eq!(AttrValue::Null.as_string(), None);
    }
}
