//! Spatial data backend: the interface the spatial commands call, plus a
//! file-level local binding.

pub mod local;
pub mod shapefile;

use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub use local::LocalBackend;

/// Extension → driver name table.
#[derive(Debug, Clone)]
pub struct Drivers {
    by_ext: HashMap<String, String>,
}

impl Drivers {
    pub fn builtin() -> Self {
        let by_ext = [
            ("shp", "ESRI Shapefile"),
            ("gpkg", "GPKG"),
            ("json", "GeoJSON"),
            ("geojson", "GeoJSON"),
        ]
        .into_iter()
        .map(|(ext, name)| (ext.to_string(), name.to_string()))
        .collect();
        Self { by_ext }
    }

    /// Adds or overrides entries; extensions are matched case-insensitively.
    pub fn extend(&mut self, extra: &HashMap<String, String>) {
        for (ext, name) in extra {
            self.by_ext.insert(ext.trim_start_matches('.').to_lowercase(), name.clone());
        }
    }

    pub fn for_path(&self, path: &Path) -> Option<&str> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        self.by_ext.get(&ext).map(String::as_str)
    }
}

impl Default for Drivers {
    fn default() -> Self {
        Self::builtin()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataSource {
    pub path: PathBuf,
    pub driver: String,
    pub layers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub type_name: String,
    pub width: u32,
    pub precision: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerInfo {
    pub name: String,
    pub feature_count: Option<u64>,
    /// (min x, max x, min y, max y)
    pub extent: Option<(f64, f64, f64, f64)>,
    pub fields: Vec<FieldDef>,
}

/// Operations the spatial commands need. Paths arrive already resolved.
pub trait SpatialBackend {
    fn drivers(&self) -> &Drivers;

    fn open(&mut self, path: &Path) -> Result<&DataSource>;

    fn current(&self) -> Option<&DataSource>;

    fn layer_info(&self, name: &str) -> Result<Option<LayerInfo>>;

    /// Writes `layer` of the current data source to `target` using `driver`.
    fn save(&mut self, target: &Path, layer: &str, driver: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_lookup() {
        let mut drivers = Drivers::builtin();
        assert_eq!(drivers.for_path(Path::new("a/states.SHP")), Some("ESRI Shapefile"));
        assert_eq!(drivers.for_path(Path::new("x.geojson")), Some("GeoJSON"));
        assert_eq!(drivers.for_path(Path::new("x.fgb")), None);
        assert_eq!(drivers.for_path(Path::new("noext")), None);

        let extra = HashMap::from([(".fgb".to_string(), "FlatGeobuf".to_string())]);
        drivers.extend(&extra);
        assert_eq!(drivers.for_path(Path::new("x.fgb")), Some("FlatGeobuf"));
    }
}
