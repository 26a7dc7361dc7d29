use anyhow::{bail, Context, Result};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use crate::backend::shapefile::{read_dbf_header, read_extent, SIDECARS};
use crate::backend::{DataSource, Drivers, LayerInfo, SpatialBackend};
use crate::shell::error::ShellError;

const SHAPEFILE: &str = "ESRI Shapefile";

/// File-level backend: each file is a data source with one layer named
/// after its stem. Shapefile headers are read for `info`; saving copies
/// files and cannot change format.
pub struct LocalBackend {
    drivers: Drivers,
    current: Option<DataSource>,
}

impl LocalBackend {
    pub fn new(drivers: Drivers) -> Self {
        Self { drivers, current: None }
    }

    fn source(&self) -> Result<&DataSource> {
        self.current.as_ref().ok_or_else(|| ShellError::NoDataSource.into())
    }
}

impl Default for LocalBackend {
    fn default() -> Self {
        Self::new(Drivers::builtin())
    }
}

fn layer_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn with_ext(path: &Path, ext: &str) -> PathBuf {
    path.with_extension(ext)
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    path.with_file_name(format!(".{}.partial", name))
}

fn discard(staged: &[(PathBuf, PathBuf)]) {
    for (partial, _) in staged {
        match fs::remove_file(partial) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                warn!("Failed to remove {}: {}", partial.display(), e);
            }
            _ => {}
        }
    }
}

impl SpatialBackend for LocalBackend {
    fn drivers(&self) -> &Drivers {
        &self.drivers
    }

    fn open(&mut self, path: &Path) -> Result<&DataSource> {
        if !path.is_file() {
            bail!("Could not open {}", path.display());
        }
        let Some(driver) = self.drivers.for_path(path) else {
            bail!("Could not open {}: no driver for this file type", path.display());
        };
        let source = DataSource {
            path: path.to_path_buf(),
            driver: driver.to_string(),
            layers: vec![layer_name(path)],
        };
        info!("Opened {} with driver {}", path.display(), source.driver);
        Ok(&*self.current.insert(source))
    }

    fn current(&self) -> Option<&DataSource> {
        self.current.as_ref()
    }

    fn layer_info(&self, name: &str) -> Result<Option<LayerInfo>> {
        let source = self.source()?;
        if !source.layers.iter().any(|l| l == name) {
            return Ok(None);
        }

        let mut info = LayerInfo {
            name: name.to_string(),
            feature_count: None,
            extent: None,
            fields: Vec::new(),
        };

        if source.driver == SHAPEFILE {
            info.extent = Some(read_extent(&source.path)?);
            let dbf = with_ext(&source.path, "dbf");
            if dbf.exists() {
                let header = read_dbf_header(&dbf)?;
                info.feature_count = Some(header.record_count as u64);
                info.fields = header.fields;
            }
        }
        Ok(Some(info))
    }

    fn save(&mut self, target: &Path, layer: &str, driver: &str) -> Result<()> {
        let source = self.source()?;
        if !source.layers.iter().any(|l| l == layer) {
            bail!("Layer {} not found in {}", layer, source.path.display());
        }
        if source.driver != driver {
            bail!(
                "Unable to convert {} to {}: the local backend only copies layers",
                source.driver,
                driver
            );
        }

        // 1. Collect source files (sidecars only matter for shapefiles)
        let mut files = vec![(source.path.clone(), target.to_path_buf())];
        if driver == SHAPEFILE {
            for ext in SIDECARS {
                let sidecar = with_ext(&source.path, ext);
                if sidecar.exists() {
                    files.push((sidecar, with_ext(target, ext)));
                }
            }
        }

        // 2. Nothing is touched if any file would land on itself
        if let Some((from, _)) = files.iter().find(|(from, to)| same_file(from, to)) {
            bail!("Refusing to save {} onto itself", from.display());
        }

        // 3. Copy next to the target under staging names
        let mut staged = Vec::with_capacity(files.len());
        for (from, to) in &files {
            let partial = staging_path(to);
            staged.push((partial.clone(), to.clone()));
            if let Err(e) = fs::copy(from, &partial) {
                discard(&staged);
                return Err(e).with_context(|| format!("unable to save to {}", to.display()));
            }
        }

        // 4. Drop target sidecars the new data source does not replace
        if driver == SHAPEFILE {
            for ext in SIDECARS {
                let old = with_ext(target, ext);
                if old.exists() && !files.iter().any(|(_, to)| *to == old) {
                    debug!("Removing stale {}", old.display());
                    fs::remove_file(&old).with_context(|| format!("Failed to remove {}", old.display()))?;
                }
            }
        }

        // 5. Move into place, replacing any existing target files
        for (partial, to) in &staged {
            fs::rename(partial, to).with_context(|| format!("unable to save to {}", to.display()))?;
        }
        info!("Saved layer {} to {}", layer, target.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::shapefile::fixtures::write_shapefile;

    #[test]
    fn test_open_missing_file() {
        let mut backend = LocalBackend::default();
        let err = backend.open(Path::new("/nonexistent/missing.shp")).unwrap_err();
        assert_eq!(err.to_string(), "Could not open /nonexistent/missing.shp");
        assert!(backend.current().is_none());
    }

    #[test]
    fn test_open_unknown_driver() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "x").unwrap();
        let mut backend = LocalBackend::default();
        assert!(backend.open(&path).is_err());
    }

    #[test]
    fn test_info_requires_open() {
        let backend = LocalBackend::default();
        let err = backend.layer_info("states").unwrap_err();
        assert_eq!(err.downcast_ref::<ShellError>(), Some(&ShellError::NoDataSource));
    }

    #[test]
    fn test_open_and_info() {
        let dir = tempfile::tempdir().unwrap();
        write_shapefile(dir.path(), "states", 3, &[("NAME", b'C', 10, 0)]);
        let mut backend = LocalBackend::default();
        let source = backend.open(&dir.path().join("states.shp")).unwrap();
        assert_eq!(source.layers, vec!["states".to_string()]);
        assert_eq!(source.driver, "ESRI Shapefile");

        let info = backend.layer_info("states").unwrap().unwrap();
        assert_eq!(info.feature_count, Some(3));
        assert_eq!(info.fields.len(), 1);
        assert!(backend.layer_info("counties").unwrap().is_none());
    }

    #[test]
    fn test_save_copies_sidecars_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        write_shapefile(dir.path(), "states", 3, &[]);
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();
        fs::write(out.join("copy.shp"), "stale").unwrap();

        let mut backend = LocalBackend::default();
        backend.open(&dir.path().join("states.shp")).unwrap();
        backend.save(&out.join("copy.shp"), "states", "ESRI Shapefile").unwrap();

        assert!(out.join("copy.dbf").exists());
        assert!(out.join("copy.shx").exists());
        assert_ne!(fs::read(out.join("copy.shp")).unwrap(), b"stale");
        assert!(!out.join(".copy.shp.partial").exists());
    }

    #[test]
    fn test_save_onto_open_source_keeps_files() {
        let dir = tempfile::tempdir().unwrap();
        write_shapefile(dir.path(), "states", 3, &[]);
        let shp = dir.path().join("states.shp");
        let before = fs::read(&shp).unwrap();

        let mut backend = LocalBackend::default();
        backend.open(&shp).unwrap();
        let err = backend.save(&shp, "states", "ESRI Shapefile").unwrap_err();
        assert!(err.to_string().contains("onto itself"), "{}", err);

        assert_eq!(fs::read(&shp).unwrap(), before);
        assert!(dir.path().join("states.dbf").exists());
        assert!(dir.path().join("states.shx").exists());
    }

    #[test]
    fn test_save_drops_stale_target_sidecars() {
        let dir = tempfile::tempdir().unwrap();
        write_shapefile(dir.path(), "states", 3, &[]);
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();
        fs::write(out.join("copy.shp"), "stale").unwrap();
        fs::write(out.join("copy.prj"), "stale").unwrap();

        let mut backend = LocalBackend::default();
        backend.open(&dir.path().join("states.shp")).unwrap();
        backend.save(&out.join("copy.shp"), "states", "ESRI Shapefile").unwrap();

        assert!(!out.join("copy.prj").exists());
        assert!(out.join("copy.dbf").exists());
    }

    #[test]
    fn test_save_refuses_conversion() {
        let dir = tempfile::tempdir().unwrap();
        write_shapefile(dir.path(), "states", 3, &[]);
        let mut backend = LocalBackend::default();
        backend.open(&dir.path().join("states.shp")).unwrap();
        assert!(backend.save(&dir.path().join("states.gpkg"), "states", "GPKG").is_err());
        assert!(backend.save(&dir.path().join("x.shp"), "counties", "ESRI Shapefile").is_err());
    }
}
