//! Clipped-model directory layout validation.
//!
//! A clipped FES2014 model root holds `region0` … `regionN`
//! sub-directories, each with `fes2014/load_tide` and `fes2014/ocean_tide`
//! grid directories holding exactly [`GRID_FILES_PER_LAYER`] netCDF files.
//! Validation fails fast on the first missing piece.

use std::path::{Path, PathBuf};

use crate::error::{AtlasError, AtlasResult};

/// Number of constituent grid files each tide layer must hold.
pub const GRID_FILES_PER_LAYER: usize = 34;

/// A validated clipped-model root.
#[derive(Debug, Clone)]
pub struct ModelLayout {
    root: PathBuf,
    region_ids: Vec<u32>,
}

impl ModelLayout {
    /// Validate the model root and every region beneath it.
    ///
    /// Raises a resource error carrying the offending path if the root,
    /// any region sub-path, or the exact grid-file count is missing.
    pub fn validate(root: impl AsRef<Path>) -> AtlasResult<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(AtlasError::MissingModel { path: root });
        }

        let mut region_ids = discover_region_ids(&root)?;
        region_ids.sort_unstable();
        if region_ids.is_empty() {
            return Err(AtlasError::MissingRegionDir {
                region: 0,
                path: root.join("region0"),
            });
        }

        for &id in &region_ids {
            let region_dir = root.join(format!("region{id}"));
            for layer in ["load_tide", "ocean_tide"] {
                let layer_dir = region_dir.join("fes2014").join(layer);
                if !layer_dir.is_dir() {
                    return Err(AtlasError::MissingRegionDir {
                        region: id,
                        path: layer_dir,
                    });
                }
                let found = count_grid_files(&layer_dir)?;
                if found != GRID_FILES_PER_LAYER {
                    return Err(AtlasError::WrongFileCount {
                        path: layer_dir,
                        expected: GRID_FILES_PER_LAYER,
                        found,
                    });
                }
            }
        }

        Ok(Self { root, region_ids })
    }

    /// The validated model root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Region identifiers present under the root, ascending.
    pub fn region_ids(&self) -> &[u32] {
        &self.region_ids
    }

    /// Directory of one region (`<root>/region<id>`).
    pub fn region_directory(&self, region_id: u32) -> PathBuf {
        self.root.join(format!("region{region_id}"))
    }
}

/// Collect the numeric suffixes of `region<N>` entries under the root.
fn discover_region_ids(root: &Path) -> AtlasResult<Vec<u32>> {
    let mut ids = Vec::new();
    let entries = std::fs::read_dir(root).map_err(|e| AtlasError::io(root, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| AtlasError::io(root, e))?;
        if !entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if let Some(suffix) = name.strip_prefix("region") {
            if let Ok(id) = suffix.parse::<u32>() {
                ids.push(id);
            }
        }
    }
    Ok(ids)
}

/// Count `.nc` files directly inside a layer directory.
fn count_grid_files(dir: &Path) -> AtlasResult<usize> {
    let entries = std::fs::read_dir(dir).map_err(|e| AtlasError::io(dir, e))?;
    let mut count = 0;
    for entry in entries {
        let entry = entry.map_err(|e| AtlasError::io(dir, e))?;
        if entry.path().extension().is_some_and(|ext| ext == "nc") {
            count += 1;
        }
    }
    Ok(count)
}
