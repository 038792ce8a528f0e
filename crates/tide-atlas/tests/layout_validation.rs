//! Clipped-model layout validation against on-disk fixtures.

use std::fs;
use std::path::Path;

use tide_atlas::error::AtlasError;
use tide_atlas::layout::{ModelLayout, GRID_FILES_PER_LAYER};

/// Build `<root>/region<N>/fes2014/{load_tide,ocean_tide}` with the
/// given number of grid files in each layer.
fn build_region(root: &Path, region: u32, files_per_layer: usize) {
    for layer in ["load_tide", "ocean_tide"] {
        let dir = root
            .join(format!("region{region}"))
            .join("fes2014")
            .join(layer);
        fs::create_dir_all(&dir).unwrap();
        for i in 0..files_per_layer {
            fs::write(dir.join(format!("c{i}.nc")), b"").unwrap();
        }
    }
}

#[test]
fn validates_complete_layout() {
    let root = tempfile::tempdir().unwrap();
    build_region(root.path(), 0, GRID_FILES_PER_LAYER);
    build_region(root.path(), 1, GRID_FILES_PER_LAYER);

    let layout = ModelLayout::validate(root.path()).unwrap();
    assert_eq!(layout.region_ids(), &[0, 1]);
    assert!(layout
        .region_directory(1)
        .ends_with(Path::new("region1")));
}

#[test]
fn rejects_missing_root() {
    let root = tempfile::tempdir().unwrap();
    let missing = root.path().join("no_such_model");
    assert!(matches!(
        ModelLayout::validate(&missing).unwrap_err(),
        AtlasError::MissingModel { .. }
    ));
}

#[test]
fn rejects_root_without_regions() {
    let root = tempfile::tempdir().unwrap();
    assert!(matches!(
        ModelLayout::validate(root.path()).unwrap_err(),
        AtlasError::MissingRegionDir { region: 0, .. }
    ));
}

#[test]
fn rejects_missing_layer_directory() {
    let root = tempfile::tempdir().unwrap();
    build_region(root.path(), 0, GRID_FILES_PER_LAYER);
    fs::remove_dir_all(root.path().join("region0/fes2014/ocean_tide")).unwrap();

    assert!(matches!(
        ModelLayout::validate(root.path()).unwrap_err(),
        AtlasError::MissingRegionDir { region: 0, .. }
    ));
}

#[test]
fn rejects_wrong_file_count() {
    let root = tempfile::tempdir().unwrap();
    build_region(root.path(), 0, GRID_FILES_PER_LAYER - 1);

    match ModelLayout::validate(root.path()).unwrap_err() {
        AtlasError::WrongFileCount {
            expected, found, ..
        } => {
            assert_eq!(expected, GRID_FILES_PER_LAYER);
            assert_eq!(found, GRID_FILES_PER_LAYER - 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}
