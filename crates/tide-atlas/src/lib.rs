//! Regional tide-atlas access: clipped-model layout validation, region
//! boundary resolution, and harmonic-constituent extraction from netCDF
//! grids.

pub mod error;
pub mod extract;
pub mod geojson;
pub mod interp;
pub mod layout;
pub mod regions;

pub use error::{AtlasError, AtlasResult};
pub use extract::{ConstituentSource, FesRegionAtlas, HarmonicConstants};
pub use interp::{ConstituentGrid, InterpolationMethod};
pub use layout::ModelLayout;
pub use regions::{QueryPoint, RegionMap};
