//! Harmonic tide synthesis: constituent tables, astronomical arguments,
//! nodal corrections, drift prediction, and minor-constituent inference.

pub mod astro;
pub mod constituents;
pub mod synth;

pub use constituents::{Argument, Constituent, NodalFamily};
pub use synth::{drift, infer_minor, synthesize_drift, TideTriple};
