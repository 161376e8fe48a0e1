//! Drug-name candidate extraction from OCR output.
//!
//! This crate turns raw OCR text blocks from a prescription image into a
//! bounded, deduplicated list of likely drug names, ready for registry
//! resolution by `medsimplify-core`.

pub mod abbrev;
pub mod filter;

pub use abbrev::*;
pub use filter::*;
