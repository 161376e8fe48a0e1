//! Domain models for the medsimplify system.

mod record;

pub use record::*;
