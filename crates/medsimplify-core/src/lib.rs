//! Medsimplify Core Library
//!
//! Drug-identity resolution for patient-facing medical document
//! simplification: noisy OCR candidates in, explained medications out.
//!
//! # Architecture
//!
//! ```text
//! OCR text blocks → Candidate Filter (medsimplify-ocr crate)
//!                            │
//!                    candidate names
//!                            │
//!               ┌────────────▼────────────┐
//!               │      Batch Resolver     │  bounded fan-out,
//!               └────────────┬────────────┘  per-lookup timeout
//!                            │ (per name)
//!               ┌────────────▼────────────┐
//!               │       Tiered Cache      │  session tier → durable tier
//!               └────────────┬────────────┘
//!                            │ (miss)
//!               ┌────────────▼────────────┐
//!               │     Registry Client     │  exact search → fuzzy search
//!               └────────────┬────────────┘
//!                            │
//!                DrugRecord / not-found fallback
//! ```
//!
//! # Core Principle
//!
//! **A lookup never fails loudly.** Every name yields a well-formed
//! [`DrugRecord`]; registry faults and misses collapse into the not-found
//! placeholder, and only worker-infrastructure breakage surfaces an error.
//!
//! # Modules
//!
//! - [`models`]: Domain types (DrugRecord, confidence, provenance)
//! - [`registry`]: Fuzzy registry client and label parsing
//! - [`cache`]: Two-tier cache with write-through persistence
//! - [`resolver`]: Concurrent batch resolution
//! - [`conditions`]: Drug-combination condition detection

pub mod cache;
pub mod conditions;
pub mod models;
pub mod registry;
pub mod resolver;

// Re-export commonly used types
pub use cache::{CacheStats, TieredCache};
pub use conditions::{detect_conditions, DetectedCondition};
pub use models::{Confidence, DrugRecord, RecordSource};
pub use registry::{
    DrugLookup, LookupOutcome, MatchConfig, RegistryClient, RegistryError,
};
pub use resolver::{BatchError, BatchOutcome, BatchResolver};
