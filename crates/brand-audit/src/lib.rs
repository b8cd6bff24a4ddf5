//! Brand audit core — section catalog, synthetic scoring, verdict normalization,
//! audit assembly, and comparison.
//!
//! Everything in this crate is pure: no network, no filesystem, no async.

pub mod assembler;
pub mod catalog;
pub mod comparison;
pub mod normalizer;
pub mod synthetic;
pub mod types;

pub use assembler::{assemble, AcquisitionInfo, AssemblyInput};
pub use catalog::{SectionSpec, CATALOG, SECTION_COUNT};
pub use comparison::{compare_audits, Change, ComparisonResult, SectionDelta};
pub use normalizer::{normalize, parse_verdict, NormalizedVerdict, ParsedVerdict};
pub use synthetic::score_domain;
pub use types::*;
