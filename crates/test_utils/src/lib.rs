//! Test Utilities Crate
//!
//! Shared test infrastructure for the retirement platform test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built test data for common entities
//! - `builders`: Builder patterns for test data construction
//! - `clock`: Settable clock for multi-day scenarios
//! - `memory`: In-memory implementations of every domain port
//! - `assertions`: Custom assertion helpers for domain types
//! - `generators`: Property-based test data generators

pub mod assertions;
pub mod builders;
pub mod clock;
pub mod fixtures;
pub mod generators;
pub mod memory;

pub use assertions::*;
pub use builders::*;
pub use clock::*;
pub use fixtures::*;
pub use generators::*;
pub use memory::*;
