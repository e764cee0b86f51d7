//! Testing infrastructure for tokensync integration tests.
//!
//! - `TestWorld`: isolated home directory with every source's store laid out
//! - `fixtures`: transcript line and document builders per source
//! - `assertions`: invariant checks over scan output

pub mod assertions;
pub mod fixtures;
pub mod world;

pub use world::TestWorld;
