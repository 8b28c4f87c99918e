//! Cross-module tests for the battle core.
//!
//! - `integration.rs`: Full battles through the session
//! - `determinism.rs`: Same config and seed give the same event history
//! - `properties.rs`: Property tests for scheduler and resolver invariants
//! - `helpers.rs`: Factories shared by the above

mod helpers;
