//! In-memory `/proc` for tests.
//!
//! `MockFs` plus canned process tables (`typical_system`, zombies, kernel
//! threads, truncated names, restricted processes).

mod filesystem;
mod scenarios;

pub use filesystem::MockFs;
