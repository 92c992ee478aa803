//! Shared value types used across the Galleria crates.

pub mod id;
