//! Utility functions for DocModel Core
//!
//! Format predicates shared by type inference and validation.

pub mod formats;
