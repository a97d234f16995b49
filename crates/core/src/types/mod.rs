//! Core types for the Points Mall client.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod profile;
pub mod role;

pub use id::*;
pub use profile::UserProfile;
pub use role::Role;
