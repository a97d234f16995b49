//! Points Mall Core - Shared types library.
//!
//! This crate provides the domain types used across the Points Mall client
//! components:
//! - `client` - Session, cart, routing and API plumbing
//! - `cli` - Command-line front end over the client library
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, user roles and user profiles

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
