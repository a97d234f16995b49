//! Points Mall client library.
//!
//! This crate provides the client-side plumbing of the Points Mall as a
//! library, allowing it to be tested and reused by any front end:
//!
//! - [`session`] - Token, profile and points balance, mirrored to storage
//! - [`cart`] - Cart lines with derived count and points totals
//! - [`router`] - Route table and authorization guard
//! - [`api`] - HTTP client with token injection and failure notifications
//! - [`storage`] - Key-value persistence behind a small trait
//! - [`state`] - Explicitly wired application state

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod config;
pub mod error;
pub mod notify;
pub mod router;
pub mod session;
pub mod state;
pub mod storage;

pub use error::{ClientError, Result};
