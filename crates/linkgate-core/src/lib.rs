//! Core library for LinkGate.
//!
//! Contains the share-token codec, the embedded-browser redirect heuristic,
//! the credential-verification capability, and the settings and session
//! stores. This crate depends on `linkgate-storage` for the storage backend
//! trait and knows nothing about HTTP or rendering.

pub mod auth;
pub mod codec;
pub mod config;
pub mod error;
pub mod redirect;
pub mod settings;
