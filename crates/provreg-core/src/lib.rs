//! PROVREG Core — domain models, repository traits and the principal
//! identifier scheme.
//!
//! This crate is I/O-free. Storage lives in `provreg-db`, the HTTP
//! surface in `provreg-server`.

pub mod error;
pub mod models;
pub mod repository;
pub mod uid;
