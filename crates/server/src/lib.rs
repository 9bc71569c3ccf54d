//! Composition root for the prediction service
//!
//! Mounts the KNN and regression route groups on one axum router. Neither
//! engine knows about HTTP; this crate only wires them to the transport.

pub mod api;
pub mod config;
