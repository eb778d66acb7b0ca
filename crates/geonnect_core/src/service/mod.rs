//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate resolver, record store and mirror into screen-facing
//!   operations.
//! - Keep UI/FFI layers decoupled from geocoding and storage details.

pub mod directory_service;
