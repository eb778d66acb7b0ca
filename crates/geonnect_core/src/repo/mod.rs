//! Persistence layer for the record mirror.
//!
//! # Responsibility
//! - Define the mirror contract used by the directory service.
//! - Isolate SQLite and payload-encoding details from orchestration.
//!
//! # Invariants
//! - Write paths validate records before touching storage.
//! - Read paths reject invalid persisted state instead of masking it.

pub mod mirror_repo;
