//! Address normalization and geocoding.
//!
//! # Responsibility
//! - Canonicalize free-text addresses for better geocoding hit rates.
//! - Resolve addresses to coordinate candidates with ordered fallbacks.
//! - Define the provider seam to the external geocoding capability.
//!
//! # Invariants
//! - An empty candidate list means "address not found" and is never an
//!   error; transport failures are typed separately.

pub mod nominatim;
pub mod normalize;
pub mod provider;
pub mod resolver;
