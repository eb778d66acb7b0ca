//! Core domain logic for Geonnect.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod geo;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use geo::nominatim::NominatimProvider;
pub use geo::normalize::fold_diacritics;
pub use geo::provider::{GeocodeCandidate, GeocodeError, GeocodeResult, GeocodingProvider};
pub use geo::resolver::{AddressInput, AddressResolver};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::person::{GeoPoint, Person, PersonId, PersonValidationError};
pub use repo::mirror_repo::{
    MirrorError, MirrorRepository, MirrorResult, SqliteMirrorRepository, RECORDS_SLOT,
};
pub use service::directory_service::{
    DirectoryError, DirectoryResult, DirectoryService, MapRegion, RegisterRequest,
};
pub use store::record_store::{RecordStore, StoreError, StoreObserver, StoreResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
