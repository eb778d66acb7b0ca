//! Geocoding provider seam.
//!
//! # Responsibility
//! - Define the contract every geocoding backend implements.
//! - Separate "no results" (empty candidate list) from transport failure.
//!
//! # Invariants
//! - `geocode` returning `Ok(vec![])` means the address was not found.
//! - `GeocodeError` only carries failures of the capability itself
//!   (network, permission denial, undecodable responses).

use std::error::Error;
use std::fmt::{Display, Formatter};

pub type GeocodeResult<T> = Result<T, GeocodeError>;

/// One possible coordinate result for a given address string.
///
/// The first candidate in a provider's result sequence is authoritative.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeCandidate {
    pub latitude: f64,
    pub longitude: f64,
    /// Provider display name for the match, when one is available.
    pub label: Option<String>,
}

impl GeocodeCandidate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            label: None,
        }
    }
}

/// Failure of the external geocoding capability.
///
/// Callers must not conflate these with the empty "not found" outcome.
#[derive(Debug)]
pub enum GeocodeError {
    /// Transient failure: network error, timeout or denied permission.
    Unavailable { provider: String, message: String },
    /// The provider answered, but the payload could not be decoded.
    InvalidResponse { provider: String, message: String },
}

impl GeocodeError {
    pub fn unavailable(provider: &str, message: impl Into<String>) -> Self {
        Self::Unavailable {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    pub fn invalid_response(provider: &str, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}

impl Display for GeocodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable { provider, message } => {
                write!(f, "geocoding provider `{provider}` unavailable: {message}")
            }
            Self::InvalidResponse { provider, message } => {
                write!(f, "invalid response from provider `{provider}`: {message}")
            }
        }
    }
}

impl Error for GeocodeError {}

/// Contract for external geocoding backends.
///
/// Implementations are expected to be side-effect free beyond the lookup
/// itself; retry policy lives in the resolver, not in providers.
pub trait GeocodingProvider {
    /// Stable identifier used in logs and error envelopes.
    fn provider_id(&self) -> &str;

    /// Resolves free text to zero or more coordinate candidates.
    fn geocode(&self, query: &str) -> GeocodeResult<Vec<GeocodeCandidate>>;
}
