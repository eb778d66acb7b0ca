//! Directory use-case service.
//!
//! # Responsibility
//! - Provide the register/edit/delete/list workflow behind the screens.
//! - Keep the in-memory store and the persisted mirror consistent.
//!
//! # Invariants
//! - A record is created or replaced only after geocoding succeeded.
//! - Mirror writes are issued after the in-memory mutation applies, and
//!   complete or fail before the mutating call returns.
//! - A corrupt mirror payload degrades to an empty store at hydration and
//!   is never surfaced as a user-facing error.

use crate::geo::provider::{GeocodeError, GeocodingProvider};
use crate::geo::resolver::{AddressInput, AddressResolver};
use crate::model::person::{GeoPoint, Person, PersonId, PersonValidationError};
use crate::repo::mirror_repo::{MirrorError, MirrorRepository};
use crate::store::record_store::{RecordStore, StoreError, StoreObserver};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Map viewport deltas for a focused record.
const FOCUSED_REGION_DELTA: f64 = 0.1;
/// Fallback region shown before any record exists (São Paulo).
const DEFAULT_REGION_CENTER: GeoPoint = GeoPoint {
    latitude: -23.55,
    longitude: -46.63,
};
const DEFAULT_REGION_DELTA: f64 = 0.5;

pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Service error for the directory workflow.
#[derive(Debug)]
pub enum DirectoryError {
    /// Required input missing or malformed; nothing was attempted.
    Validation(PersonValidationError),
    /// Geocoding produced no candidate in any attempted form.
    AddressNotFound,
    /// The geocoding capability itself failed.
    Geocode(GeocodeError),
    /// In-memory store mutation failed; indicates diverged state.
    Store(StoreError),
    /// Mirror persistence failed.
    Mirror(MirrorError),
}

impl Display for DirectoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::AddressNotFound => write!(f, "address not found"),
            Self::Geocode(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Mirror(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DirectoryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::AddressNotFound => None,
            Self::Geocode(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Mirror(err) => Some(err),
        }
    }
}

impl From<PersonValidationError> for DirectoryError {
    fn from(value: PersonValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<GeocodeError> for DirectoryError {
    fn from(value: GeocodeError) -> Self {
        Self::Geocode(value)
    }
}

impl From<StoreError> for DirectoryError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<MirrorError> for DirectoryError {
    fn from(value: MirrorError) -> Self {
        Self::Mirror(value)
    }
}

/// Registration form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterRequest {
    pub name: String,
    pub street: String,
    pub number: String,
    pub city: String,
    pub state_uf: String,
}

impl RegisterRequest {
    fn validate(&self) -> Result<(), PersonValidationError> {
        for (field, value) in [
            ("name", &self.name),
            ("street", &self.street),
            ("number", &self.number),
            ("city", &self.city),
            ("state_uf", &self.state_uf),
        ] {
            if value.trim().is_empty() {
                return Err(PersonValidationError::EmptyField(field));
            }
        }
        Ok(())
    }

    fn address_input(&self) -> AddressInput {
        AddressInput::new(
            self.street.trim(),
            self.number.trim(),
            self.city.trim(),
            self.state_uf.trim(),
        )
    }
}

/// Map viewport derived from the record store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapRegion {
    pub center: GeoPoint,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

/// Use-case facade wiring resolver, store and mirror.
pub struct DirectoryService<P: GeocodingProvider, M: MirrorRepository> {
    resolver: AddressResolver<P>,
    mirror: M,
    store: RecordStore,
}

impl<P: GeocodingProvider, M: MirrorRepository> DirectoryService<P, M> {
    /// Creates a service with an empty store.
    ///
    /// Call [`DirectoryService::hydrate`] before serving reads so the store
    /// reflects the persisted mirror.
    pub fn new(provider: P, mirror: M) -> Self {
        Self {
            resolver: AddressResolver::new(provider),
            mirror,
            store: RecordStore::new(),
        }
    }

    /// Loads the mirror into the store at process start.
    ///
    /// Returns the number of records loaded. A corrupt payload is logged
    /// and treated as an empty collection rather than blocking app start.
    pub fn hydrate(&mut self) -> DirectoryResult<usize> {
        let records = match self.mirror.load_all() {
            Ok(records) => records,
            Err(MirrorError::CorruptData { slot, message }) => {
                warn!(
                    "event=mirror_hydrate module=service status=recovered slot={slot} error={message}"
                );
                Vec::new()
            }
            Err(err) => return Err(err.into()),
        };

        let count = records.len();
        self.store.replace_all(records)?;
        info!("event=mirror_hydrate module=service status=ok records={count}");
        Ok(count)
    }

    /// Registers one person from form input.
    ///
    /// # Contract
    /// - All five fields must be non-blank.
    /// - The address is resolved through the ordered formatting fallbacks;
    ///   the first candidate of the first non-empty result wins.
    /// - The stored address is the canonical display composition.
    pub fn register(&mut self, request: &RegisterRequest) -> DirectoryResult<Person> {
        request.validate()?;

        let input = request.address_input();
        let candidates = self.resolver.resolve_input(&input)?;
        let Some(first) = candidates.first() else {
            return Err(DirectoryError::AddressNotFound);
        };

        let person = Person::new(
            request.name.trim(),
            input.display_address(),
            GeoPoint::new(first.latitude, first.longitude),
        );
        person.validate()?;

        self.store.add(person.clone())?;
        self.mirror.save_all(self.store.list())?;
        info!(
            "event=person_registered module=service status=ok person_id={} candidates={}",
            person.id,
            candidates.len()
        );
        Ok(person)
    }

    /// Replaces one record's name/address/coords after re-geocoding.
    ///
    /// The edit flow takes a single free-text address, so only the
    /// normalized/original retry applies, not the formatting variants. On
    /// any failure the stored record is left untouched.
    pub fn edit(
        &mut self,
        id: PersonId,
        name: &str,
        address: &str,
    ) -> DirectoryResult<Person> {
        if name.trim().is_empty() {
            return Err(PersonValidationError::EmptyField("name").into());
        }
        if address.trim().is_empty() {
            return Err(PersonValidationError::EmptyField("address").into());
        }

        let candidates = self.resolver.resolve(address.trim())?;
        let Some(first) = candidates.first() else {
            return Err(DirectoryError::AddressNotFound);
        };

        let replacement = Person::with_id(
            id,
            name.trim(),
            address.trim(),
            GeoPoint::new(first.latitude, first.longitude),
        );
        replacement.validate()?;

        self.store.update(replacement.clone())?;
        self.mirror.save_all(self.store.list())?;
        info!("event=person_updated module=service status=ok person_id={id}");
        Ok(replacement)
    }

    /// Removes one record by stable ID.
    pub fn remove(&mut self, id: PersonId) -> DirectoryResult<()> {
        self.store.delete(id)?;
        self.mirror.save_all(self.store.list())?;
        info!("event=person_deleted module=service status=ok person_id={id}");
        Ok(())
    }

    /// Read-only ordered view of the registered people.
    pub fn people(&self) -> &[Person] {
        self.store.list()
    }

    /// Registers a screen observer on the underlying store.
    pub fn subscribe(&mut self, observer: Arc<dyn StoreObserver>) {
        self.store.subscribe(observer);
    }

    /// Map viewport centered on the most recent record.
    ///
    /// Falls back to the default region while the store is empty.
    pub fn map_region(&self) -> MapRegion {
        match self.store.list().last() {
            Some(person) => MapRegion {
                center: person.coords,
                latitude_delta: FOCUSED_REGION_DELTA,
                longitude_delta: FOCUSED_REGION_DELTA,
            },
            None => MapRegion {
                center: DEFAULT_REGION_CENTER,
                latitude_delta: DEFAULT_REGION_DELTA,
                longitude_delta: DEFAULT_REGION_DELTA,
            },
        }
    }
}
