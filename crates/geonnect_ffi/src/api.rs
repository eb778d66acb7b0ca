//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Convert typed core failures into user-facing messages.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - One submission (register/edit) runs at a time; re-entrant calls are
//!   rejected instead of queued, mirroring the form's disabled submit
//!   button.

use geonnect_core::db::open_db;
use geonnect_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    DirectoryError, DirectoryService, NominatimProvider, Person, PersonId, RegisterRequest,
    SqliteMirrorRepository,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, OnceLock};

const DB_FILE_NAME: &str = "geonnect.sqlite3";

type AppService = DirectoryService<NominatimProvider, SqliteMirrorRepository>;

static SERVICE: Mutex<Option<AppService>> = Mutex::new(None);
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static SUBMIT_IN_FLIGHT: AtomicBool = AtomicBool::new(false);

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on
///   failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Record payload rendered by the list and map screens.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonDto {
    /// Stable person ID in string form.
    pub id: String,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Generic action response envelope for form/list commands.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonActionResponse {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// The created or updated record on success.
    pub person: Option<PersonDto>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl PersonActionResponse {
    fn success(message: impl Into<String>, person: PersonDto) -> Self {
        Self {
            ok: true,
            person: Some(person),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            person: None,
            message: message.into(),
        }
    }
}

/// List response envelope for the list screen.
#[derive(Debug, Clone, PartialEq)]
pub struct PeopleResponse {
    pub ok: bool,
    pub people: Vec<PersonDto>,
    pub message: String,
}

/// Map viewport payload.
#[derive(Debug, Clone, PartialEq)]
pub struct MapRegionDto {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

/// Map screen payload: viewport plus one pin per record.
#[derive(Debug, Clone, PartialEq)]
pub struct MapResponse {
    pub ok: bool,
    pub region: MapRegionDto,
    pub pins: Vec<PersonDto>,
    pub message: String,
}

/// Registers one person from the form screen.
///
/// # FFI contract
/// - Sync call; performs geocoding and DB-backed execution.
/// - Rejected while another submission is in flight.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn register_person(
    name: String,
    street: String,
    number: String,
    city: String,
    state_uf: String,
) -> PersonActionResponse {
    let Some(_guard) = SubmitGuard::acquire() else {
        return PersonActionResponse::failure("Another submission is in progress.");
    };

    let request = RegisterRequest {
        name,
        street,
        number,
        city,
        state_uf,
    };
    match with_service(|service| service.register(&request)) {
        Ok(Ok(person)) => PersonActionResponse::success("Person registered.", to_dto(&person)),
        Ok(Err(err)) => PersonActionResponse::failure(user_message(&err)),
        Err(message) => PersonActionResponse::failure(message),
    }
}

/// Lists all registered people in display order.
///
/// # FFI contract
/// - Sync call, never panics, empty list is a valid success.
#[flutter_rust_bridge::frb(sync)]
pub fn list_people() -> PeopleResponse {
    match with_service(|service| service.people().iter().map(to_dto).collect::<Vec<_>>()) {
        Ok(people) => {
            let message = if people.is_empty() {
                "No people registered.".to_string()
            } else {
                format!("{} record(s).", people.len())
            };
            PeopleResponse {
                ok: true,
                people,
                message,
            }
        }
        Err(message) => PeopleResponse {
            ok: false,
            people: Vec::new(),
            message,
        },
    }
}

/// Replaces one record's name and address from the list screen edit flow.
///
/// # FFI contract
/// - Sync call; re-geocodes before replacing, so a failed edit leaves the
///   record untouched.
/// - Rejected while another submission is in flight.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn update_person(id: String, name: String, address: String) -> PersonActionResponse {
    let Some(_guard) = SubmitGuard::acquire() else {
        return PersonActionResponse::failure("Another submission is in progress.");
    };

    let Some(person_id) = parse_person_id(&id) else {
        return PersonActionResponse::failure(format!("Malformed person id `{id}`."));
    };

    match with_service(|service| service.edit(person_id, &name, &address)) {
        Ok(Ok(person)) => PersonActionResponse::success("Person updated.", to_dto(&person)),
        Ok(Err(err)) => PersonActionResponse::failure(user_message(&err)),
        Err(message) => PersonActionResponse::failure(message),
    }
}

/// Deletes one record from the list screen.
///
/// # FFI contract
/// - Sync call, never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn delete_person(id: String) -> PersonActionResponse {
    let Some(person_id) = parse_person_id(&id) else {
        return PersonActionResponse::failure(format!("Malformed person id `{id}`."));
    };

    match with_service(|service| service.remove(person_id)) {
        Ok(Ok(())) => PersonActionResponse {
            ok: true,
            person: None,
            message: "Person deleted.".to_string(),
        },
        Ok(Err(err)) => PersonActionResponse::failure(user_message(&err)),
        Err(message) => PersonActionResponse::failure(message),
    }
}

/// Returns the map viewport and one pin per registered person.
///
/// The viewport follows the most recently registered record and falls back
/// to the default region while the store is empty.
#[flutter_rust_bridge::frb(sync)]
pub fn map_pins() -> MapResponse {
    match with_service(|service| {
        let region = service.map_region();
        let pins = service.people().iter().map(to_dto).collect::<Vec<_>>();
        (region, pins)
    }) {
        Ok((region, pins)) => MapResponse {
            ok: true,
            region: MapRegionDto {
                latitude: region.center.latitude,
                longitude: region.center.longitude,
                latitude_delta: region.latitude_delta,
                longitude_delta: region.longitude_delta,
            },
            pins,
            message: String::new(),
        },
        Err(message) => MapResponse {
            ok: false,
            region: MapRegionDto {
                latitude: 0.0,
                longitude: 0.0,
                latitude_delta: 0.0,
                longitude_delta: 0.0,
            },
            pins: Vec::new(),
            message,
        },
    }
}

/// RAII guard implementing the single-submission busy flag.
struct SubmitGuard;

impl SubmitGuard {
    fn acquire() -> Option<Self> {
        SUBMIT_IN_FLIGHT
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self)
    }
}

impl Drop for SubmitGuard {
    fn drop(&mut self) {
        SUBMIT_IN_FLIGHT.store(false, Ordering::SeqCst);
    }
}

fn with_service<R>(f: impl FnOnce(&mut AppService) -> R) -> Result<R, String> {
    let mut guard = SERVICE
        .lock()
        .map_err(|_| "Core state is unavailable after a previous failure.".to_string())?;

    if guard.is_none() {
        *guard = Some(build_service()?);
    }
    match guard.as_mut() {
        Some(service) => Ok(f(service)),
        None => Err("Core state is unavailable.".to_string()),
    }
}

fn build_service() -> Result<AppService, String> {
    let conn =
        open_db(resolve_db_path()).map_err(|err| format!("Failed to open database: {err}"))?;
    let mirror = SqliteMirrorRepository::try_new(conn)
        .map_err(|err| format!("Failed to initialize storage: {err}"))?;

    let provider = match std::env::var("GEONNECT_GEOCODER_URL") {
        Ok(base_url) if !base_url.trim().is_empty() => {
            NominatimProvider::with_base_url(base_url.trim())
        }
        _ => NominatimProvider::new(),
    }
    .map_err(|err| format!("Failed to initialize geocoder: {err}"))?;

    let mut service = DirectoryService::new(provider, mirror);
    service
        .hydrate()
        .map_err(|err| format!("Failed to load stored records: {err}"))?;
    Ok(service)
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("GEONNECT_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn parse_person_id(raw: &str) -> Option<PersonId> {
    PersonId::parse_str(raw.trim()).ok()
}

fn to_dto(person: &Person) -> PersonDto {
    PersonDto {
        id: person.id.to_string(),
        name: person.name.clone(),
        address: person.address.clone(),
        latitude: person.coords.latitude,
        longitude: person.coords.longitude,
    }
}

fn user_message(err: &DirectoryError) -> String {
    match err {
        DirectoryError::Validation(err) => format!("Fill in all fields ({err})."),
        DirectoryError::AddressNotFound => {
            "Address not found. Try including the state (UF).".to_string()
        }
        DirectoryError::Geocode(_) => {
            "Geocoding service unavailable. Please try again.".to_string()
        }
        DirectoryError::Store(err) => {
            log::error!("event=store_mutation module=ffi status=error error={err}");
            "Record list is out of sync. Please restart the app.".to_string()
        }
        DirectoryError::Mirror(err) => format!("Failed to save records: {err}"),
    }
}
