use geonnect_core::db::{open_db, open_db_in_memory};
use geonnect_core::{
    DirectoryError, DirectoryService, GeocodeCandidate, GeocodeError, GeocodeResult,
    GeocodingProvider, PersonId, RegisterRequest, SqliteMirrorRepository, StoreError, RECORDS_SLOT,
};
use rusqlite::params;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

/// Table-driven provider sharing its call log with the test body.
struct MapProvider {
    hits: HashMap<String, Vec<GeocodeCandidate>>,
    calls: Rc<RefCell<Vec<String>>>,
}

impl MapProvider {
    fn new(entries: &[(&str, (f64, f64))]) -> (Self, Rc<RefCell<Vec<String>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let hits = entries
            .iter()
            .map(|(query, (lat, lon))| {
                (query.to_string(), vec![GeocodeCandidate::new(*lat, *lon)])
            })
            .collect();
        (
            Self {
                hits,
                calls: calls.clone(),
            },
            calls,
        )
    }
}

impl GeocodingProvider for MapProvider {
    fn provider_id(&self) -> &str {
        "map_mock"
    }

    fn geocode(&self, query: &str) -> GeocodeResult<Vec<GeocodeCandidate>> {
        self.calls.borrow_mut().push(query.to_string());
        Ok(self.hits.get(query).cloned().unwrap_or_default())
    }
}

struct DownProvider;

impl GeocodingProvider for DownProvider {
    fn provider_id(&self) -> &str {
        "down_mock"
    }

    fn geocode(&self, _query: &str) -> GeocodeResult<Vec<GeocodeCandidate>> {
        Err(GeocodeError::unavailable("down_mock", "request timed out"))
    }
}

const PAULISTA: (&str, (f64, f64)) = ("Av. Paulista, 1000 - Sao Paulo, SP", (-23.5613, -46.6565));

fn paulista_request() -> RegisterRequest {
    RegisterRequest {
        name: "Ana Silva".to_string(),
        street: "Av. Paulista".to_string(),
        number: "1000".to_string(),
        city: "São Paulo".to_string(),
        state_uf: "SP".to_string(),
    }
}

fn in_memory_service(
    entries: &[(&str, (f64, f64))],
) -> DirectoryService<MapProvider, SqliteMirrorRepository> {
    let (provider, _calls) = MapProvider::new(entries);
    let mirror = SqliteMirrorRepository::try_new(open_db_in_memory().unwrap()).unwrap();
    DirectoryService::new(provider, mirror)
}

fn file_service(
    path: &Path,
    entries: &[(&str, (f64, f64))],
) -> DirectoryService<MapProvider, SqliteMirrorRepository> {
    let (provider, _calls) = MapProvider::new(entries);
    let mirror = SqliteMirrorRepository::try_new(open_db(path).unwrap()).unwrap();
    DirectoryService::new(provider, mirror)
}

#[test]
fn register_resolves_normalized_variant_and_appends_record() {
    let mut service = in_memory_service(&[PAULISTA]);

    let person = service.register(&paulista_request()).unwrap();

    assert!((person.coords.latitude + 23.56).abs() < 0.05);
    assert!((person.coords.longitude + 46.65).abs() < 0.05);
    assert_eq!(person.address, "Av. Paulista, 1000 - São Paulo, SP");
    assert_eq!(person.name, "Ana Silva");

    let people = service.people();
    assert_eq!(people.len(), 1);
    assert_eq!(people.last().unwrap(), &person);
}

#[test]
fn registered_records_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("geonnect.sqlite3");

    let person = {
        let mut service = file_service(&db_path, &[PAULISTA]);
        service.hydrate().unwrap();
        service.register(&paulista_request()).unwrap()
    };

    let mut reopened = file_service(&db_path, &[]);
    let count = reopened.hydrate().unwrap();

    assert_eq!(count, 1);
    assert_eq!(reopened.people(), [person]);
}

#[test]
fn failing_edit_leaves_the_stored_record_untouched() {
    let mut service = in_memory_service(&[PAULISTA]);
    let person = service.register(&paulista_request()).unwrap();

    let err = service
        .edit(person.id, "Ana Maria", "Rua Que Nao Existe, 0")
        .unwrap_err();

    assert!(matches!(err, DirectoryError::AddressNotFound));
    assert_eq!(service.people(), [person]);
}

#[test]
fn successful_edit_replaces_wholesale_and_keeps_identity() {
    let atlantica = ("Av. Atlantica, 500", (-22.9701, -43.1824));
    let mut service = in_memory_service(&[PAULISTA, atlantica]);
    let person = service.register(&paulista_request()).unwrap();

    let updated = service
        .edit(person.id, "Ana Maria", "Av. Atlântica, 500")
        .unwrap();

    assert_eq!(updated.id, person.id);
    assert_eq!(updated.name, "Ana Maria");
    assert_eq!(updated.address, "Av. Atlântica, 500");
    assert!((updated.coords.latitude + 22.9701).abs() < 1e-9);
    assert_eq!(service.people(), [updated]);
}

#[test]
fn remove_deletes_the_record_and_unknown_ids_are_store_errors() {
    let mut service = in_memory_service(&[PAULISTA]);
    let person = service.register(&paulista_request()).unwrap();

    service.remove(person.id).unwrap();
    assert!(service.people().is_empty());

    let ghost = PersonId::new_v4();
    let err = service.remove(ghost).unwrap_err();
    assert!(matches!(
        err,
        DirectoryError::Store(StoreError::NotFound(id)) if id == ghost
    ));
}

#[test]
fn blank_required_field_fails_before_any_geocoding() {
    let (provider, calls) = MapProvider::new(&[PAULISTA]);
    let mirror = SqliteMirrorRepository::try_new(open_db_in_memory().unwrap()).unwrap();
    let mut service = DirectoryService::new(provider, mirror);

    let mut request = paulista_request();
    request.city = "   ".to_string();

    let err = service.register(&request).unwrap_err();
    assert!(matches!(err, DirectoryError::Validation(_)));
    assert!(calls.borrow().is_empty());
    assert!(service.people().is_empty());
}

#[test]
fn provider_outage_surfaces_as_geocode_error_not_as_not_found() {
    let mirror = SqliteMirrorRepository::try_new(open_db_in_memory().unwrap()).unwrap();
    let mut service = DirectoryService::new(DownProvider, mirror);

    let err = service.register(&paulista_request()).unwrap_err();
    assert!(matches!(err, DirectoryError::Geocode(_)));
    assert!(service.people().is_empty());
}

#[test]
fn corrupt_mirror_payload_hydrates_to_an_empty_store() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO snapshots (slot, payload) VALUES (?1, ?2);",
        params![RECORDS_SLOT, "][ definitely not json"],
    )
    .unwrap();

    let (provider, _calls) = MapProvider::new(&[]);
    let mirror = SqliteMirrorRepository::try_new(conn).unwrap();
    let mut service = DirectoryService::new(provider, mirror);

    let count = service.hydrate().unwrap();
    assert_eq!(count, 0);
    assert!(service.people().is_empty());
}

#[test]
fn map_region_falls_back_then_follows_the_latest_record() {
    let mut service = in_memory_service(&[PAULISTA]);

    let fallback = service.map_region();
    assert!((fallback.center.latitude + 23.55).abs() < 1e-9);
    assert!((fallback.center.longitude + 46.63).abs() < 1e-9);
    assert!((fallback.latitude_delta - 0.5).abs() < 1e-9);

    let person = service.register(&paulista_request()).unwrap();
    let focused = service.map_region();
    assert_eq!(focused.center, person.coords);
    assert!((focused.latitude_delta - 0.1).abs() < 1e-9);
    assert!((focused.longitude_delta - 0.1).abs() < 1e-9);
}
