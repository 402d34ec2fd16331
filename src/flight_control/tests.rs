use super::{
    CallbackStatus, CameraKind, Deletion, Flight, FlightLocks, FlightRegistry, FlightService,
    FlightState, FlightStateMachine, ProcessingCallback, Project, RegistryError, ServiceError,
};
use crate::collaborators::fakes::{FakeJobClient, FakeMapServer, FakeRasterCalculator};
use crate::util::{Keychain, PipelineConfig};
use chrono::NaiveDate;
use rand::{Rng, rng};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

fn flight(name: &str, owner: &str) -> Flight {
    Flight::new(name, Some(owner), NaiveDate::from_ymd_opt(2024, 4, 12).unwrap(), CameraKind::Rgb)
}

fn processing(name: &str) -> Flight {
    let mut f = flight(name, "alice");
    FlightStateMachine::commit_upload(&mut f).unwrap();
    f
}

#[test]
fn test_success_callback_completes_and_triggers_once() {
    let mut f = processing("a");
    assert_eq!(f.processing_time(), 0);
    let first = FlightStateMachine::apply_callback(&mut f, 40, 93_000).unwrap();
    assert_eq!(first.to, FlightState::Complete);
    assert!(first.triggers_pipeline());
    assert_eq!(f.processing_time(), 93_000);
    assert_eq!(FlightStateMachine::apply_callback(&mut f, 40, 95_000), None);
    assert_eq!(f.state(), FlightState::Complete);
    assert_eq!(f.processing_time(), 93_000);
}

#[test]
fn test_failure_and_cancel_codes() {
    let mut failed = processing("failed");
    let t = FlightStateMachine::apply_callback(&mut failed, 30, 10).unwrap();
    assert_eq!(t.to, FlightState::Error);
    assert!(!t.triggers_pipeline());

    let mut canceled = processing("canceled");
    assert_eq!(FlightStateMachine::apply_callback(&mut canceled, 50, 10).unwrap().to, FlightState::Canceled);
}

#[test]
fn test_unknown_codes_and_early_callbacks_are_ignored() {
    let mut f = processing("a");
    for code in [10, 20, 0, -1, 41] {
        assert_eq!(FlightStateMachine::apply_callback(&mut f, code, 5), None);
    }
    assert_eq!(f.state(), FlightState::Processing);

    let mut waiting = flight("w", "alice");
    assert_eq!(FlightStateMachine::apply_callback(&mut waiting, 40, 5), None);
    assert_eq!(waiting.state(), FlightState::Waiting);
}

#[test]
fn test_random_callback_sequences_trigger_at_most_once() {
    let codes = [10, 20, 30, 40, 50, 40, 40];
    for _ in 0..200 {
        let mut f = processing("r");
        let mut triggers = 0;
        let mut terminal = None;
        for _ in 0..rng().random_range(1..12) {
            let code = codes[rng().random_range(0..codes.len())];
            if let Some(t) = FlightStateMachine::apply_callback(&mut f, code, 1) {
                assert!(terminal.is_none(), "terminal state left by callback {code}");
                terminal = Some(t.to);
                if t.triggers_pipeline() {
                    triggers += 1;
                }
            }
        }
        assert!(triggers <= 1);
        if let Some(state) = terminal {
            assert_eq!(f.state(), state);
            assert!(state.is_terminal());
        }
    }
}

#[test]
fn test_resubmit_only_from_terminal_states() {
    let mut f = processing("a");
    assert!(FlightStateMachine::resubmit(&mut f).is_err());
    FlightStateMachine::apply_callback(&mut f, 30, 500).unwrap();
    let t = FlightStateMachine::resubmit(&mut f).unwrap();
    assert_eq!((t.from, t.to), (FlightState::Error, FlightState::Waiting));
    assert_eq!(f.processing_time(), 0);
    assert!(FlightStateMachine::commit_upload(&mut f).is_ok());
}

#[test]
fn test_pause_and_resume_restore_previous_state() {
    let mut f = processing("a");
    FlightStateMachine::apply_callback(&mut f, 30, 1).unwrap();
    FlightStateMachine::pause(&mut f).unwrap();
    assert_eq!(f.state(), FlightState::Paused);
    assert!(FlightStateMachine::pause(&mut f).is_err());
    assert!(FlightStateMachine::resubmit(&mut f).is_err());

    let t = FlightStateMachine::resume(&mut f).unwrap();
    assert_eq!(t.to, FlightState::Error);
    assert_eq!(f.paused_from(), None);
    assert!(FlightStateMachine::resume(&mut f).is_err());
}

#[test]
fn test_processing_flight_cannot_be_paused() {
    let mut f = processing("a");
    let refused = FlightStateMachine::pause(&mut f).unwrap_err();
    assert_eq!((refused.from, refused.requested), (FlightState::Processing, FlightState::Paused));
    assert_eq!(f.paused_from(), None);

    let done = FlightStateMachine::apply_callback(&mut f, 40, 7).unwrap();
    assert!(done.triggers_pipeline());
}

#[test]
fn test_waiting_state_display() {
    assert_eq!(FlightState::Waiting.to_string(), "Waiting for images");
    assert_eq!(serde_json::to_string(&FlightState::Processing).unwrap(), "\"PROCESSING\"");
}

#[tokio::test]
async fn test_registry_enforces_unique_names_per_owner() {
    let registry = FlightRegistry::new();
    let first = registry.insert_flight(flight("field", "alice")).await.unwrap();
    assert!(matches!(
        registry.insert_flight(flight("field", "alice")).await,
        Err(RegistryError::DuplicateName(_))
    ));
    registry.insert_flight(flight("field", "bob")).await.unwrap();

    registry.update_flight(first, |f| f.set_deleted(true)).await.unwrap();
    let second = registry.insert_flight(flight("field", "alice")).await.unwrap();
    assert!(matches!(registry.restore_flight(first).await, Err(RegistryError::DuplicateName(_))));

    registry.rename_flight(second, "field 2").await.unwrap();
    registry.restore_flight(first).await.unwrap();
    assert!(matches!(
        registry.rename_flight(second, "field").await,
        Err(RegistryError::DuplicateName(_))
    ));
    assert_eq!(registry.flights_of(Some("alice"), false).await.len(), 2);
}

#[tokio::test]
async fn test_registry_snapshot_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.json");
    let registry = FlightRegistry::new();
    let f = processing("snap");
    let id = registry.insert_flight(f.clone()).await.unwrap();
    registry.insert_project(Project::new("p", "d", Some("alice"), vec![id])).await;
    registry.save(&path).await.unwrap();

    let loaded = FlightRegistry::load(&path).await.unwrap();
    assert_eq!(loaded.flight(id).await, Some(f));
    assert_eq!(loaded.flights_of(Some("alice"), false).await.len(), 1);

    let missing = FlightRegistry::load(&dir.path().join("absent.json")).await.unwrap();
    assert!(missing.flight(id).await.is_none());
}

#[tokio::test]
async fn test_removing_flight_detaches_it_from_projects() {
    let registry = FlightRegistry::new();
    let id = registry.insert_flight(flight("a", "alice")).await.unwrap();
    let project = registry.insert_project(Project::new("p", "", Some("alice"), vec![id])).await;
    registry.remove_flight(id).await.unwrap();
    assert!(registry.project(project).await.unwrap().flights().is_empty());
}

#[tokio::test]
async fn test_demo_reassignment_keeps_names_unique() {
    let registry = FlightRegistry::new();
    let alice = registry.insert_flight(flight("north", "alice")).await.unwrap();
    let bob = registry.insert_flight(flight("north", "bob")).await.unwrap();

    registry.reassign_demo(&[alice], None).await.unwrap();
    assert!(matches!(
        registry.reassign_demo(&[bob], None).await,
        Err(RegistryError::DuplicateName(name)) if name == "north"
    ));
    assert_eq!(registry.flight(bob).await.unwrap().owner(), Some("bob"));
    assert_eq!(registry.flights_of(None, false).await.len(), 1);

    registry.insert_flight(flight("north", "root")).await.unwrap();
    assert!(matches!(
        registry.reassign_demo(&[alice], Some("root")).await,
        Err(RegistryError::DuplicateName(_))
    ));
    assert!(registry.flight(alice).await.unwrap().is_demo());
}

#[tokio::test]
async fn test_demo_reassignment_is_all_or_nothing() {
    let registry = FlightRegistry::new();
    let first = registry.insert_flight(flight("south", "alice")).await.unwrap();
    let second = registry.insert_flight(flight("south", "bob")).await.unwrap();
    let other = registry.insert_flight(flight("east", "alice")).await.unwrap();

    assert!(registry.reassign_demo(&[other, first, second], None).await.is_err());
    assert!(registry.flights_of(None, false).await.is_empty());

    registry.update_flight(second, |f| f.set_deleted(true)).await.unwrap();
    registry.reassign_demo(&[other, first, second], None).await.unwrap();
    assert_eq!(registry.flights_of(None, false).await.len(), 2);
    assert!(matches!(registry.restore_flight(second).await, Err(RegistryError::DuplicateName(_))));
}

#[tokio::test]
async fn test_flight_locks_are_exclusive_per_flight() {
    let locks = FlightLocks::new();
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let held = locks.acquire(a).await;
    assert!(locks.try_acquire(a).is_none());
    assert!(locks.try_acquire(b).is_some());
    drop(held);
    assert!(locks.try_acquire(a).is_some());
}

struct ServiceHarness {
    _dir: tempfile::TempDir,
    keychain: Keychain,
    jobs: Arc<FakeJobClient>,
    map: Arc<FakeMapServer>,
}

impl ServiceHarness {
    fn new(jobs: FakeJobClient) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig { data_root: dir.path().to_path_buf(), ..PipelineConfig::default() };
        let jobs = Arc::new(jobs);
        let map = Arc::new(FakeMapServer::default());
        let keychain = Keychain::with_collaborators(
            config,
            FlightRegistry::new(),
            jobs.clone(),
            map.clone(),
            Arc::new(FakeRasterCalculator::default()),
        );
        Self { _dir: dir, keychain, jobs, map }
    }

    fn service(&self) -> FlightService { FlightService::new(&self.keychain) }

    async fn created(&self, name: &str) -> Flight {
        self.service()
            .create_flight(name, Some("alice"), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), CameraKind::Rgb, "")
            .await
            .unwrap()
    }
}

fn callback(uuid: Uuid, code: i64) -> ProcessingCallback {
    ProcessingCallback { uuid, status: CallbackStatus { code }, processing_time: 4200 }
}

#[tokio::test]
async fn test_create_flight_initializes_job() {
    let harness = ServiceHarness::new(FakeJobClient::default());
    let f = harness.created("north").await;
    let calls = harness.jobs.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].starts_with(&format!("init_job {} north http://", f.uuid())));
    assert!(calls[0].contains(r#"{"name":"dsm","value":true}"#));
    assert!(calls[0].contains(r#"{"name":"time","value":true}"#));

    let duplicate = harness
        .service()
        .create_flight("north", Some("alice"), NaiveDate::default(), CameraKind::Rgb, "")
        .await;
    assert!(matches!(duplicate, Err(ServiceError::Registry(RegistryError::DuplicateName(_)))));
    assert_eq!(harness.jobs.calls().len(), 1);
}

#[tokio::test]
async fn test_failed_job_setup_drops_flight() {
    let harness = ServiceHarness::new(FakeJobClient { fail_on: Some("init_job"), ..FakeJobClient::default() });
    let result = harness
        .service()
        .create_flight("north", Some("alice"), NaiveDate::default(), CameraKind::Rgb, "")
        .await;
    assert!(matches!(result, Err(ServiceError::External(_))));
    assert!(harness.service().flights(Some("alice")).await.is_empty());
}

#[tokio::test]
async fn test_upload_and_callbacks_drive_flight() {
    let harness = ServiceHarness::new(FakeJobClient::default());
    let service = harness.service();
    let f = harness.created("north").await;
    assert_eq!(service.job_info(f.uuid()).await.unwrap(), None);

    let images = vec![PathBuf::from("a.jpg"), PathBuf::from("b.jpg")];
    let t = service.upload_images(f.uuid(), &images).await.unwrap();
    assert_eq!(t.to, FlightState::Processing);
    assert!(service.upload_images(f.uuid(), &images).await.is_err());

    let info = service.job_info(f.uuid()).await.unwrap().unwrap();
    assert_eq!(info.num_images, 17);
    assert_eq!(
        serde_json::to_value(info).unwrap(),
        serde_json::json!({"processingTime": 61000, "progress": 42.5, "numImages": 17})
    );

    assert!(service.handle_callback(&callback(f.uuid(), 20)).await.unwrap().is_none());
    let report = service.handle_callback(&callback(f.uuid(), 40)).await.unwrap().unwrap();
    assert_eq!(report.flight, f.uuid());
    assert!(service.handle_callback(&callback(f.uuid(), 40)).await.unwrap().is_none());

    let stored = harness.keychain.registry().flight(f.uuid()).await.unwrap();
    assert_eq!(stored.state(), FlightState::Complete);
    assert_eq!(stored.processing_time(), 4200);
    let ops: Vec<String> =
        harness.jobs.calls().iter().map(|c| c.split(' ').next().unwrap_or_default().to_string()).collect();
    assert_eq!(ops, ["init_job", "upload_images", "commit_job", "job_info"]);
}

#[tokio::test]
async fn test_callback_payload_parsing() {
    let id = Uuid::new_v4();
    let raw = format!(r#"{{"uuid": "{id}", "status": {{"code": 30}}, "processingTime": 1500}}"#);
    let parsed: ProcessingCallback = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed, ProcessingCallback { uuid: id, status: CallbackStatus { code: 30 }, processing_time: 1500 });

    let harness = ServiceHarness::new(FakeJobClient::default());
    let result = harness.service().handle_callback(&parsed).await;
    assert!(matches!(result, Err(ServiceError::Registry(RegistryError::FlightNotFound(_)))));
}

#[tokio::test]
async fn test_resubmit_creates_new_job() {
    let harness = ServiceHarness::new(FakeJobClient::default());
    let service = harness.service();
    let f = harness.created("north").await;
    assert!(matches!(service.resubmit(f.uuid()).await, Err(ServiceError::Transition(_))));

    service.upload_images(f.uuid(), &[PathBuf::from("a.jpg")]).await.unwrap();
    service.handle_callback(&callback(f.uuid(), 30)).await.unwrap();
    let t = service.resubmit(f.uuid()).await.unwrap();
    assert_eq!((t.from, t.to), (FlightState::Error, FlightState::Waiting));
    let calls = harness.jobs.calls();
    assert!(calls[calls.len() - 2].starts_with("remove_job"));
    assert!(calls[calls.len() - 1].starts_with("init_job"));
}

#[tokio::test]
async fn test_flight_deletion_is_two_phase() {
    let harness = ServiceHarness::new(FakeJobClient::default());
    let service = harness.service();
    let f = harness.created("north").await;
    let root = harness.keychain.config().flights_root();
    std::fs::write(f.thumbnail_path(&root), b"png").unwrap();

    assert_eq!(service.delete_flight(f.uuid()).await.unwrap(), Deletion::Soft);
    assert_eq!(service.deleted_flights(Some("alice")).await.len(), 1);
    assert!(service.flights(Some("alice")).await.is_empty());
    assert!(harness.map.calls().is_empty());

    assert_eq!(service.delete_flight(f.uuid()).await.unwrap(), Deletion::Hard);
    assert!(harness.keychain.registry().flight(f.uuid()).await.is_none());
    assert!(!f.thumbnail_path(&root).exists());
    assert!(harness.jobs.calls().last().unwrap().starts_with("remove_job"));
    assert_eq!(harness.map.calls(), [format!("delete_workspace flight_{}", f.uuid())]);
}

#[tokio::test]
async fn test_demo_promotion_and_pause() {
    let harness = ServiceHarness::new(FakeJobClient::default());
    let service = harness.service();
    let f = harness.created("north").await;

    service.make_demo(f.uuid()).await.unwrap();
    let demo = harness.keychain.registry().flight(f.uuid()).await.unwrap();
    assert!(demo.is_demo());
    assert_eq!(demo.owner(), None);
    assert_eq!(service.flights(None).await.len(), 1);

    service.unmake_demo(f.uuid(), "root").await.unwrap();
    assert_eq!(harness.keychain.registry().flight(f.uuid()).await.unwrap().owner(), Some("root"));

    let bob = service
        .create_flight("north", Some("bob"), NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(), CameraKind::Rgb, "")
        .await
        .unwrap();
    service.make_demo(f.uuid()).await.unwrap();
    assert!(matches!(
        service.make_demo(bob.uuid()).await,
        Err(ServiceError::Registry(RegistryError::DuplicateName(_)))
    ));

    assert_eq!(service.pause(f.uuid()).await.unwrap().to, FlightState::Paused);
    assert_eq!(service.resume(f.uuid()).await.unwrap().to, FlightState::Waiting);
}

#[tokio::test]
async fn test_preview_extent_reads_flight_coverage() {
    let harness = ServiceHarness::new(FakeJobClient::default());
    let f = harness.created("north").await;
    let extent = harness.service().preview_extent(f.uuid()).await.unwrap();
    assert_eq!(extent.bbox.maxy, 4.0);
    assert_eq!(harness.map.calls(), [format!("coverage_extent flight_{} ortho odm_orthophoto", f.uuid())]);
}
