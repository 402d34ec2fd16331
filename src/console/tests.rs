use super::{Command, ConsoleEndpoint, ConsoleMessenger};
use crate::collaborators::fakes::{FakeJobClient, FakeMapServer, FakeRasterCalculator};
use crate::flight_control::{CameraKind, FlightRegistry};
use crate::pipeline::PipelineStep;
use crate::util::{Keychain, PipelineConfig};
use serde_json::{Value, json};
use std::sync::Arc;
use tempfile::TempDir;

fn keychain(dir: &TempDir) -> Keychain {
    let config = PipelineConfig {
        data_root: dir.path().to_path_buf(),
        catalog_path: Some(dir.path().join("catalog.json")),
        ..PipelineConfig::default()
    };
    Keychain::with_collaborators(
        config,
        FlightRegistry::new(),
        Arc::new(FakeJobClient::default()),
        Arc::new(FakeMapServer::default()),
        Arc::new(FakeRasterCalculator::default()),
    )
}

#[test]
fn test_commands_parse_from_tagged_json() {
    let parsed: Command =
        serde_json::from_str(r#"{"command": "retry_step", "flight": "67e55044-10b1-426f-9247-bb680e5fe0c8", "step": "annotated_overlay"}"#)
            .unwrap();
    assert!(matches!(parsed, Command::RetryStep { step: PipelineStep::AnnotatedOverlay, .. }));
    assert!(parsed.mutates());

    let check: Command = serde_json::from_str(r#"{"command": "check_formula", "formula": "NIR"}"#).unwrap();
    assert_eq!(check, Command::CheckFormula { formula: String::from("NIR"), camera: CameraKind::Multiband });
    assert!(!check.mutates());

    let webhook: Command = serde_json::from_str(
        r#"{"command": "webhook", "uuid": "67e55044-10b1-426f-9247-bb680e5fe0c8", "status": {"code": 40}, "processingTime": 12}"#,
    )
    .unwrap();
    assert!(matches!(webhook, Command::Webhook(cb) if cb.status.code == 40 && cb.processing_time == 12));
}

#[tokio::test]
async fn test_formula_commands() {
    let dir = tempfile::tempdir().unwrap();
    let messenger = ConsoleMessenger::new(&keychain(&dir));

    let valid = messenger.handle_line(r#"{"command": "check_formula", "formula": "(NIR - RED) / (NIR + RED)"}"#).await;
    assert_eq!(valid.result, Some(json!({ "valid": true })));

    let rgb = messenger
        .handle_line(r#"{"command": "check_formula", "formula": "NIR - RED", "camera": "RGB"}"#)
        .await;
    assert!(!rgb.ok);
    assert!(rgb.result.is_none());

    let compiled = messenger.handle_line(r#"{"command": "compile", "index": "ndvi"}"#).await;
    let text = compiled.result.unwrap();
    assert!(text.as_str().unwrap().starts_with("gdal_calc.py -A odm_orthophoto.tif --A_band=3"));

    let invalid = messenger.handle_line(r#"{"command": "compile", "index": "Bad Name", "formula": "NIR"}"#).await;
    assert!(!invalid.ok);
}

#[tokio::test]
async fn test_malformed_and_unknown_commands_fail() {
    let dir = tempfile::tempdir().unwrap();
    let messenger = ConsoleMessenger::new(&keychain(&dir));
    for line in ["not json", r#"{"command": "launch"}"#, r#"{"command": "pause"}"#] {
        let response = messenger.handle_line(line).await;
        assert!(!response.ok);
        assert!(response.error.unwrap().starts_with("malformed command"));
    }
}

#[tokio::test]
async fn test_flight_commands_persist_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let messenger = ConsoleMessenger::new(&keychain(&dir));

    let created = messenger
        .handle_line(r#"{"command": "create_flight", "name": "north", "owner": "alice", "date": "2024-05-01", "camera": "MULTIBAND"}"#)
        .await;
    assert!(created.ok, "{created:?}");
    let flight = created.result.unwrap();
    assert_eq!(flight["state"], json!("WAITING"));
    let id = flight["uuid"].as_str().unwrap().to_string();

    let catalog: Value =
        serde_json::from_slice(&std::fs::read(dir.path().join("catalog.json")).unwrap()).unwrap();
    assert_eq!(catalog["flights"][0]["name"], json!("north"));

    let listed = messenger.handle_line(r#"{"command": "list_flights", "owner": "alice"}"#).await;
    assert_eq!(listed.result.unwrap().as_array().unwrap().len(), 1);

    let info = messenger.handle_line(&format!(r#"{{"command": "job_info", "flight": "{id}"}}"#)).await;
    assert_eq!(info.result, Some(json!({})));

    let paused = messenger.handle_line(&format!(r#"{{"command": "pause", "flight": "{id}"}}"#)).await;
    assert_eq!(paused.result, Some(json!({ "from": "WAITING", "to": "PAUSED" })));

    let deleted = messenger.handle_line(&format!(r#"{{"command": "delete_flight", "flight": "{id}"}}"#)).await;
    assert_eq!(deleted.result, Some(json!("soft")));
}

#[tokio::test]
async fn test_project_commands() {
    let dir = tempfile::tempdir().unwrap();
    let messenger = ConsoleMessenger::new(&keychain(&dir));

    let created = messenger
        .handle_line(r#"{"command": "create_project", "name": "field", "owner": "alice", "flights": []}"#)
        .await;
    assert!(created.ok, "{created:?}");
    let id = created.result.unwrap()["uuid"].as_str().unwrap().to_string();

    let layers = messenger.handle_line(&format!(r#"{{"command": "project_layers", "project": "{id}"}}"#)).await;
    assert_eq!(layers.result, Some(json!([])));

    let index = messenger
        .handle_line(&format!(r#"{{"command": "create_index", "project": "{id}", "index": "ndvi"}}"#))
        .await;
    assert_eq!(index.error.as_deref(), Some("project has no flights"));

    let missing = messenger
        .handle_line(r#"{"command": "create_index", "project": "67e55044-10b1-426f-9247-bb680e5fe0c8", "index": "ndvi"}"#)
        .await;
    assert!(!missing.ok);
}

#[tokio::test]
async fn test_endpoint_answers_every_line() {
    let dir = tempfile::tempdir().unwrap();
    let messenger = ConsoleMessenger::new(&keychain(&dir));
    let input = b"{\"command\": \"check_formula\", \"formula\": \"NIR\"}\n\n   \nbroken\n".as_slice();
    let mut output = Vec::new();

    let answered = ConsoleEndpoint::new(&messenger).serve(input, &mut output).await.unwrap();
    assert_eq!(answered, 2);
    let lines: Vec<Value> = std::str::from_utf8(&output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines[0], json!({ "ok": true, "result": { "valid": true } }));
    assert_eq!(lines[1]["ok"], json!(false));
}
