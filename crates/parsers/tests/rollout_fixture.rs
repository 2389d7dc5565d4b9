use playback_core::ToolStatus;
use playback_parsers::{ingest_file, InputFormat};
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[test]
fn rollout_fixture_reconstructs_three_steps() {
    let path = fixture("rollout.jsonl");
    assert_eq!(InputFormat::from_path(&path), InputFormat::EventStream);

    let session = ingest_file(&path).expect("ingest rollout fixture");
    assert_eq!(session.title, "Playback");
    assert_eq!(session.steps.len(), 3);

    let ids: Vec<_> = session.steps.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, ["t1", "t2", "t3"]);

    let first = &session.steps[0];
    assert_eq!(first.timestamp.as_deref(), Some("2026-02-03T04:11:02.001Z"));
    assert_eq!(first.user_text, "Why does the login test fail?");
    assert_eq!(first.agent_summary, "The fixture password changed.");
    assert_eq!(first.reasoning_summary, "**Inspecting the failing test**");
    assert_eq!(
        first.agent_output,
        "The fixture password changed. Update tests/fixtures/user.json."
    );
    assert_eq!(first.tools.len(), 2);
    assert_eq!(first.tools[0].name, "shell");
    assert_eq!(first.tools[0].call_id, "call_A1");
    assert_eq!(first.tools[0].status, ToolStatus::Ok);
    assert!(first.tools[0].output.contains("tests/login.rs:12"));
    // call_A2's output only arrives after the next prompt.
    assert_eq!(first.tools[1].status, ToolStatus::Pending);
    assert!(first.tools[1].output.is_empty());

    let second = &session.steps[1];
    assert_eq!(second.user_text, "Please update it");
    let names: Vec<_> = second.tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["apply_patch", "shell"]);
    assert!(second.tools.iter().all(|t| t.status == ToolStatus::Ok));
    assert_eq!(second.reasoning_summary, "Used tools: apply_patch, shell.");

    let third = &session.steps[2];
    assert_eq!(third.user_text, "thanks");
    assert_eq!(third.reasoning_summary, "Responded to: \"thanks\".");
}

#[test]
fn session_document_passes_through_unchanged() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("session.json");
    let document = serde_json::json!({
        "title": "Shared replay",
        "createdAt": "2026-02-03T04:11:00.000Z",
        "steps": [{
            "id": "t1",
            "user_text": "hello",
            "agent_summary": "",
            "reasoning_summary": "",
            "agent_output": "",
            "tools": [{"name": "ls", "arguments": "", "call_id": "", "output": "", "status": "pending"}]
        }],
        "meta": {}
    });
    std::fs::write(&path, document.to_string()).expect("write document");

    let session = ingest_file(&path).expect("ingest document");
    assert_eq!(serde_json::to_value(&session).unwrap(), document);
}

#[test]
fn missing_file_is_an_error() {
    let err = ingest_file(&fixture("does-not-exist.jsonl")).unwrap_err();
    assert!(format!("{err:#}").contains("Failed to read"));
}
