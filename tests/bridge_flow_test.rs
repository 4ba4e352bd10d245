//! End-to-end bridge tests
//!
//! Drives the orchestrator with the real process invoker and a fake `claude`
//! script that echoes the resumed session id back.

#![cfg(unix)]

use claude_telegram_bridge::{split_message, Bridge, ClaudeCli, SessionState, TELEGRAM_MAX_LENGTH};
use once_cell::sync::Lazy;
use std::os::unix::fs::PermissionsExt;
use std::sync::Arc;
use tempfile::TempDir;

struct FakeCli {
    dir: TempDir,
}

impl FakeCli {
    fn path(&self, name: &str) -> String {
        self.dir.path().join(name).to_string_lossy().into_owned()
    }
}

static FAKE: Lazy<FakeCli> = Lazy::new(|| {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let scripts: &[(&str, &str)] = &[
        (
            "claude",
            r#"resume=""
prev=""
for arg in "$@"; do
  if [ "$prev" = "--resume" ]; then resume="$arg"; fi
  prev="$arg"
done
if [ -z "$resume" ]; then
  printf '{"session_id":"s1","result":"4"}\n'
else
  printf '{"session_id":"%s","result":"5"}\n' "$resume"
fi"#,
        ),
        ("slow", "exec sleep 30"),
        ("long", "i=0\nwhile [ $i -lt 400 ]; do echo \"line $i of a long answer that keeps going\"; i=$((i+1)); done"),
    ];

    for (name, body) in scripts {
        let path = dir.path().join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("write script");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("chmod script");
    }

    FakeCli { dir }
});

fn bridge(binary: &str, timeout_secs: u64) -> Bridge {
    Bridge::new(
        Arc::new(ClaudeCli::new(FAKE.path(binary))),
        Arc::new(SessionState::new(std::env::temp_dir())),
        timeout_secs,
    )
}

#[tokio::test]
async fn test_conversation_resumes_session() {
    let bridge = bridge("claude", 10);

    assert_eq!(bridge.build_request("2+2?").resume_session_id, None);
    assert_eq!(bridge.execute("2+2?").await, "4");
    assert_eq!(bridge.session().session_id().as_deref(), Some("s1"));

    let next = bridge.build_request("and +1?");
    assert_eq!(next.resume_session_id.as_deref(), Some("s1"));
    assert_eq!(bridge.execute("and +1?").await, "5");
}

#[tokio::test]
async fn test_reset_starts_fresh() {
    let bridge = bridge("claude", 10);
    bridge.execute("hello").await;
    bridge.session().reset();

    assert_eq!(bridge.build_request("again").resume_session_id, None);
}

#[tokio::test]
async fn test_timeout_reply_keeps_session() {
    let bridge = bridge("slow", 1);
    bridge.session().set_session_id("keep");

    let reply = bridge.execute("anything").await;
    assert_eq!(reply, "Command timed out after 1s");
    assert_eq!(bridge.session().session_id().as_deref(), Some("keep"));
}

#[tokio::test]
async fn test_missing_binary_reply() {
    let bridge = Bridge::new(
        Arc::new(ClaudeCli::new("/nonexistent/claude")),
        Arc::new(SessionState::new(std::env::temp_dir())),
        5,
    );

    let reply = bridge.execute("hi").await;
    assert!(reply.starts_with("Error executing command:"));
    assert_eq!(bridge.session().session_id(), None);
}

#[tokio::test]
async fn test_long_plain_reply_is_chunked() {
    let bridge = Arc::new(bridge("long", 10));
    let reply = bridge.spawn_execute("essay".to_string()).await.unwrap();

    assert!(reply.chars().count() > TELEGRAM_MAX_LENGTH);
    let chunks = split_message(&reply, TELEGRAM_MAX_LENGTH);
    assert!(chunks.len() > 1);
    for chunk in &chunks {
        assert!(chunk.chars().count() <= TELEGRAM_MAX_LENGTH);
        assert!(chunk.starts_with("line "));
    }
}
