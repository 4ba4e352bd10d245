//! Session State
//!
//! Holds the Claude session id used for `--resume` and the directory the CLI
//! runs in. Each field sits behind a lock so reads and writes are never torn,
//! but the read/invoke/write sequence of a prompt is not serialized: two
//! prompts in flight at once both resume the same session and the later
//! writer wins.

use parking_lot::RwLock;
use std::path::{Path, PathBuf};

use crate::error::DirectoryError;

#[derive(Debug, Clone)]
struct State {
    session_id: Option<String>,
    working_dir: PathBuf,
}

/// Conversation continuity for the single allowed chat
#[derive(Debug)]
pub struct SessionState {
    inner: RwLock<State>,
}

impl SessionState {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            inner: RwLock::new(State {
                session_id: None,
                working_dir: working_dir.into(),
            }),
        }
    }

    /// Forget the session; the next prompt starts a fresh conversation
    pub fn reset(&self) {
        let previous = self.inner.write().session_id.take();
        tracing::info!("Session reset (was {:?})", previous);
    }

    pub fn session_id(&self) -> Option<String> {
        self.inner.read().session_id.clone()
    }

    /// Record the id returned by the last successful invocation
    pub fn set_session_id(&self, session_id: impl Into<String>) {
        let session_id = session_id.into();
        let mut state = self.inner.write();
        if state.session_id.as_deref() != Some(session_id.as_str()) {
            tracing::info!("Session ID: {}", session_id);
        }
        state.session_id = Some(session_id);
    }

    pub fn working_dir(&self) -> PathBuf {
        self.inner.read().working_dir.clone()
    }

    /// Snapshot of (session id, working dir) taken under one lock
    pub fn snapshot(&self) -> (Option<String>, PathBuf) {
        let state = self.inner.read();
        (state.session_id.clone(), state.working_dir.clone())
    }

    /// Move to `path`, relative to the current directory unless absolute.
    ///
    /// The target must exist and be a directory; otherwise the working
    /// directory is left untouched. Returns the new absolute path.
    pub fn change_directory(&self, path: &str) -> Result<PathBuf, DirectoryError> {
        let current = self.working_dir();
        let target = resolve(&current, path);

        if !target.exists() {
            return Err(DirectoryError::NotFound(target));
        }
        if !target.is_dir() {
            return Err(DirectoryError::NotADirectory(target));
        }

        let target = target.canonicalize().unwrap_or(target);
        self.inner.write().working_dir = target.clone();
        tracing::info!("Working directory changed to {:?}", target);
        Ok(target)
    }
}

fn resolve(current: &Path, path: &str) -> PathBuf {
    let expanded = PathBuf::from(shellexpand::tilde(path.trim()).as_ref());
    if expanded.is_absolute() {
        expanded
    } else {
        current.join(expanded)
    }
}
