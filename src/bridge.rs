//! Execution Orchestrator
//!
//! Public entry point of the bridge: prompt in, reply text out. Each call
//! builds one [`InvocationRequest`] from the current [`SessionState`], runs it
//! exactly once and writes any returned session id back so the next prompt
//! resumes the same conversation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::invoker::{ClaudeCli, InvocationRequest, Invoker};
use crate::parser;
use crate::session::SessionState;

/// Prompt → Claude CLI → reply, with session continuity
pub struct Bridge {
    invoker: Arc<dyn Invoker>,
    session: Arc<SessionState>,
    timeout_secs: AtomicU64,
}

impl Bridge {
    pub fn new(invoker: Arc<dyn Invoker>, session: Arc<SessionState>, timeout_secs: u64) -> Self {
        Self {
            invoker,
            session,
            timeout_secs: AtomicU64::new(timeout_secs.max(1)),
        }
    }

    /// Create from config using the real CLI
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(ClaudeCli::from_config(config)),
            Arc::new(SessionState::new(config.working_dir.clone())),
            config.timeout_secs,
        )
    }

    pub fn session(&self) -> &Arc<SessionState> {
        &self.session
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs.load(Ordering::Relaxed)
    }

    /// Change the timeout for subsequent prompts; zero is ignored
    pub fn set_timeout_secs(&self, secs: u64) {
        if secs == 0 {
            return;
        }
        self.timeout_secs.store(secs, Ordering::Relaxed);
        tracing::info!("Timeout set to {}s", secs);
    }

    /// Request for `prompt` from the current session state
    pub fn build_request(&self, prompt: &str) -> InvocationRequest {
        let (resume_session_id, working_dir) = self.session.snapshot();
        InvocationRequest {
            prompt: prompt.to_string(),
            resume_session_id,
            working_dir,
            timeout_secs: self.timeout_secs(),
        }
    }

    /// Run one prompt and return the text to show the user.
    ///
    /// Never fails: spawn and I/O errors come back as an error message and
    /// leave the session untouched.
    pub async fn execute(&self, prompt: &str) -> String {
        let request = self.build_request(prompt);

        let result = match self.invoker.invoke(&request).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Failed to execute claude command: {}", e);
                return format!("Error executing command: {}", e);
            }
        };

        let parsed = parser::parse(&result, request.timeout_secs);
        if let Some(session_id) = parsed.session_id {
            self.session.set_session_id(session_id);
        }

        parsed.text
    }

    /// Run [`execute`](Self::execute) on the runtime and hand back its task
    pub fn spawn_execute(self: &Arc<Self>, prompt: String) -> JoinHandle<String> {
        let bridge = Arc::clone(self);
        tokio::spawn(async move { bridge.execute(&prompt).await })
    }
}
