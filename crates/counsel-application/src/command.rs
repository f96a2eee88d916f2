//! The command pipeline: run-agent submission.
//!
//! One submission turns a user prompt plus the currently staged files into a
//! backend round-trip and a consistent multi-part state update. From the
//! caller's perspective it is a single logical transaction, implemented as
//! sequential store mutations. Exactly one assistant-role message is appended
//! per invocation, whatever the outcome.
//!
//! The pipeline performs no reentrancy guard: the `is_running` flag is the
//! cooperative mutual-exclusion signal and consumers are expected to disable
//! submission while it is set.

use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

use counsel_core::case::{CaseStore, FileRef, MessageDraft};
use counsel_interaction::{CaseBackend, RunAgentRequest};

/// Sender name for successful agent responses.
pub const MASTER_AGENT: &str = "Master Agent";

/// Sender name for locally generated recovery messages.
pub const SYSTEM_SENDER: &str = "System";

/// Assistant message used when the backend omits a summary.
pub const FALLBACK_SUMMARY: &str =
    "I've analyzed your case and deployed specialized agents to help you.";

/// Assistant message substituted when the backend call fails.
pub const RUN_ERROR_MESSAGE: &str =
    "Sorry, I encountered an error processing your request. Please check your API key and try again.";

/// Assistant message appended when a run was stopped mid-flight.
pub const RUN_STOPPED_MESSAGE: &str =
    "The run was stopped before the agents finished. Partial results were discarded.";

/// Restores `is_running = false` on every exit path, panic included.
struct RunningGuard {
    store: Arc<CaseStore>,
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.store.set_running(false);
    }
}

/// Submits user prompts to the backend agent workflow and applies the result
/// to the case store.
pub struct CommandPipeline {
    store: Arc<CaseStore>,
    backend: Arc<dyn CaseBackend>,
    user_id: String,
    /// Cancellation token of the current submission generation. `stop()`
    /// cancels it; a response landing afterwards is discarded.
    generation: Mutex<CancellationToken>,
}

impl CommandPipeline {
    /// Creates a pipeline bound to a store and backend.
    pub fn new(store: Arc<CaseStore>, backend: Arc<dyn CaseBackend>, user_id: impl Into<String>) -> Self {
        Self {
            store,
            backend,
            user_id: user_id.into(),
            generation: Mutex::new(CancellationToken::new()),
        }
    }

    /// Runs one command submission.
    ///
    /// A prompt that is empty after trimming is silently ignored. Every
    /// failure mode degrades to a visible conversation message; nothing is
    /// returned or propagated to the caller.
    pub async fn submit(&self, prompt: &str) {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            tracing::debug!(target: "command", "Ignoring empty submission");
            return;
        }

        let staged = self.store.snapshot().uploaded_files;
        let file_refs: Vec<FileRef> = staged
            .iter()
            .map(|f| FileRef {
                id: f.id.clone(),
                name: f.name.clone(),
            })
            .collect();
        let file_ids: Vec<String> = staged.iter().map(|f| f.id.clone()).collect();

        // The user's input is recorded before any network activity so it is
        // never lost to a failed call.
        self.store
            .add_message(MessageDraft::user(prompt, file_refs));

        self.store.set_running(true);
        let _guard = RunningGuard {
            store: self.store.clone(),
        };

        let token = self.next_generation();

        let result = self
            .backend
            .run_agent(RunAgentRequest {
                user_id: self.user_id.clone(),
                prompt: prompt.to_string(),
                files: file_ids,
            })
            .await;

        if token.is_cancelled() {
            tracing::warn!(target: "command", "Discarding agent response from a stopped run");
            self.store
                .add_message(MessageDraft::assistant(SYSTEM_SENDER, RUN_STOPPED_MESSAGE));
            return;
        }

        match result {
            Ok(response) => {
                // Missing response fields arrive as empty collections, so a
                // sparse response never leaves stale state behind.
                self.store.set_agents(response.agents);
                self.store.set_timeline(response.timeline);
                self.store.set_artifacts(response.artifacts);

                let summary = response
                    .summary
                    .unwrap_or_else(|| FALLBACK_SUMMARY.to_string());
                self.store
                    .add_message(MessageDraft::assistant(MASTER_AGENT, summary));
            }
            Err(err) => {
                tracing::error!(target: "command", "Agent run failed: {}", err);
                self.store
                    .add_message(MessageDraft::assistant(SYSTEM_SENDER, RUN_ERROR_MESSAGE));
            }
        }
    }

    /// Stops the current run from the user's point of view.
    ///
    /// The in-flight backend call is not aborted; its eventual result is
    /// discarded because its generation token is cancelled here. The running
    /// flag clears immediately.
    pub fn stop(&self) {
        self.generation.lock().unwrap().cancel();
        self.store.set_running(false);
    }

    /// Replaces the current generation token with a fresh one and returns it.
    fn next_generation(&self) -> CancellationToken {
        let token = CancellationToken::new();
        *self.generation.lock().unwrap() = token.clone();
        token
    }
}
