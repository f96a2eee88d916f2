//! The case store.
//!
//! `CaseStore` owns the single mutable [`CaseState`] and exposes the fixed
//! mutation set consumers are allowed to use; direct field mutation is not
//! possible from outside. Every mutation is atomic with respect to observers
//! and synchronously fans out a full post-mutation snapshot (not a diff) to
//! every subscriber; consumers re-derive what changed by comparison if they
//! need to.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::observe::SubscriptionId;

use super::agent::{AgentCard, AgentPatch};
use super::artifact::Artifact;
use super::file::UploadedFile;
use super::message::{Message, MessageDraft};
use super::model::{CaseRecord, CaseState};
use super::settings::SettingsPatch;
use super::timeline::{StepPatch, TimelineStep};

/// Callback invoked with the full post-mutation state.
pub type StateObserver = Arc<dyn Fn(&CaseState) + Send + Sync>;

/// The single mutable session state, with synchronous observer fan-out.
///
/// Mutations apply in invocation order; observers run on the mutating thread
/// and always see either the pre- or post-state of an operation, never a
/// partial mutation. Operations are infallible; structural correctness is
/// enforced by the entity types at the call boundary.
pub struct CaseStore {
    state: Mutex<CaseState>,
    subscribers: Mutex<Vec<(u64, StateObserver)>>,
    next_subscription: AtomicU64,
}

impl CaseStore {
    /// Creates a store holding the empty default state.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CaseState::default()),
            subscribers: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(1),
        }
    }

    /// Returns a clone of the current state.
    pub fn snapshot(&self) -> CaseState {
        self.state.lock().unwrap().clone()
    }

    /// Registers an observer; it will receive every subsequent post-mutation
    /// snapshot until unsubscribed.
    pub fn subscribe(
        &self,
        observer: impl Fn(&CaseState) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = self.next_subscription.fetch_add(1, Ordering::Relaxed);
        self.subscribers
            .lock()
            .unwrap()
            .push((id, Arc::new(observer)));
        SubscriptionId(id)
    }

    /// Removes an observer. Idempotent; unknown ids are a no-op.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers
            .lock()
            .unwrap()
            .retain(|(sub_id, _)| *sub_id != id.0);
    }

    /// Applies `mutation` under the state lock, then fans the post-state out
    /// to every current subscriber.
    ///
    /// The subscriber list is cloned before invocation so an observer may
    /// subscribe or unsubscribe from within its callback.
    fn mutate<R>(&self, mutation: impl FnOnce(&mut CaseState) -> R) -> R {
        let (result, snapshot) = {
            let mut state = self.state.lock().unwrap();
            let result = mutation(&mut state);
            (result, state.clone())
        };

        let observers: Vec<StateObserver> = {
            let subscribers = self.subscribers.lock().unwrap();
            subscribers.iter().map(|(_, obs)| obs.clone()).collect()
        };
        for observer in observers {
            observer(&snapshot);
        }

        result
    }

    // ============================================================================
    // Mutation operations
    // ============================================================================

    /// Replaces the current case reference.
    pub fn set_case(&self, case: Option<CaseRecord>) {
        self.mutate(|state| state.current_case = case);
    }

    /// Replaces the agent roster wholesale.
    pub fn set_agents(&self, agents: Vec<AgentCard>) {
        self.mutate(|state| state.agents = agents);
    }

    /// Merges `patch` into the agent matching `id`. No-op if absent; a patch
    /// never inserts.
    pub fn update_agent(&self, id: &str, patch: &AgentPatch) {
        self.mutate(|state| {
            if let Some(agent) = state.agents.iter_mut().find(|a| a.id == id) {
                patch.apply(agent);
            } else {
                tracing::debug!(target: "case_store", agent_id = id, "update_agent: unknown id, ignored");
            }
        });
    }

    /// Replaces the timeline wholesale, preserving the given order.
    pub fn set_timeline(&self, timeline: Vec<TimelineStep>) {
        self.mutate(|state| state.timeline = timeline);
    }

    /// Appends a step at the end of the timeline (execution order).
    pub fn add_timeline_step(&self, step: TimelineStep) {
        self.mutate(|state| state.timeline.push(step));
    }

    /// Merges `patch` into the step matching `id`. No-op if absent.
    pub fn update_timeline_step(&self, id: &str, patch: &StepPatch) {
        self.mutate(|state| {
            if let Some(step) = state.timeline.iter_mut().find(|s| s.id == id) {
                patch.apply(step);
            } else {
                tracing::debug!(target: "case_store", step_id = id, "update_timeline_step: unknown id, ignored");
            }
        });
    }

    /// Replaces the artifact list wholesale.
    pub fn set_artifacts(&self, artifacts: Vec<Artifact>) {
        self.mutate(|state| state.artifacts = artifacts);
    }

    /// Appends one artifact reference.
    pub fn add_artifact(&self, artifact: Artifact) {
        self.mutate(|state| state.artifacts.push(artifact));
    }

    /// Appends a message, assigning its id (wall-clock millis) and ISO 8601
    /// timestamp. Existing messages are never mutated.
    pub fn add_message(&self, draft: MessageDraft) -> Message {
        let now = chrono::Utc::now();
        let message = Message {
            id: now.timestamp_millis(),
            role: draft.role,
            agent: draft.agent,
            content: draft.content,
            files: draft.files,
            timestamp: now.to_rfc3339(),
        };
        self.mutate(|state| {
            state.messages.push(message.clone());
        });
        message
    }

    /// Sets the running flag. Has no other side effect; in particular it does
    /// not cancel in-flight work.
    pub fn set_running(&self, is_running: bool) {
        self.mutate(|state| state.is_running = is_running);
    }

    /// Shallow-merges `patch` into the settings; unspecified fields are
    /// unchanged.
    pub fn update_settings(&self, patch: &SettingsPatch) {
        self.mutate(|state| patch.apply(&mut state.settings));
    }

    /// Appends a staged upload.
    pub fn add_uploaded_file(&self, file: UploadedFile) {
        self.mutate(|state| state.uploaded_files.push(file));
    }

    /// Removes the staged upload matching `id`, if present.
    pub fn remove_uploaded_file(&self, id: &str) {
        self.mutate(|state| state.uploaded_files.retain(|f| f.id != id));
    }

    /// Restores empty defaults for all collections and flags, preserving the
    /// current settings.
    pub fn reset(&self) {
        self.mutate(|state| {
            let settings = state.settings.clone();
            *state = CaseState {
                settings,
                ..CaseState::default()
            };
        });
    }
}

impl Default for CaseStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::agent::AgentStatus;
    use crate::case::message::MessageRole;
    use crate::case::settings::Settings;
    use crate::case::timeline::{StepKind, StepStatus};

    fn agent(id: &str) -> AgentCard {
        AgentCard {
            id: id.to_string(),
            name: format!("Agent {id}"),
            kind: "small_claims".to_string(),
            status: AgentStatus::Running,
            progress: 25,
            summary: String::new(),
            artifacts: Vec::new(),
            form_fields: Vec::new(),
            next_steps: Vec::new(),
            win_percentage: 65,
            steps_remaining: 3,
            forms_completed: 1,
            contacts_needed: 2,
            last_update: String::new(),
        }
    }

    fn step(id: &str) -> TimelineStep {
        TimelineStep {
            id: id.to_string(),
            kind: StepKind::Ocr,
            title: format!("Step {id}"),
            description: String::new(),
            status: StepStatus::Pending,
            agent: None,
            duration: None,
            progress: None,
            input: None,
            output: None,
            logs: Vec::new(),
        }
    }

    #[test]
    fn test_message_order_matches_invocation_order() {
        let store = CaseStore::new();

        store.add_message(MessageDraft::user("first", Vec::new()));
        store.add_message(MessageDraft::assistant("Master Agent", "second"));
        store.add_message(MessageDraft::user("third", Vec::new()));

        let state = store.snapshot();
        let contents: Vec<&str> = state.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
        assert_eq!(state.messages[0].role, MessageRole::User);
        assert_eq!(state.messages[1].role, MessageRole::Assistant);
    }

    #[test]
    fn test_timeline_append_preserves_order() {
        let store = CaseStore::new();

        store.set_timeline(vec![step("a"), step("b")]);
        store.add_timeline_step(step("c"));

        let ids: Vec<String> = store.snapshot().timeline.iter().map(|s| s.id.clone()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_update_agent_merges_by_id() {
        let store = CaseStore::new();
        store.set_agents(vec![agent("a1"), agent("a2")]);

        store.update_agent(
            "a2",
            &AgentPatch {
                status: Some(AgentStatus::Completed),
                progress: Some(100),
                ..AgentPatch::default()
            },
        );

        let state = store.snapshot();
        assert_eq!(state.agents[0].status, AgentStatus::Running);
        assert_eq!(state.agents[1].status, AgentStatus::Completed);
        assert_eq!(state.agents[1].progress, 100);
        // Unpatched fields are preserved.
        assert_eq!(state.agents[1].win_percentage, 65);
    }

    #[test]
    fn test_update_agent_unknown_id_is_noop() {
        let store = CaseStore::new();
        store.set_agents(vec![agent("a1")]);
        let before = store.snapshot();

        store.update_agent(
            "missing",
            &AgentPatch {
                progress: Some(100),
                ..AgentPatch::default()
            },
        );

        assert_eq!(store.snapshot().agents, before.agents);
    }

    #[test]
    fn test_update_timeline_step_unknown_id_is_noop() {
        let store = CaseStore::new();
        store.set_timeline(vec![step("s1")]);
        let before = store.snapshot();

        store.update_timeline_step(
            "missing",
            &StepPatch {
                status: Some(StepStatus::Completed),
                ..StepPatch::default()
            },
        );

        assert_eq!(store.snapshot().timeline, before.timeline);
    }

    #[test]
    fn test_reset_preserves_settings() {
        let store = CaseStore::new();
        store.update_settings(&SettingsPatch {
            jurisdiction: Some("NY".to_string()),
            max_depth: Some(8),
            ..SettingsPatch::default()
        });
        store.set_agents(vec![agent("a1")]);
        store.add_message(MessageDraft::user("hello", Vec::new()));
        store.set_running(true);

        store.reset();

        let state = store.snapshot();
        assert!(state.agents.is_empty());
        assert!(state.timeline.is_empty());
        assert!(state.artifacts.is_empty());
        assert!(state.messages.is_empty());
        assert!(state.uploaded_files.is_empty());
        assert!(!state.is_running);
        assert_eq!(state.settings.jurisdiction, "NY");
        assert_eq!(state.settings.max_depth, 8);
    }

    #[test]
    fn test_settings_partial_merge() {
        let store = CaseStore::new();

        store.update_settings(&SettingsPatch {
            budget: Some(10),
            ..SettingsPatch::default()
        });

        let settings = store.snapshot().settings;
        let defaults = Settings::default();
        assert_eq!(settings.budget, 10);
        assert_eq!(settings.thoroughness, defaults.thoroughness);
        assert_eq!(settings.jurisdiction, defaults.jurisdiction);
    }

    #[test]
    fn test_set_case_and_artifacts() {
        let store = CaseStore::new();

        store.set_case(Some(CaseRecord {
            id: "case-1".to_string(),
            memory: serde_json::json!({"conversations": []}),
        }));
        store.set_artifacts(vec![Artifact {
            path: "artifacts/demand-letter.pdf".to_string(),
            name: "demand-letter.pdf".to_string(),
            kind: "pdf".to_string(),
            size: None,
        }]);
        store.add_artifact(Artifact {
            path: "artifacts/complaint.pdf".to_string(),
            name: "complaint.pdf".to_string(),
            kind: "pdf".to_string(),
            size: Some(2048),
        });

        let state = store.snapshot();
        assert_eq!(state.current_case.as_ref().map(|c| c.id.as_str()), Some("case-1"));
        let names: Vec<&str> = state.artifacts.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["demand-letter.pdf", "complaint.pdf"]);
    }

    #[test]
    fn test_remove_uploaded_file_by_id() {
        let store = CaseStore::new();
        store.add_uploaded_file(UploadedFile {
            id: "f1".to_string(),
            name: "lease.pdf".to_string(),
            size: 1024,
            mime_type: "application/pdf".to_string(),
            extracted_text: None,
        });
        store.add_uploaded_file(UploadedFile {
            id: "f2".to_string(),
            name: "photo.png".to_string(),
            size: 2048,
            mime_type: "image/png".to_string(),
            extracted_text: None,
        });

        store.remove_uploaded_file("f1");

        let files = store.snapshot().uploaded_files;
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].id, "f2");
    }

    #[test]
    fn test_subscriber_receives_post_state() {
        let store = CaseStore::new();
        let seen: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));

        let seen_clone = seen.clone();
        store.subscribe(move |state| {
            seen_clone.lock().unwrap().push(state.messages.len());
        });

        store.add_message(MessageDraft::user("one", Vec::new()));
        store.add_message(MessageDraft::user("two", Vec::new()));

        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let store = CaseStore::new();
        let seen: Arc<Mutex<usize>> = Arc::new(Mutex::new(0));

        let seen_clone = seen.clone();
        let id = store.subscribe(move |_| {
            *seen_clone.lock().unwrap() += 1;
        });

        store.set_running(true);
        store.unsubscribe(id);
        store.unsubscribe(id); // second call is a no-op
        store.set_running(false);

        assert_eq!(*seen.lock().unwrap(), 1);
    }

    #[test]
    fn test_two_subscribers_both_notified() {
        let store = CaseStore::new();
        let first: Arc<Mutex<usize>> = Arc::new(Mutex::new(0));
        let second: Arc<Mutex<usize>> = Arc::new(Mutex::new(0));

        let first_clone = first.clone();
        store.subscribe(move |_| *first_clone.lock().unwrap() += 1);
        let second_clone = second.clone();
        store.subscribe(move |_| *second_clone.lock().unwrap() += 1);

        store.set_running(true);

        assert_eq!(*first.lock().unwrap(), 1);
        assert_eq!(*second.lock().unwrap(), 1);
    }
}
