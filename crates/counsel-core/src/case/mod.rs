//! Case session domain module.
//!
//! This module contains the session state model, its entity types, and the
//! [`CaseStore`] that owns and mutates them.
//!
//! # Module Structure
//!
//! - `model`: The full session state (`CaseState`, `CaseRecord`)
//! - `message`: Conversation types (`Message`, `MessageDraft`, `MessageRole`)
//! - `agent`: Sub-agent roster types (`AgentCard`, `AgentPatch`, ...)
//! - `timeline`: Execution timeline types (`TimelineStep`, `StepPatch`, ...)
//! - `artifact`: Backend document references (`Artifact`)
//! - `file`: Staged uploads (`UploadedFile`)
//! - `settings`: User-tunable settings (`Settings`, `SettingsPatch`)
//! - `store`: The store itself (`CaseStore`)

mod agent;
mod artifact;
mod file;
mod message;
mod model;
mod settings;
mod store;
mod timeline;

// Re-export public API
pub use agent::{AgentCard, AgentPatch, AgentStatus, FormField, FormFieldKind, NextStep, SelectOption};
pub use artifact::Artifact;
pub use file::UploadedFile;
pub use message::{FileRef, Message, MessageDraft, MessageRole};
pub use model::{CaseRecord, CaseState};
pub use settings::{Settings, SettingsPatch};
pub use store::{CaseStore, StateObserver};
pub use timeline::{StepKind, StepPatch, StepStatus, TimelineStep};
