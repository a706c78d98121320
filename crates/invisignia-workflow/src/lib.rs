//! InviSignia submission workflow and session lifecycle.
//!
//! Orchestrates validation, adaptive compression, remote submission, and
//! result handling for the mark and verify operations, plus the session
//! lifecycle (durable credential storage, invalidation on authorization
//! failure) and the route-access gate.

pub mod backend;
pub mod gate;
pub mod session;
pub mod state;
pub mod test_helpers;
pub mod workflow;

pub use backend::WatermarkBackend;
pub use gate::{decide_access, Access, APP_PATH, LOGIN_PATH, REGISTER_PATH};
pub use session::{CredentialStore, FileCredentialStore, SessionManager};
pub use state::{WorkflowPhase, WorkflowState};
pub use workflow::{MarkOutcome, SubmissionWorkflow, OUTPUT_NAME_SUFFIX};
