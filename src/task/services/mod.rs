//! Application services for the task and test task workflow.

mod access;
mod blockers;
mod comments;
mod error;
mod notify;
mod policy;
mod requests;
mod scope;
mod sweeper;
mod view;
mod workflow;

pub use access::TaskAccessGuard;
pub use error::{ErrorKind, MissingEntity, TaskServiceError, TaskServiceResult};
pub use notify::StatusNotifier;
pub use policy::{TesterVisibility, WorkflowPolicy};
pub use requests::{
    AddCommentRequest, AssigneeInput, CreateTaskRequest, TaskPatch, UploadedFile,
    decode_legacy_filename,
};
pub use scope::TaskScopeResolver;
pub use sweeper::{
    DEFAULT_SWEEP_INTERVAL, ExpirySweeper, SweepItemError, SweepReport, SweeperHandle,
};
pub use view::TaskView;
pub use workflow::TaskWorkflowService;
