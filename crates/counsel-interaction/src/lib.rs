pub mod backend;
pub mod http;

pub use backend::{
    ApproveStepRequest, ApproveStepResponse, CaseBackend, FileUpload, RunAgentRequest,
    RunAgentResponse, UploadResponse,
};
pub use http::HttpCaseBackend;
