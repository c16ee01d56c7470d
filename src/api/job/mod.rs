pub mod models;
pub mod dto;
pub mod handlers;
pub mod service;

// Re-export commonly used types
pub use dto::JobListDto;
pub use models::{Job, JobStage, JobUrgency};
pub use service::JobService;
