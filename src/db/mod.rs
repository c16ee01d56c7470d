pub mod connection;
pub mod error;
pub mod job_repository;
pub mod migrations;
pub mod models;

pub use error::StoreError;
pub use job_repository::JobRepository;
