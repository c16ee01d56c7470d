use actix_web::{
    delete, get, put,
    web::{Data, Path, Query, ServiceConfig, scope},
    HttpResponse,
};
use actix_web_validator::Json;
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use crate::api::auth::ReadAccess;
use crate::api::error::{ApiError, EventId, JobOperation};
use super::models::{Job, JobStage};
use super::service::JobService;

#[derive(Debug, Deserialize)]
struct StageQuery {
    #[serde(default, deserialize_with = "empty_as_no_stage")]
    stage: Option<JobStage>,
}

/// `?stage=` with no value means no filter; unknown names are still rejected
fn empty_as_no_stage<'de, D>(deserializer: D) -> Result<Option<JobStage>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(name) => name.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Deserialize)]
struct SampleQuery {
    #[serde(default = "default_sample_count")]
    count: i32,
}

fn default_sample_count() -> i32 {
    5
}

/// Known defect kept as is: answers a constant and never reads the store
/// or the `stage` filter. Use `/jobs/summary` for real data.
#[get("/list")]
async fn list_jobs(_access: ReadAccess, _query: Query<StageQuery>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(1))
}

#[get("/summary")]
async fn job_summary(
    _access: ReadAccess,
    service: Data<JobService>,
    query: Query<StageQuery>,
) -> Result<HttpResponse, ApiError> {
    let summary = service
        .summary(query.stage)
        .await
        .map_err(|e| ApiError::failed(JobOperation::List, e))?;

    Ok(HttpResponse::Ok().json(summary))
}

/// Destructive: replaces every stored job with `count` random samples
#[get("/sample")]
async fn create_sample_data(
    _access: ReadAccess,
    service: Data<JobService>,
    query: Query<SampleQuery>,
) -> Result<HttpResponse, ApiError> {
    let jobs = service
        .regenerate_samples(query.count)
        .await
        .map_err(|e| ApiError::failed(JobOperation::Sample, e))?;

    Ok(HttpResponse::Ok().json(jobs))
}

/// Always fails, used to check error reporting end to end
#[get("/error")]
async fn forced_error(_access: ReadAccess) -> Result<HttpResponse, ApiError> {
    Err(ApiError::forced())
}

#[get("/{id}")]
async fn get_job(
    _access: ReadAccess,
    service: Data<JobService>,
    path: Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    match service.get_job(id).await {
        Ok(Some(job)) => Ok(HttpResponse::Ok().json(job)),
        Ok(None) => Err(ApiError::NotFound(EventId::Index, id)),
        Err(e) => Err(ApiError::failed(JobOperation::Get(id), e)),
    }
}

/// Full replace; answers with the record as sent, not a re-read
#[put("")]
async fn replace_job(
    _access: ReadAccess,
    service: Data<JobService>,
    job: Json<Job>,
) -> Result<HttpResponse, ApiError> {
    let job = job.into_inner();
    let id = job.id;

    match service.replace_job(job).await {
        Ok(Some(job)) => Ok(HttpResponse::Ok().json(job)),
        Ok(None) => Err(ApiError::NotFound(EventId::Update, id)),
        Err(e) => Err(ApiError::failed(JobOperation::Update(id), e)),
    }
}

#[delete("/{id}")]
async fn delete_job(
    _access: ReadAccess,
    service: Data<JobService>,
    path: Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    match service.delete_job(id).await {
        Ok(true) => Ok(HttpResponse::NoContent().finish()),
        Ok(false) => Err(ApiError::NotFound(EventId::Delete, id)),
        Err(e) => Err(ApiError::failed(JobOperation::Delete(id), e)),
    }
}

/// Fixed paths are registered ahead of `/{id}` so they are matched first.
pub fn job_config(config: &mut ServiceConfig) {
    config.service(
        scope("jobs")
            .service(list_jobs)
            .service(job_summary)
            .service(create_sample_data)
            .service(forced_error)
            .service(get_job)
            .service(replace_job)
            .service(delete_job),
    );
}
