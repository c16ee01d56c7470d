use sqlx::{Pool, Sqlite};
use tracing::info;
use uuid::Uuid;

use crate::db::{JobRepository, StoreError};
use super::dto::JobListDto;
use super::models::{Job, JobStage};

/// Job service containing business logic
///
/// One instance per HTTP worker, built from the pool it is handed.
pub struct JobService {
    pool: Pool<Sqlite>,
}

impl JobService {
    /// Create a new JobService instance
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Summary projection of every job, optionally filtered by stage
    pub async fn summary(&self, stage: Option<JobStage>) -> Result<Vec<JobListDto>, StoreError> {
        let jobs = JobRepository::list_jobs(&self.pool, stage, 0, 0).await?;
        Ok(jobs.iter().map(JobListDto::from).collect())
    }

    /// Drop every stored job and generate `count` random ones
    ///
    /// # Returns
    /// - `Ok(Vec<Job>)` - the full job set after the reset
    /// - `Err(StoreError)` - reset or re-read failed
    pub async fn regenerate_samples(&self, count: i32) -> Result<Vec<Job>, StoreError> {
        info!("Service: Regenerating {} sample jobs", count);

        // zero or negative counts just clear the store
        let count = usize::try_from(count).unwrap_or(0);
        JobRepository::reset_generated(&self.pool, count, Job::sample).await?;

        JobRepository::list_jobs(&self.pool, None, 0, 0).await
    }

    pub async fn get_job(&self, id: Uuid) -> Result<Option<Job>, StoreError> {
        JobRepository::get_job(&self.pool, id).await
    }

    /// Replace an existing job with `job`
    ///
    /// Checks the id exists first, then performs the unconditional replace.
    ///
    /// # Returns
    /// - `Ok(Some(job))` - replaced, echoes the given record
    /// - `Ok(None)` - no job with that id
    pub async fn replace_job(&self, job: Job) -> Result<Option<Job>, StoreError> {
        if JobRepository::get_job(&self.pool, job.id).await?.is_none() {
            return Ok(None);
        }

        JobRepository::update_job(&self.pool, &job).await?;
        info!("Service: Job {} replaced", job.id);
        Ok(Some(job))
    }

    /// Delete a job by id; `Ok(false)` when it does not exist
    pub async fn delete_job(&self, id: Uuid) -> Result<bool, StoreError> {
        let Some(existing) = JobRepository::get_job(&self.pool, id).await? else {
            return Ok(false);
        };

        JobRepository::delete_job(&self.pool, &existing).await?;
        info!("Service: Job {} deleted", id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{connection, migrations};

    async fn service() -> JobService {
        let pool = connection::get_connection("sqlite::memory:", 1).await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        JobService::new(pool)
    }

    #[actix_web::test]
    async fn regenerate_returns_exactly_count_unique_jobs() {
        let service = service().await;
        service.regenerate_samples(3).await.unwrap();

        let jobs = service.regenerate_samples(10).await.unwrap();
        let mut ids: Vec<Uuid> = jobs.iter().map(|j| j.id).collect();
        ids.sort();
        ids.dedup();

        assert_eq!(jobs.len(), 10);
        assert_eq!(ids.len(), 10);
    }

    #[actix_web::test]
    async fn regenerate_with_zero_or_negative_count_empties_store() {
        let service = service().await;
        service.regenerate_samples(4).await.unwrap();

        assert!(service.regenerate_samples(0).await.unwrap().is_empty());
        service.regenerate_samples(4).await.unwrap();
        assert!(service.regenerate_samples(-3).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn summary_filters_by_stage() {
        let service = service().await;
        let jobs = service.regenerate_samples(20).await.unwrap();

        let summary = service.summary(Some(JobStage::InAudit)).await.unwrap();
        let expected = jobs.iter().filter(|j| j.stage == JobStage::InAudit).count();

        assert_eq!(summary.len(), expected);
        assert!(summary.iter().all(|s| s.stage == JobStage::InAudit));
    }

    #[actix_web::test]
    async fn replace_missing_job_is_none() {
        let service = service().await;
        let job = Job::sample();

        assert_eq!(service.replace_job(job.clone()).await.unwrap(), None);
        assert_eq!(service.get_job(job.id).await.unwrap(), None);
    }

    #[actix_web::test]
    async fn delete_twice_reports_missing_second_time() {
        let service = service().await;
        let jobs = service.regenerate_samples(2).await.unwrap();

        assert!(service.delete_job(jobs[0].id).await.unwrap());
        assert!(!service.delete_job(jobs[0].id).await.unwrap());
    }
}
