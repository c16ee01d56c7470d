use sqlx::{Pool, Sqlite, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::api::job::models::{Job, JobStage};
use crate::db::error::StoreError;
use crate::db::models::JobRow;

const JOB_COLUMNS: &str = "id, urgency, title, description, client_name, staff_name, phone, address, stage, installation_date";

/// Rows per multi-row INSERT, keeps well under SQLite's bound parameter limit
const INSERT_CHUNK: usize = 500;

/// Repository for Job database operations
pub struct JobRepository;

impl JobRepository {
    /// List jobs, optionally filtered to one stage
    ///
    /// Skips `start` rows, then keeps at most `count` rows unless `count` is 0.
    /// Neither value is checked here; SQLite decides what negative values mean.
    /// Rows come back in the store's natural order.
    pub async fn list_jobs(
        pool: &Pool<Sqlite>,
        stage: Option<JobStage>,
        start: i64,
        count: i64,
    ) -> Result<Vec<Job>, StoreError> {
        debug!("Listing jobs: stage={:?}, start={}, count={}", stage, start, count);

        // LIMIT -1 is SQLite for "no limit"
        let limit = if count != 0 { count } else { -1 };
        let sql = format!(
            "SELECT {} FROM jobs WHERE (?1 IS NULL OR stage = ?1) LIMIT ?2 OFFSET ?3",
            JOB_COLUMNS
        );

        let rows = sqlx::query_as::<_, JobRow>(&sql)
            .bind(stage.map(|s| s.as_str()))
            .bind(limit)
            .bind(start)
            .fetch_all(pool)
            .await?;

        debug!("Listed {} jobs", rows.len());
        rows.into_iter().map(Job::try_from).collect()
    }

    /// Find a job by id, `None` when nothing matches
    pub async fn get_job(pool: &Pool<Sqlite>, id: Uuid) -> Result<Option<Job>, StoreError> {
        let sql = format!("SELECT {} FROM jobs WHERE id = ?1", JOB_COLUMNS);

        let row = sqlx::query_as::<_, JobRow>(&sql)
            .bind(id.to_string())
            .fetch_optional(pool)
            .await?;

        row.map(Job::try_from).transpose()
    }

    /// Remove a job and commit
    pub async fn delete_job(pool: &Pool<Sqlite>, job: &Job) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = ?1")
            .bind(job.id.to_string())
            .execute(pool)
            .await?;

        debug!("Deleted job {}: {} rows affected", job.id, result.rows_affected());
        Ok(())
    }

    /// Replace a job wholesale: drop whatever is stored under its id, insert
    /// the given record, commit.
    ///
    /// Does not check that the job existed beforehand.
    pub async fn update_job(pool: &Pool<Sqlite>, job: &Job) -> Result<(), StoreError> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM jobs WHERE id = ?1")
            .bind(job.id.to_string())
            .execute(&mut *tx)
            .await?;
        insert_jobs(&mut tx, std::slice::from_ref(job)).await?;

        tx.commit().await?;
        debug!("Replaced job {}", job.id);
        Ok(())
    }

    /// Remove every stored job and insert `jobs` in their place, in one
    /// transaction. Returns the number of rows inserted.
    pub async fn reset_jobs(pool: &Pool<Sqlite>, jobs: &[Job]) -> Result<u64, StoreError> {
        let mut tx = pool.begin().await?;

        let removed = sqlx::query("DELETE FROM jobs")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let inserted = insert_jobs(&mut tx, jobs).await?;

        tx.commit().await?;
        debug!("Reset jobs: {} removed, {} inserted", removed, inserted);
        Ok(inserted)
    }

    /// Like [`reset_jobs`](Self::reset_jobs), but builds the `count` new
    /// records with `make` one insert chunk at a time, so at most
    /// `INSERT_CHUNK` of them are held in memory before they are written.
    pub async fn reset_generated<F>(pool: &Pool<Sqlite>, count: usize, mut make: F) -> Result<u64, StoreError>
    where
        F: FnMut() -> Job,
    {
        let mut tx = pool.begin().await?;

        let removed = sqlx::query("DELETE FROM jobs")
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let mut inserted = 0;
        let mut remaining = count;
        while remaining > 0 {
            let batch: Vec<Job> = (0..remaining.min(INSERT_CHUNK)).map(|_| make()).collect();
            remaining -= batch.len();
            inserted += insert_jobs(&mut tx, &batch).await?;
        }

        tx.commit().await?;
        debug!("Reset jobs: {} removed, {} generated", removed, inserted);
        Ok(inserted)
    }
}

/// Multi-row insert, chunked
async fn insert_jobs(tx: &mut Transaction<'_, Sqlite>, jobs: &[Job]) -> Result<u64, sqlx::Error> {
    let mut inserted = 0;

    for chunk in jobs.chunks(INSERT_CHUNK) {
        let mut query = format!("INSERT INTO jobs ({}) VALUES ", JOB_COLUMNS);
        for i in 0..chunk.len() {
            if i > 0 {
                query.push_str(", ");
            }
            query.push_str("(?, ?, ?, ?, ?, ?, ?, ?, ?, ?)");
        }

        let mut query_builder = sqlx::query(&query);
        for job in chunk {
            query_builder = query_builder
                .bind(job.id.to_string())
                .bind(job.urgency.as_str())
                .bind(job.title.as_str())
                .bind(job.description.as_deref())
                .bind(job.client_name.as_str())
                .bind(job.staff_name.as_str())
                .bind(job.phone.as_deref())
                .bind(job.address.as_deref())
                .bind(job.stage.as_str())
                .bind(job.installation_date);
        }

        inserted += query_builder.execute(&mut **tx).await?.rows_affected();
    }

    Ok(inserted)
}
