use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::api::job::models::{Job, JobStage, JobUrgency};
use crate::db::error::StoreError;

/// Storage representation of a job, enums and id kept as text
#[derive(Debug, FromRow)]
pub struct JobRow {
    pub id: String,
    pub urgency: String,
    pub title: String,
    pub description: Option<String>,
    pub client_name: String,
    pub staff_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub stage: String,
    pub installation_date: DateTime<Utc>,
}

impl TryFrom<JobRow> for Job {
    type Error = StoreError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        let corrupt = |reason: String| StoreError::CorruptRow {
            id: row.id.clone(),
            reason,
        };

        let id = Uuid::parse_str(&row.id).map_err(|e| corrupt(e.to_string()))?;
        let urgency = row
            .urgency
            .parse::<JobUrgency>()
            .map_err(|e| corrupt(e.to_string()))?;
        let stage = row
            .stage
            .parse::<JobStage>()
            .map_err(|e| corrupt(e.to_string()))?;

        Ok(Job {
            id,
            urgency,
            title: row.title,
            description: row.description,
            client_name: row.client_name,
            staff_name: row.staff_name,
            phone: row.phone,
            address: row.address,
            stage,
            installation_date: row.installation_date,
        })
    }
}
