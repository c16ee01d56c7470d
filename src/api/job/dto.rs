use serde::Serialize;
use uuid::Uuid;

use super::models::{Job, JobStage};

/// Summary view of a job for list responses
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct JobListDto {
    #[serde(rename = "ID")]
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub stage: JobStage,
}

impl From<&Job> for JobListDto {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id,
            title: job.title.clone(),
            description: job.description.clone(),
            stage: job.stage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::job::models::JobUrgency;
    use chrono::Utc;

    #[test]
    fn summary_exposes_only_four_fields() {
        let job = Job::new(
            JobUrgency::Critical,
            "Solar hot water system",
            Some("details".to_string()),
            "Jane Doe",
            "Joe Blogs",
            Some("0400 000 000".to_string()),
            None,
            Utc::now(),
        );

        let value = serde_json::to_value(JobListDto::from(&job)).unwrap();
        let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();

        assert_eq!(keys, ["Description", "ID", "Stage", "Title"]);
        assert_eq!(value["ID"], job.id.to_string());
        assert_eq!(value["Stage"], "NotStarted");
    }
}
