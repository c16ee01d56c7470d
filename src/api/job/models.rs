use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Job urgency levels
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum JobUrgency {
    Low,
    Medium,
    High,
    Critical,
}

impl JobUrgency {
    pub const ALL: [JobUrgency; 4] = [
        JobUrgency::Low,
        JobUrgency::Medium,
        JobUrgency::High,
        JobUrgency::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobUrgency::Low => "Low",
            JobUrgency::Medium => "Medium",
            JobUrgency::High => "High",
            JobUrgency::Critical => "Critical",
        }
    }
}

/// Workflow position of a job
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobStage {
    #[default]
    NotStarted,
    InProgress,
    InAudit,
    Complete,
}

impl JobStage {
    pub const ALL: [JobStage; 4] = [
        JobStage::NotStarted,
        JobStage::InProgress,
        JobStage::InAudit,
        JobStage::Complete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStage::NotStarted => "NotStarted",
            JobStage::InProgress => "InProgress",
            JobStage::InAudit => "InAudit",
            JobStage::Complete => "Complete",
        }
    }
}

/// Returned when stored text does not name a known variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown variant: {}", self.0)
    }
}

impl FromStr for JobUrgency {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobUrgency::ALL
            .into_iter()
            .find(|u| u.as_str() == s)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

impl FromStr for JobStage {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobStage::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

/// A field-service work order
///
/// Wire names follow the public contract (`ID`, `Title`, `ClientName`, ...).
/// The id is assigned on construction and never changes afterwards.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct Job {
    #[serde(rename = "ID")]
    pub id: Uuid,

    pub urgency: JobUrgency,

    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[validate(length(min = 1, message = "ClientName is required"))]
    pub client_name: String,

    #[validate(length(min = 1, message = "StaffName is required"))]
    pub staff_name: String,

    #[serde(default)]
    pub phone: Option<String>,

    #[serde(default)]
    pub address: Option<String>,

    #[serde(default)]
    pub stage: JobStage,

    pub installation_date: DateTime<Utc>,
}

impl Job {
    /// Create a job with a fresh id in the `NotStarted` stage
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        urgency: JobUrgency,
        title: impl Into<String>,
        description: Option<String>,
        client_name: impl Into<String>,
        staff_name: impl Into<String>,
        phone: Option<String>,
        address: Option<String>,
        installation_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            urgency,
            title: title.into(),
            description,
            client_name: client_name.into(),
            staff_name: staff_name.into(),
            phone,
            address,
            stage: JobStage::NotStarted,
            installation_date,
        }
    }

    /// Randomised demo job drawn from the fixed sample pools.
    ///
    /// Skips field validation; only meant for demo and test data.
    pub fn sample() -> Self {
        Self::sample_with(&mut rand::thread_rng())
    }

    /// Same as [`Job::sample`] but with a caller supplied generator,
    /// so tests can seed it.
    pub fn sample_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let offset = Duration::seconds(rng.gen_range(0..SAMPLE_DATE_WINDOW_DAYS * 24 * 60 * 60));

        let mut job = Job::new(
            *pick(rng, &JobUrgency::ALL),
            *pick(rng, &SAMPLE_TITLES),
            Some(pick(rng, &SAMPLE_DESCRIPTIONS).to_string()),
            *pick(rng, &SAMPLE_NAMES),
            *pick(rng, &SAMPLE_NAMES),
            Some(SAMPLE_PHONE.to_string()),
            Some(pick(rng, &SAMPLE_ADDRESSES).to_string()),
            Utc::now() + offset,
        );
        job.stage = *pick(rng, &JobStage::ALL);
        job
    }
}

/// Uniform choice from a fixed, non-empty pool
fn pick<'a, T, R: Rng + ?Sized>(rng: &mut R, pool: &'a [T]) -> &'a T {
    &pool[rng.gen_range(0..pool.len())]
}

const SAMPLE_DATE_WINDOW_DAYS: i64 = 100;

const SAMPLE_PHONE: &str = "0400 000 000";

const SAMPLE_TITLES: [&str; 6] = [
    "Solar roof installation",
    "Energy efficiency lighting upgrade",
    "Solar hot water system",
    "Energy efficiency utility replacement",
    "Passive cooling system conversion",
    "Resistive heating system replacement",
];

const SAMPLE_DESCRIPTIONS: [&str; 1] = ["Job detailed description goes here"];

const SAMPLE_NAMES: [&str; 12] = [
    "Joe Blogs",
    "Jane Doe",
    "Joel Kajetan",
    "Séraphine Priyanka",
    "Joel Shawnee",
    "Miluše Asma",
    "Julius Sigrid",
    "Neilos Inés",
    "Domagoj Gerlinde",
    "Evandrus Gabino",
    "Evgenia Sheridan",
    "Ljilja Sedna",
];

const SAMPLE_ADDRESSES: [&str; 10] = [
    "7671 Anna Meadow, Suite 366, 7757, Port Mackenziechester, Western Australia, Australia",
    "72 Towne Knoll, Apt. 947, 3311, Blakeville, Victoria, Australia",
    "98 Jonathan Pass, Suite 926, 6309, Hayesside, New South Wales, Australia",
    "7294 Kuhn Road, Suite 691, 3132, West Alexandra, New South Wales, Australia",
    "43 Lincoln Circle, Suite 913, 8610, Samuelburgh, Tasmania, Australia",
    "490 Lincoln Ridge, Apt. 597, 5074, New Samanthaport, Western Australia, Australia",
    "1254 Greenfelder Island, Apt. 323, 2869, East Maddisonmouth, New South Wales, Australia",
    "5393 Heidi Summit, Suite 500, 8248, Lake Mitchellburgh, Tasmania, Australia",
    "53 Alexis Terrace, Apt. 440, 6120, Sophiashire, New South Wales, Australia",
    "097 Doherty Boulevard, Suite 951, 3073, Mayamouth, South Australia, Australia",
];

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn new_job_starts_not_started_with_fresh_id() {
        let a = Job::new(JobUrgency::High, "t", None, "c", "s", None, None, Utc::now());
        let b = Job::new(JobUrgency::High, "t", None, "c", "s", None, None, Utc::now());

        assert_eq!(a.stage, JobStage::NotStarted);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn samples_draw_from_fixed_pools() {
        let mut rng = StdRng::seed_from_u64(7);
        let now = Utc::now();

        for _ in 0..50 {
            let job = Job::sample_with(&mut rng);
            assert!(SAMPLE_TITLES.contains(&job.title.as_str()));
            assert!(SAMPLE_NAMES.contains(&job.client_name.as_str()));
            assert!(SAMPLE_NAMES.contains(&job.staff_name.as_str()));
            assert_eq!(job.phone.as_deref(), Some(SAMPLE_PHONE));
            assert!(SAMPLE_ADDRESSES.contains(&job.address.as_deref().unwrap()));
            assert!(job.installation_date >= now);
            assert!(job.installation_date <= Utc::now() + Duration::days(SAMPLE_DATE_WINDOW_DAYS));
        }
    }

    #[test]
    fn seeded_samples_are_reproducible_apart_from_id() {
        let a = Job::sample_with(&mut StdRng::seed_from_u64(42));
        let b = Job::sample_with(&mut StdRng::seed_from_u64(42));

        assert_eq!(a.title, b.title);
        assert_eq!(a.urgency, b.urgency);
        assert_eq!(a.stage, b.stage);
        assert_eq!(a.client_name, b.client_name);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn enums_serialize_as_names() {
        assert_eq!(serde_json::to_string(&JobStage::InAudit).unwrap(), "\"InAudit\"");
        assert_eq!(serde_json::to_string(&JobUrgency::Critical).unwrap(), "\"Critical\"");
        assert_eq!("InProgress".parse::<JobStage>(), Ok(JobStage::InProgress));
        assert!("Done".parse::<JobStage>().is_err());
    }

    #[test]
    fn job_uses_contract_field_names() {
        let job = Job::new(JobUrgency::Low, "Title", None, "Client", "Staff", None, None, Utc::now());
        let value = serde_json::to_value(&job).unwrap();

        assert!(value.get("ID").is_some());
        assert_eq!(value["ClientName"], "Client");
        assert_eq!(value["Stage"], "NotStarted");
        assert!(value.get("InstallationDate").is_some());
    }

    #[test]
    fn blank_required_fields_fail_validation() {
        let job = Job::new(JobUrgency::Low, "", None, "Client", "", None, None, Utc::now());
        let errors = job.validate().unwrap_err();
        let fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|k| k.to_lowercase().replace('_', ""))
            .collect();

        assert_eq!(fields.len(), 2);
        assert!(fields.contains(&"title".to_string()));
        assert!(fields.contains(&"staffname".to_string()));
    }
}
