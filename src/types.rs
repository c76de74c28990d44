use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::parsing::DateRange;

/// Field id of the "deployment type" custom field carrying the managed
/// Kubernetes tags.
pub const DEPLOYMENT_FIELD_ID: u64 = 1_260_826_362_790;

pub const DEFAULT_OUTPUT_FILE: &str = "./k8s.txt";

#[derive(Debug, Clone)]
pub struct Config {
    pub range: DateRange,
    /// Dates exactly as given on the command line, echoed in the report.
    pub start_raw: String,
    pub end_raw: String,
    pub zendesk: ZendeskConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ZendeskConfig {
    pub base_url: String,
    pub email: String,
    pub token: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    New,
    Open,
    Pending,
    Hold,
    Solved,
    Closed,
    Deleted,
    #[serde(other)]
    Unknown,
}

impl TicketStatus {
    pub fn is_finished(self) -> bool {
        matches!(self, TicketStatus::Closed | TicketStatus::Solved)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ticket {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub status: TicketStatus,
    #[serde(default)]
    pub organization_id: Option<u64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub custom_fields: Vec<CustomFieldEntry>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CustomFieldEntry {
    pub id: u64,
    #[serde(default, deserialize_with = "tag_set")]
    pub value: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub body: String,
}

impl Comment {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

/// One page of the full ticket listing. `next` is the absolute URL of the
/// following page, absent on the last page.
#[derive(Debug, Clone, Default)]
pub struct TicketPage {
    pub tickets: Vec<Ticket>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Deployment custom field names AKS or EKS.
    ManagedK8s,
    /// A comment mentions kubectl.
    KeywordK8s,
    NotK8s,
}

impl Classification {
    pub fn is_k8s(self) -> bool {
        !matches!(self, Classification::NotK8s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgSummary {
    pub org_name: String,
    pub k8s_count: u32,
    pub non_k8s_count: u32,
}

impl OrgSummary {
    pub fn new(org_name: impl Into<String>) -> Self {
        Self {
            org_name: org_name.into(),
            k8s_count: 0,
            non_k8s_count: 0,
        }
    }

    pub fn total(&self) -> u32 {
        self.k8s_count + self.non_k8s_count
    }
}

/// Run-wide tallies threaded through the ticket pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunCounters {
    pub total_seen: u32,
    /// Tickets that passed every filter and were aggregated.
    pub in_range: u32,
    /// Tickets classified by the comment keyword, not the deployment field.
    pub keyword_hits: u32,
    pub skipped_no_org: u32,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<CustomFieldEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let fields: Option<Vec<Option<CustomFieldEntry>>> = Option::deserialize(deserializer)?;
    Ok(fields.unwrap_or_default().into_iter().flatten().collect())
}

// Tagger fields arrive as arrays, dropdowns as a single string.
fn tag_set<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
        ),
        serde_json::Value::String(s) => Some(vec![s]),
        _ => None,
    })
}
