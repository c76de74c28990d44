// Public modules
pub mod types;
pub mod error;
pub mod config;
pub mod parsing;
pub mod classifier;
pub mod aggregator;
pub mod zendesk;
pub mod collector;
pub mod report;
pub mod app;

// Re-export commonly used items
pub use types::*;
pub use error::{ApiError, ReportError, ReportResult};
pub use config::{load_zendesk_config_with_env, parse_range, Args, EnvironmentProvider, SystemEnvironment, MockEnvironment};
pub use parsing::{parse_date, DateRange};
pub use classifier::{classify, is_managed_k8s, mentions_keyword};
pub use aggregator::{orgs_with_k8s, sort_by_k8s_count, sort_by_name, OrgAggregator};
pub use zendesk::{TicketSource, ZendeskClient};
pub use collector::{CollectedTickets, TicketCollector, TicketOutcome, SkipReason};
pub use report::{build_report, render_listing, render_totals, ReportSummary};
pub use app::run;
