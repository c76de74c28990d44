use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::aggregator::{self, OrgAggregator};
use crate::collector::CollectedTickets;
use crate::error::{ReportError, ReportResult};
use crate::types::{Config, OrgSummary, RunCounters};

pub const NAME_LISTING_TITLE: &str = "Sort by name";
pub const K8S_LISTING_TITLE: &str = "Sort by K8s ticket count";

const NAME_WIDTH: usize = 30;
const K8S_WIDTH: usize = "K8s tickets".len();
const NON_K8S_WIDTH: usize = "non-K8s tickets".len();

/// Figures for the totals block at the top of the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    pub start: String,
    pub end: String,
    pub org_count: usize,
    pub orgs_with_k8s: usize,
    pub in_range: u32,
    pub keyword_hits: u32,
    pub total_k8s: u32,
    pub total_non_k8s: u32,
}

impl ReportSummary {
    pub fn new(start: &str, end: &str, orgs: &OrgAggregator, counters: &RunCounters) -> Self {
        Self {
            start: start.to_string(),
            end: end.to_string(),
            org_count: orgs.org_count(),
            orgs_with_k8s: orgs.orgs_with_k8s(),
            in_range: counters.in_range,
            keyword_hits: counters.keyword_hits,
            total_k8s: orgs.total_k8s(),
            total_non_k8s: orgs.total_non_k8s(),
        }
    }

    pub fn total_tickets(&self) -> u32 {
        self.total_k8s + self.total_non_k8s
    }
}

pub fn render_totals(summary: &ReportSummary) -> String {
    format!(
        "time range: {} through {}\n\
         Orgs with tickets: {}\n\
         Orgs with K8s tickets: {}\n\
         Tickets in time range: {}\n\
         kubectl tickets (not AKS, EKS): {}\n\
         Total Kubernetes Tickets: {}\n\
         Non Kubernetes Tickets: {}\n",
        summary.start,
        summary.end,
        summary.org_count,
        summary.orgs_with_k8s,
        summary.in_range,
        summary.keyword_hits,
        summary.total_k8s,
        summary.total_non_k8s,
    )
}

/// Title, header row, then one row per org in the order given.
pub fn render_listing(title: &str, items: &[OrgSummary]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(
        out,
        "{:<name$}  {:>k8s$}  {:>non$}",
        "Org Name",
        "K8s tickets",
        "non-K8s tickets",
        name = NAME_WIDTH,
        k8s = K8S_WIDTH,
        non = NON_K8S_WIDTH,
    );
    for s in items {
        let _ = writeln!(
            out,
            "{:<name$}  {:>k8s$}  {:>non$}",
            s.org_name,
            s.k8s_count,
            s.non_k8s_count,
            name = NAME_WIDTH,
            k8s = K8S_WIDTH,
            non = NON_K8S_WIDTH,
        );
    }
    out
}

/// Totals block, then the org listing sorted by name, then the same listing
/// re-sorted by k8s count. Orgs with equal counts keep their name order.
pub fn render_report(summary: &ReportSummary, orgs: &OrgAggregator) -> String {
    let mut items = orgs.summaries();

    let mut out = render_totals(summary);
    out.push('\n');

    aggregator::sort_by_name(&mut items);
    out.push_str(&render_listing(NAME_LISTING_TITLE, &items));
    out.push('\n');

    aggregator::sort_by_k8s_count(&mut items);
    out.push_str(&render_listing(K8S_LISTING_TITLE, &items));
    out
}

/// Full report text for a finished pass.
pub fn build_report(config: &Config, collected: &CollectedTickets) -> String {
    let summary = ReportSummary::new(&config.start_raw, &config.end_raw, &collected.orgs, &collected.counters);
    render_report(&summary, &collected.orgs)
}

/// Truncates or creates the report file. The handle is closed when dropped.
pub fn open_output(path: &Path) -> ReportResult<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| ReportError::Output {
            path: path.to_path_buf(),
            source,
        })
}

pub fn write_report<W: Write>(out: &mut W, path: &Path, contents: &str) -> ReportResult<()> {
    out.write_all(contents.as_bytes())
        .and_then(|_| out.flush())
        .map_err(|source| ReportError::Output {
            path: path.to_path_buf(),
            source,
        })
}
