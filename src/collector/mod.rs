use std::collections::HashMap;

use tracing::{info, warn};

use crate::aggregator::OrgAggregator;
use crate::classifier;
use crate::error::ApiError;
use crate::parsing::DateRange;
use crate::types::{Classification, RunCounters, Ticket};
use crate::zendesk::TicketSource;

/// Why a ticket did not reach the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    OutOfRange,
    NotFinished,
    NoOrganization,
    UnnamedOrganization,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketOutcome {
    Counted(Classification),
    Skipped(SkipReason),
}

/// Result of one full pass over the ticket listing.
#[derive(Debug, Default, Clone)]
pub struct CollectedTickets {
    pub orgs: OrgAggregator,
    pub counters: RunCounters,
}

/// Walks every ticket page once, filtering, classifying and tallying.
pub struct TicketCollector<'a, S> {
    source: &'a S,
    range: DateRange,
    org_names: HashMap<u64, Option<String>>,
    orgs: OrgAggregator,
    counters: RunCounters,
}

impl<'a, S: TicketSource> TicketCollector<'a, S> {
    pub fn new(source: &'a S, range: DateRange) -> Self {
        Self {
            source,
            range,
            org_names: HashMap::new(),
            orgs: OrgAggregator::new(),
            counters: RunCounters::default(),
        }
    }

    pub async fn collect(mut self) -> Result<CollectedTickets, ApiError> {
        let mut next: Option<String> = None;
        loop {
            let page = self.source.ticket_page(next.as_deref()).await?;
            for ticket in &page.tickets {
                self.process_ticket(ticket).await?;
            }
            match page.next {
                Some(url) => next = Some(url),
                None => break,
            }
        }

        info!(
            "total tickets {}  in date range: {}",
            self.counters.total_seen, self.counters.in_range
        );
        Ok(CollectedTickets {
            orgs: self.orgs,
            counters: self.counters,
        })
    }

    pub async fn process_ticket(&mut self, ticket: &Ticket) -> Result<TicketOutcome, ApiError> {
        self.counters.total_seen += 1;

        if !self.range.contains(&ticket.created_at) {
            return Ok(TicketOutcome::Skipped(SkipReason::OutOfRange));
        }
        if !ticket.status.is_finished() {
            return Ok(TicketOutcome::Skipped(SkipReason::NotFinished));
        }

        let org_id = match ticket.organization_id {
            Some(id) => id,
            None => {
                warn!("ticket {} has no organization id, skipping", ticket.id);
                self.counters.skipped_no_org += 1;
                return Ok(TicketOutcome::Skipped(SkipReason::NoOrganization));
            }
        };
        let org_name = match self.org_name(org_id).await? {
            Some(name) => name,
            None => {
                warn!("ticket {} organization {} has no name, skipping", ticket.id, org_id);
                self.counters.skipped_no_org += 1;
                return Ok(TicketOutcome::Skipped(SkipReason::UnnamedOrganization));
            }
        };

        self.counters.in_range += 1;

        let classification = if classifier::is_managed_k8s(ticket) {
            Classification::ManagedK8s
        } else {
            let comments = self.source.ticket_comments(ticket.id).await?;
            classifier::classify_comments(&comments)
        };
        if classification == Classification::KeywordK8s {
            info!("ticket {} got kubectl", ticket.id);
            self.counters.keyword_hits += 1;
        }

        self.orgs.record_ticket(org_id, &org_name, classification);
        Ok(TicketOutcome::Counted(classification))
    }

    async fn org_name(&mut self, org_id: u64) -> Result<Option<String>, ApiError> {
        if let Some(cached) = self.org_names.get(&org_id) {
            return Ok(cached.clone());
        }
        let name = self.source.organization_name(org_id).await?;
        self.org_names.insert(org_id, name.clone());
        Ok(name)
    }
}
