use std::time::Duration;

use reqwest::header::{ACCEPT, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{ApiError, ReportError, ReportResult};
use crate::types::{Comment, Ticket, TicketPage, ZendeskConfig};

const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);
const RETRY_MAX_DELAY: Duration = Duration::from_secs(30);

/// What the ticket pass needs from the helpdesk. All calls block the pass
/// until they complete.
#[allow(async_fn_in_trait)]
pub trait TicketSource {
    /// `next` is `None` for the first page, otherwise the URL handed back by
    /// the previous page.
    async fn ticket_page(&self, next: Option<&str>) -> Result<TicketPage, ApiError>;

    /// `None` when the organization does not exist or has no name.
    async fn organization_name(&self, org_id: u64) -> Result<Option<String>, ApiError>;

    /// Every comment on the ticket, oldest first.
    async fn ticket_comments(&self, ticket_id: u64) -> Result<Vec<Comment>, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ZendeskClient {
    http: Client,
    base_url: String,
    username: String,
    token: String,
    page_size: u32,
    max_retries: u32,
    retry_base_delay: Duration,
}

impl ZendeskClient {
    pub fn new(config: &ZendeskConfig) -> ReportResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ReportError::ClientBuild(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            // API token auth uses "{email}/token" as the user name
            username: format!("{}/token", config.email),
            token: config.token.clone(),
            page_size: config.page_size,
            max_retries: config.max_retries,
            retry_base_delay: RETRY_BASE_DELAY,
        })
    }

    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    fn first_tickets_url(&self) -> String {
        format!("{}/api/v2/tickets.json?page[size]={}", self.base_url, self.page_size)
    }

    fn organization_url(&self, org_id: u64) -> String {
        format!("{}/api/v2/organizations/{}.json", self.base_url, org_id)
    }

    fn comments_url(&self, ticket_id: u64) -> String {
        format!("{}/api/v2/tickets/{}/comments.json", self.base_url, ticket_id)
    }

    fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.retry_base_delay
            .checked_mul(factor)
            .unwrap_or(RETRY_MAX_DELAY)
            .min(RETRY_MAX_DELAY)
    }

    /// A server-supplied `Retry-After` replaces the backoff but is held to the
    /// same ceiling.
    fn retry_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        match retry_after {
            Some(d) => d.min(RETRY_MAX_DELAY),
            None => self.backoff_delay(attempt),
        }
    }

    /// GET with bounded retries on transport errors, 429 and 5xx. Any other
    /// response, successful or not, is handed back to the caller.
    async fn send(&self, url: &str) -> Result<Response, ApiError> {
        let mut attempt = 0;
        loop {
            let result = self
                .http
                .get(url)
                .basic_auth(&self.username, Some(&self.token))
                .header(ACCEPT, "application/json")
                .send()
                .await;

            let (err, retry_after) = match result {
                Ok(res) => {
                    let status = res.status();
                    if status != StatusCode::TOO_MANY_REQUESTS && !status.is_server_error() {
                        return Ok(res);
                    }
                    let retry_after = if status == StatusCode::TOO_MANY_REQUESTS {
                        retry_after_header(&res)
                    } else {
                        None
                    };
                    let body = res.text().await.unwrap_or_default();
                    (ApiError::Status { url: url.to_string(), status, body }, retry_after)
                }
                Err(source) => (ApiError::Transport { url: url.to_string(), source }, None),
            };

            if attempt >= self.max_retries || !err.is_transient() {
                return Err(err);
            }
            let delay = self.retry_delay(attempt, retry_after);
            attempt += 1;
            warn!("{} (attempt {}/{}), retrying in {:?}", err, attempt, self.max_retries, delay);
            tokio::time::sleep(delay).await;
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let res = self.send(url).await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(ApiError::Status { url: url.to_string(), status, body });
        }
        res.json::<T>()
            .await
            .map_err(|source| ApiError::Decode { url: url.to_string(), source })
    }
}

impl TicketSource for ZendeskClient {
    async fn ticket_page(&self, next: Option<&str>) -> Result<TicketPage, ApiError> {
        let url = match next {
            Some(u) => u.to_string(),
            None => self.first_tickets_url(),
        };
        debug!("fetching tickets from {}", url);
        let page: TicketsResponse = self.get_json(&url).await?;
        let next = if page.meta.has_more { page.links.next } else { None };
        Ok(TicketPage {
            tickets: page.tickets,
            next,
        })
    }

    async fn organization_name(&self, org_id: u64) -> Result<Option<String>, ApiError> {
        let url = self.organization_url(org_id);
        let res = self.send(&url).await?;
        let status = res.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(ApiError::Status { url, status, body });
        }
        let org: OrganizationResponse = res
            .json()
            .await
            .map_err(|source| ApiError::Decode { url: url.clone(), source })?;
        Ok(org.organization.name.filter(|n| !n.trim().is_empty()))
    }

    async fn ticket_comments(&self, ticket_id: u64) -> Result<Vec<Comment>, ApiError> {
        let mut comments = Vec::new();
        let mut url = Some(self.comments_url(ticket_id));
        while let Some(current) = url {
            let page: CommentsResponse = self.get_json(&current).await?;
            comments.extend(page.comments);
            url = page.next_page;
        }
        Ok(comments)
    }
}

fn retry_after_header(res: &Response) -> Option<Duration> {
    res.headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

#[derive(Debug, Deserialize)]
struct TicketsResponse {
    tickets: Vec<Ticket>,
    #[serde(default)]
    meta: CursorMeta,
    #[serde(default)]
    links: CursorLinks,
}

#[derive(Debug, Default, Deserialize)]
struct CursorMeta {
    #[serde(default)]
    has_more: bool,
}

#[derive(Debug, Default, Deserialize)]
struct CursorLinks {
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrganizationResponse {
    organization: Organization,
}

#[derive(Debug, Deserialize)]
struct Organization {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommentsResponse {
    comments: Vec<Comment>,
    #[serde(default)]
    next_page: Option<String>,
}
