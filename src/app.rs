use std::path::Path;

use tracing::info;

use crate::config::{load_zendesk_config_with_env, parse_range, Args, EnvironmentProvider};
use crate::error::ReportResult;
use crate::report;
use crate::types::Config;
use crate::collector::TicketCollector;
use crate::zendesk::ZendeskClient;

/// One full run: dates, output file, Zendesk client, ticket pass, report.
///
/// Each step only starts once the previous one succeeded, so a bad date never
/// touches the output file and a missing output directory is reported before
/// the environment is read.
pub async fn run<E: EnvironmentProvider>(args: &Args, env: &E, output_path: &Path) -> ReportResult<()> {
    let range = parse_range(args)?;

    let mut out = report::open_output(output_path)?;

    let zendesk = load_zendesk_config_with_env(env)?;
    let client = ZendeskClient::new(&zendesk)?;
    let cfg = Config {
        range,
        start_raw: args.start.clone(),
        end_raw: args.end.clone(),
        zendesk,
    };
    info!("Dates: {} and {}", cfg.start_raw, cfg.end_raw);

    let collected = TicketCollector::new(&client, cfg.range).collect().await?;
    let text = report::build_report(&cfg, &collected);
    report::write_report(&mut out, output_path, &text)?;
    info!("Report written to {}", output_path.display());

    Ok(())
}
