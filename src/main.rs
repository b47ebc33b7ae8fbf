//! CRM Outreach - Main entry point
//!
//! Asks for a record count and an agent name, exports the matching CRM
//! contacts to the configured CSV file, then sends the outreach template to
//! each of them and assigns the conversations.

use anyhow::Result;
use crm_outreach::prompt::{ask_agent_name, ask_record_count};
use crm_outreach::{Config, CrmClient, Exporter, MessagingClient, Metrics, Outreach};
use std::io;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Load configuration
    let config = Config::from_env();
    let log_level = config
        .as_ref()
        .map(|c| c.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());

    // Initialize logging (stderr only, prompts stay on stdout)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config = match config {
        Ok(cfg) => {
            info!("Configuration loaded successfully");
            cfg
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Nothing is sent to either API unless outreach can run afterwards
    if let Err(e) = config.messaging.require_credentials() {
        error!("Messaging provider is not configured: {}", e);
        return Err(e.into());
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    let count = ask_record_count(&mut input, &mut output)?;
    let agent_name = ask_agent_name(&mut input, &mut output)?;

    let metrics = Metrics::new();

    // 1) CRM -> CSV
    if count > 0 {
        info!(
            "Exporting up to {} records to {}",
            count,
            config.csv_path.display()
        );
    } else {
        info!(
            "Exporting records to {} (no limit)",
            config.csv_path.display()
        );
    }
    let crm = CrmClient::new(&config.crm, config.request_timeout, metrics.clone());
    let exporter = Exporter::new(crm, metrics.clone());
    exporter.export(&config.csv_path, config.batch_size, Some(count).filter(|c| *c > 0))?;

    // 2) CSV -> WhatsApp template + assignment
    let messaging =
        MessagingClient::new(&config.messaging, config.request_timeout, metrics.clone());
    let outreach = Outreach::new(messaging, &config.messaging)
        .with_delay(Duration::from_millis(config.outreach_delay_ms));
    let report = outreach.run(&config.csv_path, agent_name.as_deref(), count)?;

    info!(
        "Process finished: {} of {} message(s) sent, agent {}",
        report.dispatched.len(),
        report.attempted(),
        report.agent_name
    );
    info!("Run metrics: {}", metrics.summary());
    Ok(())
}
