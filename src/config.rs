//! Configuration management for the outreach pipeline.
//!
//! All settings are read once at process start into an explicit [`Config`]
//! which is then handed to each component's constructor. A `.env` file in the
//! working directory is loaded first if present.

use crate::domain::agents::{AgentDirectory, DEFAULT_AGENT_IDS};
use crate::error::{ConfigError, ConfigResult};
use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/143.0.0.0 Safari/537.36";

/// Settings for the CRM export client.
#[derive(Debug, Clone)]
pub struct CrmConfig {
    /// CRM web origin, e.g. `https://app-eu1.hubspot.com`
    pub origin: String,

    /// Browser user agent sent with every request
    pub user_agent: String,

    /// Portal (account) identifier
    pub portal_id: String,

    /// Static app version expected by the internal API
    pub app_version: String,

    /// Raw `Cookie` header copied from an authenticated browser session
    pub cookie: String,
}

impl Default for CrmConfig {
    fn default() -> Self {
        CrmConfig {
            origin: "https://app-eu1.hubspot.com".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            portal_id: "145440460".to_string(),
            app_version: "2.50953".to_string(),
            cookie: String::new(),
        }
    }
}

/// Settings for the messaging dispatch client.
#[derive(Debug, Clone)]
pub struct MessagingConfig {
    /// Authorization token; required by every messaging operation
    pub auth_token: Option<String>,

    /// Host serving the GraphQL endpoint
    pub api_url: String,

    /// Origin used for the `origin`/`referer` headers
    pub origin: String,

    pub channel: String,
    pub line_id: String,
    pub template_id: String,

    /// Display name of the agent used when none is given interactively
    pub agent_name: String,

    /// Agent-name → agent-id table plus fallback id
    pub agents: AgentDirectory,
}

impl MessagingConfig {
    /// Fail fast unless every credential needed to send is present.
    pub fn require_credentials(&self) -> ConfigResult<&str> {
        let token = self
            .auth_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingVar("AIRCALL_AUTH_TOKEN".to_string()))?;

        for (var, value) in [
            ("AIRCALL_LINE_ID", &self.line_id),
            ("AIRCALL_CHANNEL", &self.channel),
            ("AIRCALL_TEMPLATE_ID", &self.template_id),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingVar(var.to_string()));
            }
        }

        Ok(token)
    }
}

impl Default for MessagingConfig {
    fn default() -> Self {
        MessagingConfig {
            auth_token: None,
            api_url: "https://app.aircall.io".to_string(),
            origin: "https://app.aircall.io".to_string(),
            channel: "WHATSAPP".to_string(),
            line_id: "994125".to_string(),
            template_id: "2767".to_string(),
            agent_name: "Mar".to_string(),
            agents: AgentDirectory::default(),
        }
    }
}

/// Configuration for the whole pipeline.
#[derive(Debug, Clone)]
pub struct Config {
    pub crm: CrmConfig,
    pub messaging: MessagingConfig,

    /// Flat file written by the export and read by the outreach stage
    pub csv_path: PathBuf,

    /// CRM page size (default: 5)
    pub batch_size: usize,

    /// HTTP request timeout in seconds (default: 30)
    pub request_timeout: u64,

    /// Pause between outreach rows in milliseconds (default: 500)
    pub outreach_delay_ms: u64,

    /// Log level (default: "info")
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Nothing is strictly required at load time; the messaging token is
    /// checked by [`MessagingConfig::require_credentials`] before any network
    /// call is made.
    pub fn from_env() -> ConfigResult<Self> {
        let _ = dotenvy::dotenv();

        let defaults = Config::default();

        let origin = env_or("HUBSPOT_ORIGIN", &defaults.crm.origin);
        if !origin.starts_with("http://") && !origin.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                var: "HUBSPOT_ORIGIN".to_string(),
                reason: "Must start with http:// or https://".to_string(),
            });
        }

        let crm = CrmConfig {
            origin,
            user_agent: env_or("HUBSPOT_USER_AGENT", &defaults.crm.user_agent),
            portal_id: env_or("HUBSPOT_PORTAL_ID", &defaults.crm.portal_id),
            app_version: env_or("HUBSPOT_STATIC_APP_VERSION", &defaults.crm.app_version),
            cookie: env_or("HUBSPOT_COOKIE", ""),
        };

        let batch_size = Self::parse_env_usize("HUBSPOT_BATCH_SIZE", defaults.batch_size)?;
        if batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                var: "HUBSPOT_BATCH_SIZE".to_string(),
                reason: "Must be greater than zero".to_string(),
            });
        }

        let agent_ids = match env::var("AIRCALL_AGENT_IDS") {
            Ok(raw) => parse_agent_table(&raw)?,
            Err(_) => DEFAULT_AGENT_IDS
                .iter()
                .map(|(name, id)| (name.to_string(), id.to_string()))
                .collect(),
        };
        let default_agent_id = env_or("AIRCALL_AGENT_ID", AgentDirectory::FALLBACK_ID);

        let messaging = MessagingConfig {
            auth_token: env::var("AIRCALL_AUTH_TOKEN").ok(),
            api_url: env_or("AIRCALL_API_URL", &defaults.messaging.api_url),
            origin: env_or("AIRCALL_ORIGIN", &defaults.messaging.origin),
            channel: env_or("AIRCALL_CHANNEL", &defaults.messaging.channel),
            line_id: env_or("AIRCALL_LINE_ID", &defaults.messaging.line_id),
            template_id: env_or("AIRCALL_TEMPLATE_ID", &defaults.messaging.template_id),
            agent_name: env_or("AIRCALL_AGENT_NAME", &defaults.messaging.agent_name),
            agents: AgentDirectory::new(agent_ids, default_agent_id),
        };

        Ok(Config {
            crm,
            messaging,
            csv_path: PathBuf::from(env_or("CSV_PATH", "data/data.csv")),
            batch_size,
            request_timeout: Self::parse_env_u64("REQUEST_TIMEOUT", defaults.request_timeout)?,
            outreach_delay_ms: Self::parse_env_u64("OUTREACH_DELAY_MS", defaults.outreach_delay_ms)?,
            log_level: env_or("LOG_LEVEL", &defaults.log_level),
        })
    }

    /// Parse an environment variable as u64 with a default value.
    fn parse_env_u64(var_name: &str, default: u64) -> ConfigResult<u64> {
        match env::var(var_name) {
            Ok(val) => val.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                var: var_name.to_string(),
                reason: format!("Must be a positive number, got: {}", val),
            }),
            Err(_) => Ok(default),
        }
    }

    /// Parse an environment variable as usize with a default value.
    fn parse_env_usize(var_name: &str, default: usize) -> ConfigResult<usize> {
        match env::var(var_name) {
            Ok(val) => val
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidValue {
                    var: var_name.to_string(),
                    reason: format!("Must be a positive number, got: {}", val),
                }),
            Err(_) => Ok(default),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            crm: CrmConfig::default(),
            messaging: MessagingConfig::default(),
            csv_path: PathBuf::from("data/data.csv"),
            batch_size: 5,
            request_timeout: 30,
            outreach_delay_ms: 500,
            log_level: "info".to_string(),
        }
    }
}

fn env_or(var_name: &str, default: &str) -> String {
    env::var(var_name).unwrap_or_else(|_| default.to_string())
}

/// Parse `Name=id,Name=id` into an agent table.
fn parse_agent_table(raw: &str) -> ConfigResult<BTreeMap<String, String>> {
    let mut table = BTreeMap::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (name, id) = entry
            .split_once('=')
            .map(|(n, i)| (n.trim(), i.trim()))
            .filter(|(n, i)| !n.is_empty() && !i.is_empty())
            .ok_or_else(|| ConfigError::InvalidValue {
                var: "AIRCALL_AGENT_IDS".to_string(),
                reason: format!("Expected Name=id, got: {}", entry),
            })?;
        table.insert(name.to_string(), id.to_string());
    }
    Ok(table)
}
