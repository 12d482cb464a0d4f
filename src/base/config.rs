//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use serde::Deserialize;

use super::types::{Res, Void};

/// Default address the Webex webhook listener binds to.
fn default_webex_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

/// Default path Webex posts webhook notifications to.
fn default_webex_webhook_path() -> String {
    "/webex/events".to_string()
}

/// Default name given to the webhooks the bot registers.
fn default_webex_webhook_name() -> String {
    "incident-response-bot".to_string()
}

/// Default Webex REST API base URL.
fn default_webex_api_url() -> String {
    "https://webexapis.com/v1".to_string()
}

/// Default Secure Endpoint (AMP) API base URL.
fn default_amp4e_api_url() -> String {
    "https://api.amp.cisco.com/v1".to_string()
}

/// Default Secure Endpoint (AMP) console URL, used for card links.
fn default_amp4e_console_url() -> String {
    "https://console.amp.cisco.com".to_string()
}

/// Default Umbrella OAuth token endpoint.
fn default_umbrella_auth_url() -> String {
    "https://management.api.umbrella.com/auth/v2/oauth2/token".to_string()
}

/// Default Umbrella reporting API base URL.
fn default_umbrella_reports_url() -> String {
    "https://reports.api.umbrella.com/v2".to_string()
}

/// Default Umbrella investigate API base URL.
fn default_umbrella_investigate_url() -> String {
    "https://investigate.api.umbrella.com".to_string()
}

/// Default Umbrella dashboard URL, used for card links.
fn default_umbrella_dashboard_url() -> String {
    "https://dashboard.umbrella.com".to_string()
}

/// Default Spamhaus login endpoint.
fn default_spamhaus_login_url() -> String {
    "https://api.spamhaus.org/api/v1/login".to_string()
}

/// Default Spamhaus intel API base URL.
fn default_spamhaus_api_url() -> String {
    "https://api.spamhaus.org/api/intel/v1".to_string()
}

/// Configuration for the incident response bot.
#[derive(Debug, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// Webex bot access token (`WEBEX_TEAMS_ACCESS_TOKEN`).
    #[serde(default)]
    pub webex_teams_access_token: String,
    /// Comma-separated list of approved sender domains (`WEBEX_RESTRICT_DOMAIN`).
    #[serde(default)]
    pub webex_restrict_domain: Option<String>,
    /// Comma-separated list of approved sender emails (`WEBEX_RESTRICT_USER`).
    #[serde(default)]
    pub webex_restrict_user: Option<String>,
    /// Public URL Webex should deliver webhook notifications to (`WEBEX_WEBHOOK_URL`).
    #[serde(default)]
    pub webex_webhook_url: String,
    /// Optional webhook secret; when set, notifications must carry a valid `X-Spark-Signature` (`WEBEX_WEBHOOK_SECRET`).
    #[serde(default)]
    pub webex_webhook_secret: Option<String>,
    /// Address for the webhook listener (`WEBEX_BIND_ADDR`).
    #[serde(default = "default_webex_bind_addr")]
    pub webex_bind_addr: String,
    /// Path for the webhook listener (`WEBEX_WEBHOOK_PATH`).
    #[serde(default = "default_webex_webhook_path")]
    pub webex_webhook_path: String,
    /// Name used for the registered webhooks (`WEBEX_WEBHOOK_NAME`).
    #[serde(default = "default_webex_webhook_name")]
    pub webex_webhook_name: String,
    /// Webex REST API base URL (`WEBEX_API_URL`).
    #[serde(default = "default_webex_api_url")]
    pub webex_api_url: String,

    /// Secure Endpoint client ID (`AMP4E_CLIENT_ID`).
    #[serde(default)]
    pub amp4e_client_id: String,
    /// Secure Endpoint API key (`AMP4E_API_KEY`).
    #[serde(default)]
    pub amp4e_api_key: String,
    /// Secure Endpoint API base URL (`AMP4E_API_URL`).
    #[serde(default = "default_amp4e_api_url")]
    pub amp4e_api_url: String,
    /// Secure Endpoint console URL (`AMP4E_CONSOLE_URL`).
    #[serde(default = "default_amp4e_console_url")]
    pub amp4e_console_url: String,

    /// Umbrella management client ID (`UMBRELLA_CLIENT_ID`).
    #[serde(default)]
    pub umbrella_client_id: String,
    /// Umbrella management API key (`UMBRELLA_API_KEY`).
    #[serde(default)]
    pub umbrella_api_key: String,
    /// Umbrella organization ID (`UMBRELLA_ORG_ID`).
    #[serde(default)]
    pub umbrella_org_id: String,
    /// Umbrella investigate bearer key (`UMBRELLA_INVESTIGATE_KEY`).
    #[serde(default)]
    pub umbrella_investigate_key: String,
    /// Umbrella OAuth token endpoint (`UMBRELLA_AUTH_URL`).
    #[serde(default = "default_umbrella_auth_url")]
    pub umbrella_auth_url: String,
    /// Umbrella reporting API base URL (`UMBRELLA_REPORTS_URL`).
    #[serde(default = "default_umbrella_reports_url")]
    pub umbrella_reports_url: String,
    /// Umbrella investigate API base URL (`UMBRELLA_INVESTIGATE_URL`).
    #[serde(default = "default_umbrella_investigate_url")]
    pub umbrella_investigate_url: String,
    /// Umbrella dashboard URL (`UMBRELLA_DASHBOARD_URL`).
    #[serde(default = "default_umbrella_dashboard_url")]
    pub umbrella_dashboard_url: String,

    /// Spamhaus intel username (`SPAMHAUS_USER`).
    #[serde(default)]
    pub spamhaus_user: String,
    /// Spamhaus intel password (`SPAMHAUS_PASS`).
    #[serde(default)]
    pub spamhaus_pass: String,
    /// Spamhaus login endpoint (`SPAMHAUS_LOGIN_URL`).
    #[serde(default = "default_spamhaus_login_url")]
    pub spamhaus_login_url: String,
    /// Spamhaus intel API base URL (`SPAMHAUS_API_URL`).
    #[serde(default = "default_spamhaus_api_url")]
    pub spamhaus_api_url: String,

    /// SMTP relay host (`SMTP_RELAY`).
    #[serde(default)]
    pub smtp_relay: String,
    /// SMTP relay port (`SMTP_PORT`).
    #[serde(default)]
    pub smtp_port: Option<u16>,
    /// Sender address for notification mail (`SMTP_SENDER_ADDR`).
    #[serde(default)]
    pub smtp_sender_addr: String,
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder();

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        // Environment variables take precedence over the file.
        cfg = cfg.add_source(config::Environment::default());

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        result.validate()?;

        Ok(result)
    }

    /// Ensure every integration has its credentials.
    ///
    /// All missing integrations are reported at once, so a fresh deployment can
    /// be fixed in a single pass.
    pub fn validate(&self) -> Void {
        let port = self.smtp_port.map(|p| p.to_string()).unwrap_or_default();

        let integrations: [(&str, Vec<(&str, &str)>); 5] = [
            (
                "Webex",
                vec![("WEBEX_TEAMS_ACCESS_TOKEN", self.webex_teams_access_token.as_str()), ("WEBEX_WEBHOOK_URL", self.webex_webhook_url.as_str())],
            ),
            (
                "Cisco Secure Endpoint",
                vec![("AMP4E_CLIENT_ID", self.amp4e_client_id.as_str()), ("AMP4E_API_KEY", self.amp4e_api_key.as_str())],
            ),
            (
                "Cisco Umbrella",
                vec![
                    ("UMBRELLA_CLIENT_ID", self.umbrella_client_id.as_str()),
                    ("UMBRELLA_API_KEY", self.umbrella_api_key.as_str()),
                    ("UMBRELLA_ORG_ID", self.umbrella_org_id.as_str()),
                    ("UMBRELLA_INVESTIGATE_KEY", self.umbrella_investigate_key.as_str()),
                ],
            ),
            ("Spamhaus Intelligence", vec![("SPAMHAUS_USER", self.spamhaus_user.as_str()), ("SPAMHAUS_PASS", self.spamhaus_pass.as_str())]),
            (
                "SMTP relay",
                vec![("SMTP_RELAY", self.smtp_relay.as_str()), ("SMTP_PORT", port.as_str()), ("SMTP_SENDER_ADDR", self.smtp_sender_addr.as_str())],
            ),
        ];

        let missing = integrations
            .iter()
            .filter_map(|(name, vars)| {
                let absent = vars.iter().filter(|(_, value)| value.trim().is_empty()).map(|(var, _)| *var).collect::<Vec<_>>();

                if absent.is_empty() { None } else { Some(format!("{name} ({})", absent.join(", "))) }
            })
            .collect::<Vec<_>>();

        if !missing.is_empty() {
            return Err(anyhow::anyhow!("Missing configuration for {}.", missing.join("; ")));
        }

        Ok(())
    }

    /// Approved sender domains, if any were configured.
    pub fn approved_domains(&self) -> Vec<String> {
        split_list(self.webex_restrict_domain.as_deref())
    }

    /// Approved sender emails, if any were configured.
    pub fn approved_users(&self) -> Vec<String> {
        split_list(self.webex_restrict_user.as_deref())
    }
}

impl From<ConfigInner> for Config {
    fn from(inner: ConfigInner) -> Self {
        Self { inner: Arc::new(inner) }
    }
}

fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

// Tests.
