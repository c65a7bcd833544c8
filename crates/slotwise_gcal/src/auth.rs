// File: crates/slotwise_gcal/src/auth.rs
//! Service-account authentication shared by Calendar and Gmail.
//!
//! One authenticator is built per process. `yup-oauth2` caches the access
//! token per scope set and refreshes it before it expires.

use google_calendar3::{
    common::GetToken,
    hyper_rustls::{self, HttpsConnectorBuilder},
    hyper_util::client::legacy::connect::HttpConnector,
    hyper_util::client::legacy::Client,
    yup_oauth2::{read_service_account_key, ServiceAccountAuthenticator},
    CalendarHub,
};
use slotwise_config::GcalConfig;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";
pub const GMAIL_SEND_SCOPE: &str = "https://www.googleapis.com/auth/gmail.send";

type Connector = hyper_rustls::HttpsConnector<HttpConnector>;

pub type HubType = CalendarHub<Connector>;

#[derive(Error, Debug)]
pub enum GcalSetupError {
    #[error("Missing {0} in gcal configuration")]
    MissingSetting(&'static str),
    #[error("Cannot read service account key: {0}")]
    KeyFile(#[from] std::io::Error),
    #[error("Cannot build authenticator: {0}")]
    Authenticator(String),
}

/// Everything needed to talk to Google on behalf of the delegated mailbox.
pub struct GoogleClients {
    pub hub: HubType,
    pub calendar_id: String,
    /// Same authenticator as the hub's, used for non-Calendar scopes.
    pub token_source: Box<dyn GetToken>,
}

/// Read the key file and build the Calendar hub plus a token source.
///
/// With `impersonate` set, tokens are minted for that user through
/// domain-wide delegation; without it, the service account acts as itself.
pub async fn connect(config: &GcalConfig) -> Result<GoogleClients, GcalSetupError> {
    let key_path = non_empty(config.key_path.as_deref()).ok_or(GcalSetupError::MissingSetting("key_path"))?;
    let calendar_id = non_empty(config.calendar_id.as_deref())
        .ok_or(GcalSetupError::MissingSetting("calendar_id"))?
        .to_string();

    debug!("Reading service account key from {}", key_path);
    let sa_key = read_service_account_key(Path::new(key_path)).await?;

    let mut builder = ServiceAccountAuthenticator::builder(sa_key);
    if let Some(subject) = non_empty(config.impersonate.as_deref()) {
        builder = builder.subject(subject.to_string());
    }
    let auth = builder
        .build()
        .await
        .map_err(|e| GcalSetupError::Authenticator(e.to_string()))?;

    let https = HttpsConnectorBuilder::new()
        .with_native_roots()
        .map_err(|e| GcalSetupError::Authenticator(e.to_string()))?
        .https_or_http()
        .enable_http1()
        .build();

    let client = Client::builder(hyper_util::rt::TokioExecutor::new()).build(https);
    let hub = CalendarHub::new(client, auth.clone());

    info!("Google Calendar client ready for calendar {}", calendar_id);
    Ok(GoogleClients {
        hub,
        calendar_id,
        token_source: Box::new(auth),
    })
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
