//! HTTP gateway client.
//!
//! Speaks JSON to a messaging gateway and converts its wire payloads into
//! domain types.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, SecondsFormat};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::domain::{Account, AppError, Credentials, Dialog, RawMessage, RawSender, Result};

use super::client::{HistoryQuery, MessagingClient};

/// Sender discriminators used by the gateway.
const USER_KIND: &str = "User";
const CHANNEL_KIND: &str = "Channel";

#[derive(Debug, Serialize)]
struct AuthRequest<'a> {
    api_id: i32,
    api_hash: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    session: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    session: String,
    user: WireAccount,
}

#[derive(Debug, Deserialize)]
struct WireAccount {
    id: i64,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireDialog {
    id: i64,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct WireSender {
    #[serde(rename = "_")]
    kind: String,
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    id: i64,
    date: DateTime<FixedOffset>,
    #[serde(default)]
    sender: Option<WireSender>,
    #[serde(default)]
    sender_id: Option<i64>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    voice: bool,
    #[serde(default)]
    views: Option<i64>,
    #[serde(default)]
    reply_to_msg_id: Option<i64>,
}

impl From<WireSender> for RawSender {
    fn from(wire: WireSender) -> Self {
        match wire.kind.as_str() {
            USER_KIND => Self::Person {
                id: wire.id,
                first_name: wire.first_name,
                last_name: wire.last_name,
                username: wire.username,
            },
            CHANNEL_KIND => Self::BroadcastChannel {
                id: wire.id,
                title: wire.title.unwrap_or_default(),
                username: wire.username,
            },
            _ => Self::Unknown { kind: wire.kind },
        }
    }
}

impl From<WireMessage> for RawMessage {
    fn from(wire: WireMessage) -> Self {
        Self {
            id: wire.id,
            date: wire.date,
            sender: wire.sender.map(RawSender::from),
            sender_id: wire.sender_id,
            text: wire.message,
            voice: wire.voice,
            views: wire.views,
            reply_to_msg_id: wire.reply_to_msg_id,
        }
    }
}

/// Gateway-backed `MessagingClient`.
pub struct GatewayClient {
    client: reqwest::Client,
    base_url: String,
    token: Mutex<Option<String>>,
}

impl GatewayClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: Mutex::new(None),
        }
    }

    fn token(&self) -> Result<String> {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| AppError::Auth {
                message: "Session is not established".into(),
            })
    }

    fn set_token(&self, token: Option<String>) {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = token;
    }

    /// GETs `path` with the session token and decodes the JSON body.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .bearer_auth(self.token()?)
            .query(query)
            .send()
            .await
            .map_err(AppError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        response.json().await.map_err(AppError::transport)
    }
}

/// Maps a non-success status on an established session to a domain error.
///
/// A rejected token at this point is a transport failure; `Auth` is only
/// raised while the session is being established.
fn status_error(status: StatusCode, body: &str) -> AppError {
    let message = if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        format!("gateway rejected session ({status}): {body}")
    } else {
        format!("gateway returned {status}: {body}")
    };
    AppError::Transport {
        message,
        source: None,
    }
}

/// Query-string parameters for a history request.
fn history_params(query: &HistoryQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("limit", query.limit.to_string()),
        ("reverse", query.reverse.to_string()),
    ];
    if let Some(date) = query.offset_date {
        params.push((
            "offset_date",
            date.to_rfc3339_opts(SecondsFormat::Secs, true),
        ));
    }
    if let Some(id) = query.after_id {
        params.push(("after_id", id.to_string()));
    }
    if let Some(id) = query.min_id {
        params.push(("min_id", id.to_string()));
    }
    if let Some(id) = query.max_id {
        params.push(("max_id", id.to_string()));
    }
    params
}

#[async_trait]
impl MessagingClient for GatewayClient {
    async fn authenticate(
        &self,
        credentials: &Credentials,
        stored_session: Option<&str>,
    ) -> Result<(Account, String)> {
        let url = format!("{}/auth", self.base_url);
        tracing::debug!("POST {}", url);

        let request = AuthRequest {
            api_id: credentials.api_id,
            api_hash: &credentials.api_hash,
            session: stored_session,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Auth {
                message: format!("Failed to reach gateway: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Auth {
                message: format!("gateway returned {status}: {body}"),
            });
        }

        let auth: AuthResponse = response.json().await.map_err(|e| AppError::Auth {
            message: format!("Malformed auth response: {e}"),
        })?;

        self.set_token(Some(auth.session.clone()));

        let account = Account {
            id: auth.user.id,
            username: auth.user.username,
            first_name: auth.user.first_name,
        };
        Ok((account, auth.session))
    }

    async fn list_dialogs(&self) -> Result<Vec<Dialog>> {
        let dialogs: Vec<WireDialog> = self.get_json("/dialogs", &[]).await?;
        tracing::debug!("Listed {} dialogs", dialogs.len());

        Ok(dialogs
            .into_iter()
            .map(|d| Dialog {
                id: d.id,
                name: d.name,
            })
            .collect())
    }

    async fn get_messages(&self, chat_id: i64, query: &HistoryQuery) -> Result<Vec<RawMessage>> {
        let path = format!("/chats/{chat_id}/messages");
        let messages: Vec<WireMessage> = self.get_json(&path, &history_params(query)).await?;

        Ok(messages.into_iter().map(RawMessage::from).collect())
    }

    async fn disconnect(&self) -> Result<()> {
        self.set_token(None);
        Ok(())
    }
}
