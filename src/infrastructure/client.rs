//! Messaging service boundary.
//!
//! `MessagingClient` is the only network-facing seam. `Session` owns a client
//! for the duration of a run and is passed explicitly to every component.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Account, Credentials, Dialog, RawMessage, Result};

use super::session_store::SessionStore;

/// Parameters for one history request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    /// Maximum messages in this response.
    pub limit: usize,
    /// Oldest-first when set, newest-first otherwise.
    pub reverse: bool,
    /// With `reverse`, only messages at or after this instant.
    pub offset_date: Option<DateTime<Utc>>,
    /// With `reverse`, only messages with an id greater than this.
    pub after_id: Option<i64>,
    /// Exclusive lower id bound.
    pub min_id: Option<i64>,
    /// Exclusive upper id bound.
    pub max_id: Option<i64>,
}

impl HistoryQuery {
    /// Query for the newest `limit` messages.
    #[must_use]
    pub const fn latest(limit: usize) -> Self {
        Self {
            limit,
            reverse: false,
            offset_date: None,
            after_id: None,
            min_id: None,
            max_id: None,
        }
    }
}

/// Client for a remote messaging service.
#[async_trait]
pub trait MessagingClient: Send + Sync {
    /// Establishes a session, reusing `stored_session` when the service accepts it.
    ///
    /// Returns the account and the session token to persist.
    async fn authenticate(
        &self,
        credentials: &Credentials,
        stored_session: Option<&str>,
    ) -> Result<(Account, String)>;

    /// Lists every dialog visible to the account.
    async fn list_dialogs(&self) -> Result<Vec<Dialog>>;

    /// Fetches one page of history for a chat.
    async fn get_messages(&self, chat_id: i64, query: &HistoryQuery) -> Result<Vec<RawMessage>>;

    /// Releases the session.
    async fn disconnect(&self) -> Result<()>;
}

/// An authenticated session, acquired once per run.
pub struct Session<C> {
    client: C,
    account: Account,
}

impl<C: MessagingClient> Session<C> {
    /// Authenticates `client`, reusing and refreshing the token in `store`.
    ///
    /// # Errors
    /// Returns `AppError::Auth` if the service rejects the credentials, or a
    /// session store error if the token cannot be persisted.
    pub async fn open(
        client: C,
        credentials: &Credentials,
        store: Option<&SessionStore>,
    ) -> Result<Self> {
        let stored = match store {
            Some(store) => store.load(credentials.api_id)?,
            None => None,
        };

        tracing::info!(
            api_id = credentials.api_id,
            resumed = stored.is_some(),
            "Opening session"
        );

        let (account, token) = client.authenticate(credentials, stored.as_deref()).await?;

        if let Some(store) = store {
            if let Err(e) = store.save(credentials.api_id, &token, account.id) {
                if let Err(close_err) = client.disconnect().await {
                    tracing::warn!("Failed to close session: {}", close_err);
                }
                return Err(e);
            }
        }

        tracing::info!(
            account_id = account.id,
            username = account.username.as_deref().unwrap_or("-"),
            name = account.first_name.as_deref().unwrap_or("-"),
            "Session established"
        );

        Ok(Self { client, account })
    }

    /// The underlying client.
    #[must_use]
    pub const fn client(&self) -> &C {
        &self.client
    }

    /// The authenticated account.
    #[must_use]
    pub const fn account(&self) -> &Account {
        &self.account
    }

    /// Releases the session.
    ///
    /// # Errors
    /// Returns error if the client fails to disconnect cleanly.
    pub async fn close(self) -> Result<()> {
        tracing::debug!("Closing session");
        self.client.disconnect().await
    }
}
