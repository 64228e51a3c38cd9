//! Typed HTTP client for the message-store API.
//!
//! One method per collaborator endpoint. Requests carry JSON bodies,
//! responses are decoded into the types in [`crate::api`]. There are no
//! retries: a transport failure, a non-2xx status, or an undecodable
//! body surfaces immediately as a [`ProbeError`].

use crate::api::*;
use crate::error::ProbeError;
use log::debug;
use serde::de::DeserializeOwned;

#[derive(Clone)]
pub struct StoreClient {
    http: reqwest::Client,
    base_url: String,
}

impl StoreClient {
    pub fn new(base_url: impl Into<String>) -> StoreClient {
        StoreClient {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Builds a client around an existing `reqwest::Client`, for callers
    /// that want to share a connection pool across probes.
    pub fn with_http(http: reqwest::Client, base_url: impl Into<String>) -> StoreClient {
        StoreClient {
            http,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =========================================================================
    // MESSAGE OPERATIONS
    // =========================================================================

    /// `POST /api/msg`: stores a message, returns its server-assigned uuid.
    pub async fn add_message(&self, priority: i32, msg: &str) -> Result<String, ProbeError> {
        let operation = "POST /api/msg";
        let request = self
            .http
            .post(format!("{}/api/msg", self.base_url))
            .json(&AddMessageRequest {
                priority,
                msg: msg.to_string(),
            });
        let response = self.send(request, operation).await?;
        let body: AddMessageResponse = read_json(response, operation).await?;
        debug!("{operation} -> uuid {}", body.uuid);
        Ok(body.uuid)
    }

    /// `GET /api/msg`: fetches one message by the given query, or `None`
    /// when nothing matches.
    pub async fn get_message(
        &self,
        query: &MessageQuery,
    ) -> Result<Option<MessageData>, ProbeError> {
        let operation = "GET /api/msg";
        let request = self
            .http
            .get(format!("{}/api/msg", self.base_url))
            .query(query);
        let response = self.send(request, operation).await?;
        read_json(response, operation).await
    }

    /// Unfiltered `GET /api/msg`: the store's next message by its own
    /// selection policy.
    pub async fn next_message(&self) -> Result<Option<MessageData>, ProbeError> {
        self.get_message(&MessageQuery::default()).await
    }

    /// `PUT /api/msg`: moves a stored message to a new priority.
    pub async fn reprioritize_message(&self, uuid: &str, priority: i32) -> Result<(), ProbeError> {
        let operation = "PUT /api/msg";
        let request = self
            .http
            .put(format!("{}/api/msg", self.base_url))
            .json(&ReprioritizeRequest {
                uuid: uuid.to_string(),
                priority,
            });
        self.send(request, operation).await?;
        Ok(())
    }

    /// `DELETE /api/msg`: removes one message by uuid.
    pub async fn delete_message(&self, uuid: &str) -> Result<(), ProbeError> {
        let operation = "DELETE /api/msg";
        let request = self
            .http
            .delete(format!("{}/api/msg", self.base_url))
            .query(&[("uuid", uuid)]);
        self.send(request, operation).await?;
        Ok(())
    }

    // =========================================================================
    // GROUP OPERATIONS
    // =========================================================================

    /// `GET /api/group?priority=..`: report for a single priority group,
    /// or `None` when the group holds no messages.
    pub async fn group_report(
        &self,
        priority: i32,
        include_msg_data: bool,
    ) -> Result<Option<GroupReport>, ProbeError> {
        let operation = "GET /api/group";
        let request = self
            .http
            .get(format!("{}/api/group", self.base_url))
            .query(&GroupQuery {
                priority: Some(priority),
                include_msg_data: Some(include_msg_data),
            });
        let response = self.send(request, operation).await?;
        let envelope: DataEnvelope<Option<GroupReport>> = read_json(response, operation).await?;
        Ok(envelope.data)
    }

    /// Unfiltered `GET /api/group`: reports for every live group.
    pub async fn group_reports(
        &self,
        include_msg_data: bool,
    ) -> Result<Vec<GroupReport>, ProbeError> {
        let operation = "GET /api/group";
        let request = self
            .http
            .get(format!("{}/api/group", self.base_url))
            .query(&GroupQuery {
                priority: None,
                include_msg_data: Some(include_msg_data),
            });
        let response = self.send(request, operation).await?;
        let envelope: DataEnvelope<Vec<GroupReport>> = read_json(response, operation).await?;
        Ok(envelope.data)
    }

    /// `DELETE /api/group`: removes every message in the group. Clearing
    /// a priority with no messages is not an error.
    pub async fn clear_group(&self, priority: i32) -> Result<(), ProbeError> {
        let operation = "DELETE /api/group";
        let request = self
            .http
            .delete(format!("{}/api/group", self.base_url))
            .query(&[("priority", priority)]);
        self.send(request, operation).await?;
        Ok(())
    }

    // =========================================================================
    // GROUP DEFAULTS OPERATIONS
    // =========================================================================

    pub async fn group_defaults(
        &self,
        priority: Option<i32>,
    ) -> Result<Vec<GroupDefaultsEntry>, ProbeError> {
        let operation = "GET /api/group-defaults";
        let mut request = self.http.get(format!("{}/api/group-defaults", self.base_url));
        if let Some(priority) = priority {
            request = request.query(&[("priority", priority)]);
        }
        let response = self.send(request, operation).await?;
        let envelope: DataEnvelope<Vec<GroupDefaultsEntry>> =
            read_json(response, operation).await?;
        Ok(envelope.data)
    }

    pub async fn set_group_defaults(&self, entry: &GroupDefaultsEntry) -> Result<(), ProbeError> {
        let operation = "POST /api/group-defaults";
        let request = self
            .http
            .post(format!("{}/api/group-defaults", self.base_url))
            .json(entry);
        self.send(request, operation).await?;
        Ok(())
    }

    pub async fn delete_group_defaults(&self, priority: i32) -> Result<(), ProbeError> {
        let operation = "DELETE /api/group-defaults";
        let request = self
            .http
            .delete(format!("{}/api/group-defaults", self.base_url))
            .query(&[("priority", priority)]);
        self.send(request, operation).await?;
        Ok(())
    }

    // =========================================================================
    // STATS AND STORE OPERATIONS
    // =========================================================================

    pub async fn stats(&self) -> Result<StatsReport, ProbeError> {
        let operation = "GET /api/stats";
        let request = self.http.get(format!("{}/api/stats", self.base_url));
        let response = self.send(request, operation).await?;
        let envelope: DataEnvelope<StatsReport> = read_json(response, operation).await?;
        Ok(envelope.data)
    }

    pub async fn update_stats(&self, update: &StatsUpdate) -> Result<(), ProbeError> {
        let operation = "PUT /api/stats";
        let request = self
            .http
            .put(format!("{}/api/stats", self.base_url))
            .json(update);
        self.send(request, operation).await?;
        Ok(())
    }

    /// `DELETE /api/stats`: zeroes the counters and returns their
    /// pre-reset values.
    pub async fn reset_stats(&self) -> Result<StatsReport, ProbeError> {
        let operation = "DELETE /api/stats";
        let request = self.http.delete(format!("{}/api/stats", self.base_url));
        let response = self.send(request, operation).await?;
        let envelope: DataEnvelope<StatsReport> = read_json(response, operation).await?;
        Ok(envelope.data)
    }

    pub async fn store_report(&self) -> Result<StoreReport, ProbeError> {
        let operation = "GET /api/store";
        let request = self.http.get(format!("{}/api/store", self.base_url));
        let response = self.send(request, operation).await?;
        let envelope: DataEnvelope<StoreReport> = read_json(response, operation).await?;
        Ok(envelope.data)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        operation: &str,
    ) -> Result<reqwest::Response, ProbeError> {
        debug!("{operation}");
        let response = request
            .send()
            .await
            .map_err(|source| ProbeError::transport(operation, source))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProbeError::unexpected_status(
                operation,
                status.as_u16(),
                body,
            ));
        }
        Ok(response)
    }
}

async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    operation: &str,
) -> Result<T, ProbeError> {
    response
        .json()
        .await
        .map_err(|source| ProbeError::malformed_response(operation, source))
}
