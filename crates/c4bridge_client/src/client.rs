use std::fmt::Display;

use reqwest::StatusCode;
use tracing::debug;
use url::Url;

use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::query;
use crate::snapshot::VariableSnapshot;

/// Reads and writes the variables of one Control4 proxy.
///
/// Each call is a single stateless GET bounded by the endpoint timeout.
/// The response is owned by the call's future, so its connection goes back
/// to the pool (or is closed) on success, on error, and when the future is
/// dropped mid-flight.
#[derive(Debug, Clone)]
pub struct VariableClient {
    http: reqwest::Client,
    endpoint: Endpoint,
}

impl VariableClient {
    /// Create a client with its own connection pool.
    pub fn new(endpoint: Endpoint) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("c4bridge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(Error::ClientBuild)?;
        Ok(Self::with_client(http, endpoint))
    }

    /// Create a client sharing an existing `reqwest::Client` and its pool.
    pub fn with_client(http: reqwest::Client, endpoint: Endpoint) -> Self {
        Self { http, endpoint }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// URL of a `get` for `variable_ids`.
    pub fn get_url<S: AsRef<str>>(&self, variable_ids: &[S]) -> Url {
        let joined = variable_ids
            .iter()
            .map(|id| id.as_ref())
            .collect::<Vec<&str>>()
            .join(",");
        let proxy_id = self.endpoint.proxy_id().to_string();

        query::merge_query(
            self.endpoint.base_url(),
            &[
                (query::COMMAND, "get"),
                (query::PROXY_ID, proxy_id.as_str()),
                (query::VARIABLE_ID, joined.as_str()),
            ],
        )
    }

    /// URL of a `set` writing `value` to `variable_id`.
    pub fn set_url(&self, variable_id: &str, value: impl Display) -> Url {
        let proxy_id = self.endpoint.proxy_id().to_string();
        let value = value.to_string();

        query::merge_query(
            self.endpoint.base_url(),
            &[
                (query::COMMAND, "set"),
                (query::PROXY_ID, proxy_id.as_str()),
                (query::VARIABLE_ID, variable_id),
                (query::NEW_VALUE, value.as_str()),
            ],
        )
    }

    /// Read `variable_ids`, returning their raw values.
    ///
    /// Fails with [`Error::MalformedResponse`] unless every requested ID is
    /// present in the response. No partial snapshot is ever returned.
    pub async fn get<S: AsRef<str>>(&self, variable_ids: &[S]) -> Result<VariableSnapshot, Error> {
        if variable_ids.is_empty() {
            return Err(Error::EmptyRequest);
        }

        let response = self.send(self.get_url(variable_ids)).await?;
        let body = response.text().await.map_err(Error::transient)?;

        VariableSnapshot::from_body(&body, variable_ids)
    }

    /// Write `value` to `variable_id`.
    ///
    /// Success means the driver accepted the request, not that the proxy
    /// now reports the value; poll with [`get`](Self::get) to confirm.
    pub async fn set(&self, variable_id: &str, value: impl Display) -> Result<(), Error> {
        self.send(self.set_url(variable_id, value)).await?;
        Ok(())
    }

    async fn send(&self, url: Url) -> Result<reqwest::Response, Error> {
        debug!("GET {}", url);

        let response = self
            .http
            .get(url)
            .timeout(self.endpoint.timeout())
            .send()
            .await
            .map_err(Error::transient)?;

        let status = response.status();
        if status != StatusCode::OK {
            debug!(
                "Web driver for proxy {} answered HTTP {}",
                self.endpoint.proxy_id(),
                status
            );
            return Err(Error::RemoteRejected {
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}
