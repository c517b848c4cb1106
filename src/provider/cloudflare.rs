// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Cloudflare DNS backend over the v4 HTTP API.
//!
//! Endpoints used:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | Zone lookup | `GET /zones?name=<name>` |
//! | Zone details | `GET /zones/<id>` |
//! | List records | `GET /zones/<id>/dns_records?type=TXT&name.endswith=<domain>&page=<n>&per_page=100` |
//! | Create | `POST /zones/<id>/dns_records` |
//! | Update | `PUT /zones/<id>/dns_records/<record>` |
//! | Delete | `DELETE /zones/<id>/dns_records/<record>` |
//!
//! # Error Mapping
//!
//! - HTTP 404 → [`ProviderError::NotFound`]
//! - HTTP 429 and 5xx, connection failures → [`ProviderError::Transient`]
//! - Other HTTP errors, `success: false` envelopes → [`ProviderError::Api`]
//! - Undecodable bodies → [`ProviderError::InvalidResponse`]

use reqwest::{Client as HttpClient, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use url::Url;

use super::{check_payload, DnsProvider, ProviderLimits, ZoneDetails};
use crate::config::CloudflareConfig;
use crate::constants::{CLOUDFLARE_MAX_TTL_SECS, CLOUDFLARE_MAX_TXT_LEN, CLOUDFLARE_PAGE_SIZE};
use crate::dns_errors::{ConfigError, ProviderError};
use crate::names::{is_within, normalize_name};
use crate::records::{ActualRecord, ActualRecordSet, EditOp};

/// Standard Cloudflare response envelope.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
    result_info: Option<ResultInfo>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResultInfo {
    #[serde(default)]
    page: u32,
    #[serde(default)]
    total_pages: u32,
}

#[derive(Debug, Deserialize)]
struct CfZone {
    id: String,
    name: String,
    #[serde(default)]
    permissions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CfRecord {
    id: String,
    name: String,
    content: String,
    ttl: u32,
}

#[derive(Debug, Serialize)]
struct RecordBody<'a> {
    #[serde(rename = "type")]
    record_type: &'static str,
    name: &'a str,
    content: &'a str,
    ttl: u32,
}

/// DNS provider backed by the Cloudflare API.
pub struct CloudflareProvider {
    client: HttpClient,
    base: Url,
    api_token: String,
}

impl CloudflareProvider {
    /// Create a provider from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty or the base URL is invalid.
    pub fn new(config: &CloudflareConfig) -> Result<Self, ConfigError> {
        Self::with_client(config, HttpClient::new())
    }

    /// Create a provider reusing an existing HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty or the base URL is invalid.
    pub fn with_client(config: &CloudflareConfig, client: HttpClient) -> Result<Self, ConfigError> {
        let base = config.validate()?;
        Ok(Self {
            client,
            base,
            api_token: config.api_token.clone(),
        })
    }

    /// Build an endpoint URL from path segments below the base URL.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // http(s) URLs always have a path that can be extended.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Send one request and decode the Cloudflare envelope.
    async fn request<T, B>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        operation: &str,
    ) -> Result<Envelope<T>, ProviderError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        debug!(method = %method, url = %url, operation = operation, "Cloudflare API request");

        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .bearer_auth(&self.api_token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| ProviderError::Transient {
            operation: operation.to_string(),
            reason: format!("failed to send request to {url}: {e}"),
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(
                method = %method,
                url = %url,
                status = %status,
                error = %text,
                "Cloudflare API request failed"
            );
            return Err(map_status_error(status, operation, &text));
        }

        let envelope: Envelope<T> =
            response
                .json()
                .await
                .map_err(|e| ProviderError::InvalidResponse {
                    operation: operation.to_string(),
                    reason: e.to_string(),
                })?;

        if !envelope.success {
            return Err(ProviderError::Api {
                operation: operation.to_string(),
                status: status.as_u16(),
                message: join_messages(&envelope.errors),
            });
        }

        Ok(envelope)
    }
}

#[async_trait::async_trait]
impl DnsProvider for CloudflareProvider {
    fn name(&self) -> &'static str {
        "cloudflare"
    }

    fn limits(&self) -> ProviderLimits {
        ProviderLimits {
            max_txt_len: CLOUDFLARE_MAX_TXT_LEN,
            max_ttl: Some(CLOUDFLARE_MAX_TTL_SECS),
        }
    }

    async fn zone_id_by_name(&self, name: &str) -> Result<String, ProviderError> {
        let mut url = self.endpoint(&["zones"]);
        url.query_pairs_mut().append_pair("name", name);

        let envelope: Envelope<Vec<CfZone>> = self
            .request(Method::GET, url, None::<&()>, "zone lookup")
            .await?;

        envelope
            .result
            .unwrap_or_default()
            .into_iter()
            .find(|zone| normalize_name(&zone.name) == normalize_name(name))
            .map(|zone| zone.id)
            .ok_or_else(|| ProviderError::NotFound {
                resource: format!("zone named '{name}'"),
            })
    }

    async fn zone_details(&self, zone_id: &str) -> Result<ZoneDetails, ProviderError> {
        let url = self.endpoint(&["zones", zone_id]);
        let envelope: Envelope<CfZone> = self
            .request(Method::GET, url, None::<&()>, "zone details")
            .await?;

        let zone = envelope
            .result
            .ok_or_else(|| ProviderError::InvalidResponse {
                operation: "zone details".into(),
                reason: "missing result".into(),
            })?;

        Ok(ZoneDetails {
            id: zone.id,
            name: normalize_name(&zone.name),
            permissions: zone.permissions,
        })
    }

    async fn list_records(
        &self,
        zone_id: &str,
        domain: &str,
    ) -> Result<ActualRecordSet, ProviderError> {
        let domain = normalize_name(domain);
        let mut records = ActualRecordSet::new();
        let mut page = 1;

        loop {
            let mut url = self.endpoint(&["zones", zone_id, "dns_records"]);
            url.query_pairs_mut()
                .append_pair("type", "TXT")
                .append_pair("name.endswith", &domain)
                .append_pair("page", &page.to_string())
                .append_pair("per_page", &CLOUDFLARE_PAGE_SIZE.to_string());

            let envelope: Envelope<Vec<CfRecord>> = self
                .request(Method::GET, url, None::<&()>, "list records")
                .await?;

            // The server-side suffix filter is not label-aligned.
            for record in envelope.result.unwrap_or_default() {
                let name = normalize_name(&record.name);
                if is_within(&name, &domain) {
                    records.insert(ActualRecord::new(name, record.content, record.ttl, record.id));
                }
            }

            let total_pages = envelope.result_info.map_or(1, |info| {
                debug!(page = info.page, total_pages = info.total_pages, "Listed record page");
                info.total_pages
            });
            if page >= total_pages {
                break;
            }
            page += 1;
        }

        debug!(zone_id = %zone_id, domain = %domain, count = records.len(), "Listed TXT records");
        Ok(records)
    }

    async fn apply_edit(&self, zone_id: &str, op: &EditOp) -> Result<(), ProviderError> {
        check_payload(op, CLOUDFLARE_MAX_TXT_LEN)?;
        let operation = format!("{} {}", op.kind(), op.name());

        match op {
            EditOp::Create { name, content, ttl } => {
                let url = self.endpoint(&["zones", zone_id, "dns_records"]);
                let body = RecordBody {
                    record_type: "TXT",
                    name,
                    content,
                    ttl: *ttl,
                };
                self.request::<serde_json::Value, _>(Method::POST, url, Some(&body), &operation)
                    .await?;
            }
            EditOp::Update {
                name,
                record_id,
                content,
                ttl,
            } => {
                let url = self.endpoint(&["zones", zone_id, "dns_records", record_id]);
                let body = RecordBody {
                    record_type: "TXT",
                    name,
                    content,
                    ttl: *ttl,
                };
                self.request::<serde_json::Value, _>(Method::PUT, url, Some(&body), &operation)
                    .await?;
            }
            EditOp::Delete { record_id, .. } => {
                let url = self.endpoint(&["zones", zone_id, "dns_records", record_id]);
                self.request::<serde_json::Value, ()>(Method::DELETE, url, None, &operation)
                    .await?;
            }
        }

        info!(zone_id = %zone_id, op = %op, "Applied edit via Cloudflare API");
        Ok(())
    }
}

/// Map a non-success HTTP status onto the provider error taxonomy.
fn map_status_error(status: StatusCode, operation: &str, body: &str) -> ProviderError {
    let message = serde_json::from_str::<Envelope<serde_json::Value>>(body)
        .ok()
        .map(|env| join_messages(&env.errors))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.to_string());

    if status == StatusCode::NOT_FOUND {
        ProviderError::NotFound {
            resource: operation.to_string(),
        }
    } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        ProviderError::Transient {
            operation: operation.to_string(),
            reason: format!("HTTP {status}: {message}"),
        }
    } else {
        ProviderError::Api {
            operation: operation.to_string(),
            status: status.as_u16(),
            message,
        }
    }
}

fn join_messages(messages: &[ApiMessage]) -> String {
    messages
        .iter()
        .map(|m| format!("{} ({})", m.message, m.code))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
#[path = "cloudflare_tests.rs"]
mod cloudflare_tests;
