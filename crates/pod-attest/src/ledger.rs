// ledger.rs — HTTP client for an attestation ledger gateway.
//
// The gateway accepts `POST <endpoint>/attestations` with the schema uid,
// the encoded record and its digest, and answers `{ "uid", "tx_hash" }`.
//
// Degradation rules:
//   - endpoint, api key or schema uid missing → mocked attestation
//   - connect/timeout failure                → mocked attestation (warn)
//   - non-success status / malformed reply   → AttestError

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};

use crate::attestor::Attestor;
use crate::error::AttestError;
use crate::record::{Attestation, AttestationRecord, SCHEMA};

/// Credentials for a real ledger; all three are required.
#[derive(Debug, Clone)]
pub struct LedgerCredentials {
    pub endpoint: String,
    pub api_key: String,
    pub schema_uid: String,
}

/// Attestor that publishes through a ledger gateway, falling back to mocks.
pub struct LedgerAttestor {
    client: Client,
    credentials: Option<LedgerCredentials>,
}

#[derive(Debug, Serialize)]
struct PublishRequest<'a> {
    schema_uid: &'a str,
    schema: &'a str,
    data: &'a AttestationRecord,
    digest: String,
    revocable: bool,
}

#[derive(Debug, Deserialize)]
struct PublishResponse {
    uid: String,
    #[serde(alias = "txHash")]
    tx_hash: String,
}

impl LedgerAttestor {
    /// Build an attestor. Incomplete credentials put it in mocked mode.
    pub fn new(
        endpoint: Option<String>,
        api_key: Option<String>,
        schema_uid: Option<String>,
        timeout: Duration,
    ) -> Result<Self, AttestError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AttestError::Client(e.to_string()))?;

        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        let credentials = match (non_empty(endpoint), non_empty(api_key), non_empty(schema_uid)) {
            (Some(endpoint), Some(api_key), Some(schema_uid)) => Some(LedgerCredentials {
                endpoint: endpoint.trim_end_matches('/').to_string(),
                api_key,
                schema_uid,
            }),
            _ => {
                tracing::warn!("ledger credentials incomplete, attestations will be mocked");
                None
            }
        };

        Ok(Self {
            client,
            credentials,
        })
    }

    /// True when every publish will be mocked.
    pub fn is_mocked(&self) -> bool {
        self.credentials.is_none()
    }

    async fn publish_remote(
        &self,
        credentials: &LedgerCredentials,
        record: &AttestationRecord,
    ) -> Result<Attestation, AttestError> {
        let body = PublishRequest {
            schema_uid: &credentials.schema_uid,
            schema: SCHEMA,
            data: record,
            digest: record.digest(),
            revocable: true,
        };

        let sent = self
            .client
            .post(format!("{}/attestations", credentials.endpoint))
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", credentials.api_key),
            )
            .json(&body)
            .send()
            .await;

        let response = match sent {
            Ok(response) => response,
            Err(e) if e.is_connect() || e.is_timeout() => {
                tracing::warn!(
                    goal_ref = %record.reference,
                    error = %e,
                    "ledger unreachable, falling back to mocked attestation"
                );
                return Ok(record.mocked());
            }
            Err(e) => {
                return Err(AttestError::Rejected {
                    status: 0,
                    message: e.to_string(),
                })
            }
        };

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AttestError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let reply: PublishResponse = response
            .json()
            .await
            .map_err(|e| AttestError::Parse(e.to_string()))?;

        Ok(Attestation {
            attestation_id: reply.uid,
            tx_ref: reply.tx_hash,
            mocked: false,
        })
    }
}

#[async_trait]
impl Attestor for LedgerAttestor {
    fn name(&self) -> &str {
        if self.is_mocked() {
            "ledger (mocked)"
        } else {
            "ledger"
        }
    }

    async fn publish(&self, record: &AttestationRecord) -> Result<Attestation, AttestError> {
        let Some(credentials) = &self.credentials else {
            return Ok(record.mocked());
        };
        let attestation = self.publish_remote(credentials, record).await?;
        tracing::info!(
            goal_ref = %record.reference,
            attestation_id = %attestation.attestation_id,
            mocked = attestation.mocked,
            "attestation published"
        );
        Ok(attestation)
    }
}
