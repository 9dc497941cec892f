use crate::app::ports::{VerificationOutcome, VerificationPort};
use crate::config::{Credentials, ServiceConfig};
use crate::constants::{AUTH_ID_PARAM, AUTH_TOKEN_PARAM, INCLUDE_INVALID_HEADER};
use crate::error::Result;
use crate::pipeline::wire::{parse_candidates, sanitize_batch};
use crate::types::InputRecord;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use tracing::{debug, error, warn};

/// Verification service client over blocking reqwest.
pub struct HttpVerifier {
    http: Client,
    api_url: String,
    credentials: Credentials,
    include_invalid: bool,
}

impl HttpVerifier {
    pub fn new(service: &ServiceConfig) -> Result<Self> {
        let credentials = service.credentials()?;
        let mut builder = Client::builder()
            .user_agent(format!("list_verifier/{}", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = service.timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            api_url: service.api_url.clone(),
            credentials,
            include_invalid: service.include_invalid,
        })
    }

    fn range(batch: &[InputRecord]) -> (u64, u64) {
        let first = batch.first().map(|r| r.sequence).unwrap_or_default();
        let last = batch.last().map(|r| r.sequence).unwrap_or_default();
        (first, last)
    }
}

impl VerificationPort for HttpVerifier {
    fn verify(&self, batch: &[InputRecord]) -> VerificationOutcome {
        let (first, last) = Self::range(batch);
        let payload = match serde_json::to_string(&sanitize_batch(batch)) {
            Ok(payload) => payload,
            Err(e) => return VerificationOutcome::FatalFailure(format!("Failed to encode batch: {}", e)),
        };

        let mut request = self
            .http
            .post(&self.api_url)
            .query(&[
                (AUTH_ID_PARAM, self.credentials.auth_id.as_str()),
                (AUTH_TOKEN_PARAM, self.credentials.auth_token.as_str()),
            ])
            .header(CONTENT_TYPE, "application/json");
        if self.include_invalid {
            request = request.header(INCLUDE_INVALID_HEADER, "true");
        }

        debug!("Submitting records {}-{} ({} bytes)", first, last, payload.len());
        let response = match request.body(payload.clone()).send() {
            Ok(response) => response,
            Err(e) => {
                error!("Transport error for batch of records ({}-{}): {}", first, last, e);
                debug!("Payload: {}", payload);
                return VerificationOutcome::FatalFailure(e.to_string());
            }
        };

        let status = response.status();
        if status == StatusCode::BAD_REQUEST {
            let reason = status.canonical_reason().unwrap_or("Bad Request").to_string();
            warn!("Bad batch from records {}-{} ({})", first, last, reason);
            debug!("Payload: {}", payload);
            return VerificationOutcome::RecoverableRejection(reason);
        }
        if !status.is_success() {
            error!(
                "HTTP status code for batch of records ({}-{}): {}",
                first,
                last,
                status
            );
            debug!("Payload: {}", payload);
            return VerificationOutcome::FatalFailure(format!("unexpected status {}", status));
        }

        let body = match response.bytes() {
            Ok(body) => body,
            Err(e) => return VerificationOutcome::FatalFailure(format!("Failed to read response body: {}", e)),
        };
        match parse_candidates(&body) {
            Ok(candidates) => VerificationOutcome::Success(candidates),
            Err(e) => {
                error!("Unreadable response for records ({}-{}): {}", first, last, e);
                VerificationOutcome::FatalFailure(format!("malformed response body: {}", e))
            }
        }
    }
}
