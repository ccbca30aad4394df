use crate::errors::PortalError;
use crate::models::{PaymentRequest, PaymentResponse, TaxpayerRecord};
use reqwest;
use std::time::Duration;
use tracing;
use url::Url;

/// Client for the two collaborators behind the portal: the taxpayer lookup
/// service and the payment-initiation service. Both live on the same origin.
#[derive(Clone)]
pub struct PortalClient {
    client: reqwest::Client,
    base_url: Url,
}

impl PortalClient {
    /// Creates a new `PortalClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Origin serving `/contribuyentes` and `/pagar`.
    /// * `timeout` - Optional request timeout. `None` waits indefinitely.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, PortalError> {
        let base_url = Url::parse(base_url).map_err(|e| {
            PortalError::ClientSetup(format!("Invalid base URL '{}': {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(PortalError::ClientSetup(format!(
                "Base URL '{}' cannot carry a path",
                base_url
            )));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/contribuyentes/{dni}`, with the ID as a single encoded segment.
    pub fn lookup_url(&self, national_id: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push("contribuyentes")
                .push(national_id);
        }
        url
    }

    /// `{base}/pagar?dni={dni}&monto={amount}`.
    pub fn payment_url(&self, request: &PaymentRequest) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("pagar");
        }
        url.query_pairs_mut()
            .clear()
            .append_pair("dni", &request.national_id)
            .append_pair("monto", &request.amount_param());
        url
    }

    /// Fetches a taxpayer by national ID.
    ///
    /// Any non-2xx status, transport failure or undecodable body is a
    /// [`PortalError::LookupFailed`].
    pub async fn fetch_taxpayer(&self, national_id: &str) -> Result<TaxpayerRecord, PortalError> {
        let url = self.lookup_url(national_id);
        tracing::info!("Looking up taxpayer {}", national_id);
        tracing::debug!("Lookup URL: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PortalError::LookupFailed(format!("Lookup request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PortalError::LookupFailed(format!(
                "Lookup returned {}: {}",
                status, error_text
            )));
        }

        let record = response.json().await.map_err(|e| {
            PortalError::LookupFailed(format!("Failed to parse lookup response: {}", e))
        })?;

        Ok(record)
    }

    /// Asks the payment-initiation service for a checkout link.
    ///
    /// The request carries `Content-Type: application/json` and no body.
    /// A missing link is not an error at this level; the caller decides.
    pub async fn initiate_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentResponse, PortalError> {
        let url = self.payment_url(request);
        tracing::info!(
            "Initiating payment for {} (amount {})",
            request.national_id,
            request.amount_param()
        );
        tracing::debug!("Payment URL: {}", url);

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| {
                PortalError::PaymentInitiationFailed(format!("Payment request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PortalError::PaymentInitiationFailed(format!(
                "Payment initiation returned {}: {}",
                status, error_text
            )));
        }

        let data: PaymentResponse = response.json().await.map_err(|e| {
            PortalError::PaymentInitiationFailed(format!(
                "Failed to parse payment response: {}",
                e
            ))
        })?;

        if let Some(message) = &data.message {
            tracing::info!("Payment service: {}", message);
        }

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_creation() {
        let client = PortalClient::new("http://localhost:8000", None);
        assert!(client.is_ok());
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let err = PortalClient::new("not a url", None).err();
        assert!(matches!(err, Some(PortalError::ClientSetup(_))));

        let err = PortalClient::new("mailto:someone@example.com", None).err();
        assert!(matches!(err, Some(PortalError::ClientSetup(_))));
    }

    #[test]
    fn test_lookup_url_encodes_id_as_one_segment() {
        let client = PortalClient::new("http://localhost:8000", None).unwrap();
        assert_eq!(
            client.lookup_url("30111222").as_str(),
            "http://localhost:8000/contribuyentes/30111222"
        );
        assert_eq!(
            client.lookup_url("12/34").as_str(),
            "http://localhost:8000/contribuyentes/12%2F34"
        );
    }

    #[test]
    fn test_payment_url_carries_query() {
        let client = PortalClient::new("http://localhost:8000/", None).unwrap();
        let request = PaymentRequest {
            national_id: "30111222".into(),
            amount: 1500.0,
        };
        assert_eq!(
            client.payment_url(&request).as_str(),
            "http://localhost:8000/pagar?dni=30111222&monto=1500"
        );
    }
}
