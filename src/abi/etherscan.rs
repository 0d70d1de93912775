//! Fetching ABIs from Etherscan-compatible block explorers.
//!
//! Error messages from this module are sanitized: they never embed the
//! request URL or API key material, only the network name and the
//! contract address the user already supplied.

use std::time::Duration;

use serde_json::Value;
use url::Url;

use crate::errors::ForgeError;
use crate::networks::NetworkDescriptor;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct ExplorerClient {
    http: reqwest::Client,
    network: &'static NetworkDescriptor,
    api_key: Option<String>,
}

impl ExplorerClient {
    /// Build a client for one network, reading the API key from the
    /// network's environment variable when set.
    pub fn for_network(network: &'static NetworkDescriptor) -> Result<Self, ForgeError> {
        let api_key = network
            .api_key_env_var
            .and_then(|var| std::env::var(var).ok())
            .filter(|k| !k.is_empty());
        if api_key.is_none() {
            tracing::debug!(network = network.name, "no explorer API key configured");
        }
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ForgeError::AbiFetch(format!("could not build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            network,
            api_key,
        })
    }

    /// Fetch the verified ABI for a contract address.
    pub async fn fetch_abi(&self, address: &str) -> Result<Value, ForgeError> {
        let url = self.build_url(address)?;
        tracing::debug!(
            network = self.network.name,
            address,
            "fetching ABI from explorer"
        );

        let response = self.http.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ForgeError::AbiFetch(format!(
                    "request timed out while fetching ABI from the {} explorer",
                    self.network.name
                ))
            } else if e.is_connect() {
                ForgeError::AbiFetch(format!(
                    "failed to connect to the {} explorer",
                    self.network.name
                ))
            } else {
                ForgeError::AbiFetch(format!(
                    "network error while fetching ABI from the {} explorer",
                    self.network.name
                ))
            }
        })?;

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "explorer returned HTTP error");
            return Err(ForgeError::AbiFetch(format!(
                "the {} explorer returned an HTTP error; try again later or use a local ABI file",
                self.network.name
            )));
        }

        let body = response.text().await.map_err(|_| {
            ForgeError::AbiFetch(format!(
                "failed to read the {} explorer response",
                self.network.name
            ))
        })?;

        parse_explorer_response(&body, self.network.name, address)
    }

    fn build_url(&self, address: &str) -> Result<Url, ForgeError> {
        let mut url = Url::parse(&format!("https://{}/api", self.network.explorer_host))
            .map_err(|e| ForgeError::AbiFetch(format!("invalid explorer host: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("module", "contract")
            .append_pair("action", "getabi")
            .append_pair("address", address);
        if let Some(key) = &self.api_key {
            url.query_pairs_mut().append_pair("apikey", key);
        }
        Ok(url)
    }
}

/// Classify an explorer response envelope and extract the ABI on success.
/// Pure so the failure modes stay testable without a network.
pub fn parse_explorer_response(
    body: &str,
    network: &str,
    address: &str,
) -> Result<Value, ForgeError> {
    let data: Value = serde_json::from_str(body).map_err(|_| {
        ForgeError::AbiFetch(format!(
            "invalid response from the {} explorer; try again later or use a local ABI file",
            network
        ))
    })?;

    let status = data.get("status").and_then(Value::as_str).unwrap_or("");
    let result = data
        .get("result")
        .and_then(Value::as_str)
        .unwrap_or_default();

    if status != "1" {
        let reason = result.to_ascii_lowercase();
        let message = if reason.contains("not verified") {
            format!(
                "contract {} is not verified on the {} explorer; provide the ABI via a local file",
                address, network
            )
        } else if reason.contains("invalid api key") || reason.contains("invalid apikey") {
            format!(
                "invalid API key for the {} explorer; check the key environment variable",
                network
            )
        } else if reason.contains("rate limit") {
            format!(
                "API rate limit exceeded for the {} explorer; wait and retry, or configure an API key",
                network
            )
        } else if reason.contains("invalid address") {
            format!("the {} explorer rejected address {}", network, address)
        } else {
            tracing::debug!(status = status, "explorer API error");
            format!(
                "the {} explorer could not return an ABI; the contract may be unverified",
                network
            )
        };
        return Err(ForgeError::AbiFetch(message));
    }

    let abi: Value = serde_json::from_str(result).map_err(|_| {
        ForgeError::AbiFetch(format!(
            "the {} explorer returned data that is not a valid ABI",
            network
        ))
    })?;

    if !abi.is_array() {
        return Err(ForgeError::AbiFetch(format!(
            "the {} explorer returned data that is not an ABI array",
            network
        )));
    }

    tracing::info!(
        network,
        address,
        entries = abi.as_array().map(Vec::len).unwrap_or(0),
        "fetched ABI from explorer"
    );
    Ok(abi)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "0x6B175474E89094C44Da98b954EedeAC495271d0F";

    #[test]
    fn test_parse_successful_response() {
        let body = r#"{
            "status": "1",
            "message": "OK",
            "result": "[{\"type\":\"event\",\"name\":\"Transfer\",\"inputs\":[]}]"
        }"#;
        let abi = parse_explorer_response(body, "ethereum", ADDR).unwrap();
        assert_eq!(abi.as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_parse_unverified_contract() {
        let body = r#"{
            "status": "0",
            "message": "NOTOK",
            "result": "Contract source code not verified"
        }"#;
        let err = parse_explorer_response(body, "ethereum", ADDR).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("not verified"));
        assert!(!msg.contains("http"), "message must not leak URLs: {}", msg);
    }

    #[test]
    fn test_parse_invalid_api_key() {
        let body = r#"{"status": "0", "message": "NOTOK", "result": "Invalid API Key"}"#;
        let err = parse_explorer_response(body, "optimism", ADDR).unwrap_err();
        assert!(err.to_string().contains("invalid API key"));
    }

    #[test]
    fn test_parse_rate_limit() {
        let body =
            r#"{"status": "0", "message": "NOTOK", "result": "Max rate limit reached"}"#;
        let err = parse_explorer_response(body, "arbitrum", ADDR).unwrap_err();
        assert!(err.to_string().contains("rate limit"));
    }

    #[test]
    fn test_parse_invalid_address() {
        let body = r#"{"status": "0", "message": "NOTOK", "result": "Error! Invalid address format"}"#;
        let err = parse_explorer_response(body, "ethereum", ADDR).unwrap_err();
        assert!(err.to_string().contains(ADDR));
    }

    #[test]
    fn test_parse_garbage_body() {
        let err = parse_explorer_response("<html>503</html>", "ethereum", ADDR).unwrap_err();
        assert!(err.to_string().contains("invalid response"));
    }

    #[test]
    fn test_parse_result_not_an_abi() {
        let body = r#"{"status": "1", "message": "OK", "result": "{\"not\": \"a list\"}"}"#;
        let err = parse_explorer_response(body, "ethereum", ADDR).unwrap_err();
        assert!(err.to_string().contains("not an ABI array"));
    }
}
