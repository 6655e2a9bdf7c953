//! Authorization Code flow client
//!
//! Two fixed HTTP exchanges against the identity provider: building the
//! `/authorize` URL the browser is redirected to, and trading the returned
//! code for an access token at `/oauth/token`.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Encode set for query parameter values. Escapes everything that would
/// corrupt the query string but leaves `:` and `/` literal, which RFC 3986
/// permits inside a query, so a typical `https://...` redirect_uri passes
/// through unchanged.
const QUERY_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'>')
    .add(b'=')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Error, Debug)]
pub enum CodeFlowError {
    /// Token endpoint answered with a non-success status
    #[error("access token could not be exchanged: {status}: {body}")]
    Exchange { status: StatusCode, body: String },

    /// Token endpoint answered 200 but the body was not JSON with a
    /// string `access_token` field
    #[error("token response did not contain an access_token")]
    MalformedResponse,

    /// Transport-level failure reaching the token endpoint
    #[error("token endpoint request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Identity provider endpoints and client credentials.
#[derive(Debug, Clone)]
pub struct CodeFlowConfig {
    pub authorize_url: String,
    pub token_url: String,
    pub client_id: String,
    pub client_secret: String,
}

impl CodeFlowConfig {
    /// Standard Auth0-style endpoints for a tenant domain (no scheme).
    pub fn for_domain(domain: &str, client_id: String, client_secret: String) -> Self {
        Self {
            authorize_url: format!("https://{domain}/authorize"),
            token_url: format!("https://{domain}/oauth/token"),
            client_id,
            client_secret,
        }
    }
}

/// Stateless client for the Authorization Code flow. One instance per
/// process, cheap to clone, safe to share across requests.
#[derive(Clone)]
pub struct CodeFlowClient {
    config: CodeFlowConfig,
    http_client: reqwest::Client,
}

impl CodeFlowClient {
    pub fn new(config: CodeFlowConfig, http_client: reqwest::Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    /// Build the provider authorization URL the browser is sent to.
    ///
    /// Parameter order matches what the provider documents for the flow:
    /// `response_type`, `client_id`, `scope`, `redirect_uri`, `audience`.
    pub fn authorization_url(&self, redirect_uri: &str, audience: &str, scope: &str) -> String {
        format!(
            "{}?response_type=code&client_id={}&scope={}&redirect_uri={}&audience={}",
            self.config.authorize_url,
            utf8_percent_encode(&self.config.client_id, QUERY_VALUE),
            utf8_percent_encode(scope, QUERY_VALUE),
            utf8_percent_encode(redirect_uri, QUERY_VALUE),
            utf8_percent_encode(audience, QUERY_VALUE),
        )
    }

    /// Exchange an authorization code for an access token.
    ///
    /// Sends `POST {token_url}` with HTTP Basic client credentials and a
    /// form-encoded `authorization_code` grant. The token lives only for
    /// the duration of the inbound request that triggered the exchange.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<String, CodeFlowError> {
        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: Option<String>,
        }

        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ];

        let response = self
            .http_client
            .post(&self.config.token_url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CodeFlowError::Exchange { status, body });
        }

        let body = response.text().await?;
        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|_| CodeFlowError::MalformedResponse)?;

        token.access_token.ok_or(CodeFlowError::MalformedResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use pretty_assertions::assert_eq;

    fn client_for(config: CodeFlowConfig) -> CodeFlowClient {
        CodeFlowClient::new(config, reqwest::Client::new())
    }

    fn example_config() -> CodeFlowConfig {
        CodeFlowConfig::for_domain("example.auth0.com", "abc".to_string(), "secret".to_string())
    }

    #[test]
    fn test_authorization_url_exact() {
        let client = client_for(example_config());

        let url = client.authorization_url("https://app/cb", "api", "openid");

        assert_eq!(
            url,
            "https://example.auth0.com/authorize?response_type=code&client_id=abc&scope=openid&redirect_uri=https://app/cb&audience=api"
        );
    }

    #[test]
    fn test_authorization_url_encodes_reserved_characters() {
        let client = client_for(example_config());

        let url = client.authorization_url("https://app/cb?x=1", "aud&ience", "openid profile");

        assert!(url.contains("scope=openid%20profile"));
        assert!(url.contains("redirect_uri=https://app/cb%3Fx%3D1"));
        assert!(url.contains("audience=aud%26ience"));
    }

    fn mock_config(server: &mockito::Server) -> CodeFlowConfig {
        CodeFlowConfig {
            authorize_url: format!("{}/authorize", server.url()),
            token_url: format!("{}/oauth/token", server.url()),
            client_id: "abc".to_string(),
            client_secret: "secret".to_string(),
        }
    }

    #[tokio::test]
    async fn test_exchange_code_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth/token")
            // base64("abc:secret")
            .match_header("authorization", "Basic YWJjOnNlY3JldA==")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
                Matcher::UrlEncoded("code".into(), "code123".into()),
                Matcher::UrlEncoded("redirect_uri".into(), "https://app/cb".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"tok123"}"#)
            .create_async()
            .await;

        let client = client_for(mock_config(&server));
        let token = client
            .exchange_code("code123", "https://app/cb")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(token, "tok123");
    }

    #[tokio::test]
    async fn test_exchange_code_non_success_carries_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/oauth/token")
            .with_status(401)
            .with_body("invalid_client")
            .create_async()
            .await;

        let client = client_for(mock_config(&server));
        let err = client
            .exchange_code("code123", "https://app/cb")
            .await
            .unwrap_err();

        match err {
            CodeFlowError::Exchange { status, body } => {
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert_eq!(body, "invalid_client");
            }
            other => panic!("expected Exchange error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_exchange_code_missing_access_token() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/oauth/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{}")
            .create_async()
            .await;

        let client = client_for(mock_config(&server));
        let err = client
            .exchange_code("code123", "https://app/cb")
            .await
            .unwrap_err();

        assert!(matches!(err, CodeFlowError::MalformedResponse));
    }

    #[tokio::test]
    async fn test_exchange_code_body_not_json() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/oauth/token")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let client = client_for(mock_config(&server));
        let err = client
            .exchange_code("code123", "https://app/cb")
            .await
            .unwrap_err();

        assert!(matches!(err, CodeFlowError::MalformedResponse));
    }
}
