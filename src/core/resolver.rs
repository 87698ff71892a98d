use crate::core::{DisplayField, Endpoint, Identity, IdentityResolver, Resolution};
use crate::utils::error::{EtlError, Result};
use reqwest::Client;
use serde_json::error::Category;
use url::Url;

const USERS_PATH: [&str; 3] = ["api", "v4", "users"];

/// Resolves user IDs against the Mattermost REST API, one request per call.
pub struct HttpResolver {
    endpoint: Endpoint,
    client: Client,
}

impl HttpResolver {
    pub fn new(endpoint: Endpoint) -> Self {
        Self::with_client(endpoint, Client::new())
    }

    pub fn with_client(endpoint: Endpoint, client: Client) -> Self {
        Self { endpoint, client }
    }
}

/// `{scheme}://{host}:{port}/api/v4/users/{identifier}`, with the identifier
/// encoded as a single path segment.
pub fn user_url(endpoint: &Endpoint, identifier: &str) -> Result<Url> {
    let mut url = endpoint.base_url()?;
    url.path_segments_mut()
        .map_err(|_| EtlError::ConfigError {
            message: format!("'{}' cannot be used as a base URL", url_base(endpoint)),
        })?
        .pop_if_empty()
        .extend(USERS_PATH.iter().copied().chain(std::iter::once(identifier)));
    Ok(url)
}

fn url_base(endpoint: &Endpoint) -> String {
    format!("{}://{}:{}", endpoint.scheme, endpoint.host, endpoint.port)
}

/// Turns a response body into a display value.
///
/// A body that is not JSON at all means the server is not answering as a
/// Mattermost directory, which is fatal. Well-formed JSON of the wrong shape
/// (missing or mistyped user fields, such as an API error object) only
/// fails the current row.
pub fn decode_identity(identifier: &str, body: &[u8], display: DisplayField) -> Result<Resolution> {
    match serde_json::from_slice::<Identity>(body) {
        Ok(identity) => {
            tracing::debug!(
                "Username: {} Email: {} Full Name: {}",
                identity.username,
                identity.email,
                identity.full_name()
            );
            Ok(Resolution::Resolved(identity.display_value(display)))
        }
        Err(e) if e.classify() == Category::Data => Ok(Resolution::Unresolved {
            reason: e.to_string(),
        }),
        Err(source) => Err(EtlError::InvalidResponse {
            identifier: identifier.to_string(),
            source,
        }),
    }
}

#[async_trait::async_trait]
impl IdentityResolver for HttpResolver {
    async fn resolve(&self, identifier: &str, display: DisplayField) -> Result<Resolution> {
        tracing::debug!(
            "Retrieving user data from Mattermost for user ID: {}",
            identifier
        );

        let url = user_url(&self.endpoint, identifier)?;
        tracing::debug!("URL to call: {}", url);

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.endpoint.token)
            .send()
            .await?;

        tracing::debug!("API response status: {}", response.status());

        let body = response.bytes().await?;
        decode_identity(identifier, &body, display)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Scheme;
    use httpmock::prelude::*;

    fn endpoint_for(server: &MockServer) -> Endpoint {
        Endpoint::new(
            Scheme::Http,
            server.host(),
            server.port().to_string(),
            "test-token",
        )
    }

    #[test]
    fn test_user_url_layout() {
        let endpoint = Endpoint::new(Scheme::Https, "chat.example.com", "443", "t");
        let url = user_url(&endpoint, "4xp9fdt6ypb").unwrap();
        // 443 is the https default, so the url crate drops it.
        assert_eq!(url.as_str(), "https://chat.example.com/api/v4/users/4xp9fdt6ypb");

        let endpoint = Endpoint::new(Scheme::Http, "localhost", "8065", "t");
        let url = user_url(&endpoint, "abc").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8065/api/v4/users/abc");
    }

    #[test]
    fn test_user_url_encodes_identifier() {
        let endpoint = Endpoint::new(Scheme::Http, "localhost", "8065", "t");
        let url = user_url(&endpoint, "a/b c").unwrap();
        assert_eq!(url.path(), "/api/v4/users/a%2Fb%20c");
    }

    #[test]
    fn test_decode_missing_field_is_unresolved() {
        let body = br#"{"username":"alice","first_name":"A","last_name":"B"}"#;
        let result = decode_identity("u1", body, DisplayField::Username).unwrap();
        match result {
            Resolution::Unresolved { reason } => assert!(reason.contains("email")),
            other => panic!("unexpected resolution: {:?}", other),
        }
    }

    #[test]
    fn test_decode_api_error_object_is_unresolved() {
        let body = br#"{"id":"app.user.missing_account.const","message":"Unable to find the user.","status_code":404}"#;
        let result = decode_identity("u1", body, DisplayField::Username).unwrap();
        assert!(matches!(result, Resolution::Unresolved { .. }));
    }

    #[test]
    fn test_decode_non_json_is_fatal() {
        let result = decode_identity("u1", b"<html>502 Bad Gateway</html>", DisplayField::Username);
        assert!(matches!(result, Err(EtlError::InvalidResponse { .. })));

        let result = decode_identity("u1", b"", DisplayField::Username);
        assert!(matches!(result, Err(EtlError::InvalidResponse { .. })));
    }

    #[tokio::test]
    async fn test_resolve_sends_bearer_token() {
        let server = MockServer::start_async().await;
        let api_mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v4/users/u1")
                    .header("authorization", "Bearer test-token");
                then.status(200)
                    .header("Content-Type", "application/json")
                    .json_body(serde_json::json!({
                        "id": "u1",
                        "username": "alice",
                        "email": "alice@example.com",
                        "first_name": "Alice",
                        "last_name": "Smith"
                    }));
            })
            .await;

        let resolver = HttpResolver::new(endpoint_for(&server));

        let username = resolver.resolve("u1", DisplayField::Username).await.unwrap();
        assert_eq!(username, Resolution::Resolved("alice".to_string()));

        let full_name = resolver.resolve("u1", DisplayField::FullName).await.unwrap();
        assert_eq!(full_name, Resolution::Resolved("Alice Smith".to_string()));

        // No caching: both lookups reach the server.
        api_mock.assert_hits_async(2).await;
    }

    #[tokio::test]
    async fn test_resolve_not_found_is_unresolved() {
        let server = MockServer::start_async().await;
        let api_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v4/users/missing");
                then.status(404).json_body(serde_json::json!({
                    "id": "app.user.missing_account.const",
                    "message": "Unable to find the user.",
                    "status_code": 404
                }));
            })
            .await;

        let resolver = HttpResolver::new(endpoint_for(&server));
        let result = resolver
            .resolve("missing", DisplayField::Username)
            .await
            .unwrap();

        api_mock.assert_async().await;
        assert!(matches!(result, Resolution::Unresolved { .. }));
    }

    #[tokio::test]
    async fn test_resolve_unreachable_server_is_fatal() {
        // Nothing listens on port 1.
        let resolver = HttpResolver::new(Endpoint::new(Scheme::Http, "127.0.0.1", "1", "t"));
        let result = resolver.resolve("u1", DisplayField::Username).await;
        assert!(matches!(result, Err(EtlError::ApiError(_))));
    }
}
