//! Authentication backend client
//!
//! Thin blocking client for the external user service:
//! - account registration
//! - login
//! - email verification links
//!
//! There is no retry or backoff. Callers on an async runtime should run
//! these calls on the blocking pool.

use std::time::Duration;

use crate::error::{ServiceError, ServiceResult};
use crate::validation::{LoginForm, SignupForm};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);
const USER_SERVICE_PATH: &str = "/api/v1/user";

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Backend origin, e.g. `https://api.example.org`.
    pub api_url: String,
    pub timeout: Duration,
    /// Bearer token attached to every request when present.
    pub token: Option<String>,
}

impl AuthConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            timeout: DEFAULT_TIMEOUT,
            token: None,
        }
    }
}

/// Body of a registration request; the confirmation and terms fields of
/// the signup form stay client-side.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub password: String,
    pub spiritual_name: String,
    pub interests: Vec<String>,
}

impl From<&SignupForm> for SignupRequest {
    fn from(form: &SignupForm) -> Self {
        Self {
            first_name: form.first_name.trim().to_string(),
            last_name: form.last_name.trim().to_string(),
            email: form.email.trim().to_string(),
            phone: form.phone.trim().to_string(),
            address: form.address.trim().to_string(),
            password: form.password.clone(),
            spiritual_name: form.spiritual_name.trim().to_string(),
            interests: form.interests.clone(),
        }
    }
}

/// Response envelope used by every endpoint of the user service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AuthResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

pub struct AuthClient {
    base_url: String,
    token: Option<String>,
    agent: ureq::Agent,
}

impl AuthClient {
    pub fn new(config: AuthConfig) -> Self {
        let base_url = format!(
            "{}{}",
            config.api_url.trim_end_matches('/'),
            USER_SERVICE_PATH
        );
        let agent = ureq::AgentBuilder::new().timeout(config.timeout).build();
        Self {
            base_url,
            token: config.token,
            agent,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: &str, path: &str) -> ureq::Request {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self
            .agent
            .request(method, &url)
            .set("Content-Type", "application/json");
        if let Some(token) = &self.token {
            request = request.set("Authorization", &format!("Bearer {}", token));
        }
        request
    }

    /// `POST /register`
    pub fn register(&self, signup: &SignupRequest) -> ServiceResult<AuthResponse> {
        let result = self.request("POST", "/register").send_json(signup);
        Self::read(result).inspect_err(|e| tracing::warn!("Register failed: {e}"))
    }

    /// `POST /login`
    pub fn login(&self, credentials: &LoginForm) -> ServiceResult<AuthResponse> {
        let result = self.request("POST", "/login").send_json(credentials);
        Self::read(result).inspect_err(|e| tracing::warn!("Login failed: {e}"))
    }

    /// `GET /auth/verify-email?token=...`
    pub fn verify_email(&self, token: &str) -> ServiceResult<AuthResponse> {
        if token.trim().is_empty() {
            return Err(ServiceError::Validation(vec![
                "Invalid verification link. No token provided.".to_string(),
            ]));
        }
        let result = self
            .request("GET", "/auth/verify-email")
            .query("token", token)
            .call();
        Self::read(result).inspect_err(|e| tracing::warn!("Email verification failed: {e}"))
    }

    fn read(result: Result<ureq::Response, ureq::Error>) -> ServiceResult<AuthResponse> {
        match result {
            Ok(response) => response.into_json::<AuthResponse>().map_err(|e| {
                ServiceError::NetworkError(format!("Failed to read response: {}", e))
            }),
            Err(ureq::Error::Status(status, response)) => Err(normalize_error(status, response)),
            Err(ureq::Error::Transport(transport)) => Err(ServiceError::NetworkError(format!(
                "Failed to reach auth service: {}",
                transport
            ))),
        }
    }
}

/// Prefer the backend's own `message` over a bare status line.
fn normalize_error(status: u16, response: ureq::Response) -> ServiceError {
    let message = response
        .into_string()
        .ok()
        .and_then(|body| serde_json::from_str::<Value>(&body).ok())
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_owned))
        .unwrap_or_else(|| format!("HTTP {status}"));

    match status {
        401 => ServiceError::Unauthorized(message),
        _ => ServiceError::ApiError { status, message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn client(url: &str) -> AuthClient {
        AuthClient::new(AuthConfig::new(url))
    }

    fn signup() -> SignupRequest {
        SignupRequest {
            first_name: "Radha".into(),
            last_name: "Devi".into(),
            email: "radha@temple.org".into(),
            phone: "+15550101".into(),
            address: "12 Temple Road, Springfield".into(),
            password: "hare#krishna".into(),
            spiritual_name: "Radha Devi Dasi".into(),
            interests: vec!["kirtan".into()],
        }
    }

    #[test]
    fn base_url_points_at_user_service() {
        assert_eq!(
            client("http://localhost:4000/").base_url(),
            "http://localhost:4000/api/v1/user"
        );
    }

    #[test]
    fn register_posts_json_body() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/api/v1/user/register")
            .match_header("content-type", "application/json")
            .match_body(Matcher::PartialJson(json!({
                "firstName": "Radha",
                "spiritualName": "Radha Devi Dasi"
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":"Registered","data":{"id":"u1"}}"#)
            .create();

        let response = client(&server.url()).register(&signup()).unwrap();
        mock.assert();
        assert_eq!(response.message.as_deref(), Some("Registered"));
        assert_eq!(response.data, Some(json!({ "id": "u1" })));
    }

    #[test]
    fn login_sends_bearer_token_when_configured() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/api/v1/user/login")
            .match_header("authorization", "Bearer t0k3n")
            .with_status(200)
            .with_body(r#"{"message":"Welcome"}"#)
            .create();

        let mut config = AuthConfig::new(server.url());
        config.token = Some("t0k3n".into());
        let form = LoginForm {
            email: "radha@temple.org".into(),
            password: "hare#krishna".into(),
        };
        let response = AuthClient::new(config).login(&form).unwrap();
        mock.assert();
        assert_eq!(response.message.as_deref(), Some("Welcome"));
    }

    #[test]
    fn error_body_message_is_surfaced() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/api/v1/user/register")
            .with_status(409)
            .with_body(r#"{"message":"Email already registered"}"#)
            .create();

        let err = client(&server.url()).register(&signup()).unwrap_err();
        match err {
            ServiceError::ApiError { status, message } => {
                assert_eq!(status, 409);
                assert_eq!(message, "Email already registered");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unauthorized_maps_to_its_own_variant() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/api/v1/user/login")
            .with_status(401)
            .with_body("not json")
            .create();

        let form = LoginForm {
            email: "radha@temple.org".into(),
            password: "wrong".into(),
        };
        let err = client(&server.url()).login(&form).unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(ref m) if m == "HTTP 401"));
    }

    #[test]
    fn verify_email_passes_token_as_query() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/api/v1/user/auth/verify-email")
            .match_query(Matcher::UrlEncoded("token".into(), "abc 123".into()))
            .with_status(200)
            .with_body(r#"{"message":"Email verified successfully!"}"#)
            .create();

        let response = client(&server.url()).verify_email("abc 123").unwrap();
        mock.assert();
        assert_eq!(
            response.message.as_deref(),
            Some("Email verified successfully!")
        );
    }

    #[test]
    fn verify_email_requires_token() {
        let err = client("http://127.0.0.1:9").verify_email(" ").unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn unreachable_backend_is_a_network_error() {
        let mut config = AuthConfig::new("http://127.0.0.1:9");
        config.timeout = Duration::from_millis(500);
        let form = LoginForm::default();
        let err = AuthClient::new(config).login(&form).unwrap_err();
        assert!(matches!(err, ServiceError::NetworkError(_)));
    }
}
