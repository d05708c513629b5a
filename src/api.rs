use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde_json::Value;
use tracing::debug;

use crate::error::AppError;
use crate::models::{Credentials, Registration, Session, Todo};

const LOGIN_FAILED: &str = "Login failed. Please check your credentials.";
const REGISTRATION_FAILED: &str = "Registration failed";

/// Typed client for the backend REST contract.
///
/// Protected calls take the caller's bearer token; `None` sends the request without an
/// `Authorization` header and lets the backend answer with 401.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
}

impl ApiClient {
    pub fn new(base: Url) -> Result<Self, AppError> {
        let http = Client::builder().build()?;
        Ok(Self::with_client(http, base))
    }

    pub fn with_client(http: Client, base: Url) -> Self {
        ApiClient { http, base }
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorized(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub async fn register(&self, registration: &Registration) -> Result<Value, AppError> {
        let resp = self
            .http
            .post(self.endpoint(&["auth", "register"]))
            .json(registration)
            .send()
            .await?;
        let resp = check_credentials(resp, REGISTRATION_FAILED).await?;
        Ok(resp.json().await?)
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<Session, AppError> {
        let resp = self
            .http
            .post(self.endpoint(&["auth", "login"]))
            .json(credentials)
            .send()
            .await?;
        let resp = check_credentials(resp, LOGIN_FAILED).await?;
        Ok(resp.json().await?)
    }

    pub async fn list_todos(&self, token: Option<&str>) -> Result<Vec<Todo>, AppError> {
        let req = self.http.get(self.endpoint(&["todos"]));
        let resp = check(Self::authorized(req, token).send().await?).await?;
        Ok(resp.json().await?)
    }

    pub async fn create_todo(&self, token: Option<&str>, draft: &Todo) -> Result<Todo, AppError> {
        let req = self.http.post(self.endpoint(&["todos"])).json(draft);
        let resp = check(Self::authorized(req, token).send().await?).await?;
        Ok(resp.json().await?)
    }

    pub async fn update_todo(
        &self,
        token: Option<&str>,
        id: &str,
        todo: &Todo,
    ) -> Result<Todo, AppError> {
        let req = self.http.put(self.endpoint(&["todos", id])).json(todo);
        let resp = check(Self::authorized(req, token).send().await?).await?;
        Ok(resp.json().await?)
    }

    pub async fn delete_todo(&self, token: Option<&str>, id: &str) -> Result<(), AppError> {
        let req = self.http.delete(self.endpoint(&["todos", id]));
        check(Self::authorized(req, token).send().await?).await?;
        Ok(())
    }
}

/// Maps a non-success response on a protected route to the error taxonomy.
async fn check(resp: Response) -> Result<Response, AppError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let message = error_message(resp).await;
    debug!(%status, ?message, "Request rejected");

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::Unauthorized,
        StatusCode::NOT_FOUND => AppError::NotFound,
        s if s.is_client_error() => {
            AppError::Rejected(message.unwrap_or_else(|| status.to_string()))
        }
        _ => AppError::Server(message.unwrap_or_else(|| status.to_string())),
    })
}

/// Like [`check`], but rejected credentials carry the backend's explanation.
async fn check_credentials(resp: Response, fallback: &str) -> Result<Response, AppError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let message = error_message(resp).await;
    debug!(%status, ?message, "Credentials rejected");

    if status.is_client_error() {
        Err(AppError::InvalidCredentials(
            message.unwrap_or_else(|| fallback.to_string()),
        ))
    } else {
        Err(AppError::Server(message.unwrap_or_else(|| status.to_string())))
    }
}

/// Extracts `message` or `error` from a JSON error body.
async fn error_message(resp: Response) -> Option<String> {
    let body: Value = resp.json().await.ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| body.get(*key)?.as_str())
        .filter(|msg| !msg.trim().is_empty())
        .map(str::to_string)
}
