use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::ContentType,
    error::StatusEnvelope,
    protocol::{
        CheckAnswerRequest, CheckAnswerResponse, CheckStepRequest, CheckStepResponse,
        ContentListResponse, QuizSummary, ReorderRequest, SubmitResultRequest,
        SubmitResultResponse, ValidateSessionRequest, ValidateSessionResponse,
    },
};
use tracing::debug;
use url::Url;

use crate::error::{ClientError, Result};

/// Every server round-trip the page controllers make.
///
/// Admin mutations answer with a [`StatusEnvelope`]; learner endpoints answer with
/// their own bodies and treat a non-2xx status as a transport failure.
#[async_trait]
pub trait CourseApi: Send + Sync {
    async fn reorder(&self, endpoint: &str, request: &ReorderRequest) -> Result<StatusEnvelope>;
    async fn post_action(&self, path: &str, body: &serde_json::Value) -> Result<StatusEnvelope>;
    async fn list_content(&self, content_type: ContentType) -> Result<ContentListResponse>;
    async fn list_quizzes(&self) -> Result<Vec<QuizSummary>>;
    async fn check_answer(&self, request: &CheckAnswerRequest) -> Result<CheckAnswerResponse>;
    async fn submit_result(&self, request: &SubmitResultRequest) -> Result<SubmitResultResponse>;
    async fn validate_session(
        &self,
        request: &ValidateSessionRequest,
    ) -> Result<ValidateSessionResponse>;
    async fn check_step(&self, request: &CheckStepRequest) -> Result<CheckStepResponse>;
}

pub struct HttpCourseApi {
    http: Client,
    base_url: Url,
}

impl HttpCourseApi {
    pub fn new(server_url: &str) -> Result<Self> {
        Self::with_client(server_url, Client::new())
    }

    pub fn with_timeout(server_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Self::with_client(server_url, http)
    }

    pub fn with_client(server_url: &str, http: Client) -> Result<Self> {
        let trimmed = server_url.trim();
        let mut base_url = Url::parse(trimmed)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    async fn post_envelope<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<StatusEnvelope> {
        let url = self.endpoint(path)?;
        debug!("api: POST {url}");
        let response = self.http.post(url).json(body).send().await?;
        read_lenient(response).await
    }

    async fn post_strict<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        debug!("api: POST {url}");
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

/// Decodes a JSON body even on error statuses so the server's own message survives;
/// only an undecodable non-2xx body becomes [`ClientError::Http`].
async fn read_lenient<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let bytes = response.bytes().await?;
    match serde_json::from_slice::<T>(&bytes) {
        Ok(body) => Ok(body),
        Err(_) if !status.is_success() => Err(ClientError::Http {
            status: status.as_u16(),
        }),
        Err(err) => Err(ClientError::Decode(err)),
    }
}

#[async_trait]
impl CourseApi for HttpCourseApi {
    async fn reorder(&self, endpoint: &str, request: &ReorderRequest) -> Result<StatusEnvelope> {
        self.post_envelope(endpoint, request).await
    }

    async fn post_action(&self, path: &str, body: &serde_json::Value) -> Result<StatusEnvelope> {
        self.post_envelope(path, body).await
    }

    async fn list_content(&self, content_type: ContentType) -> Result<ContentListResponse> {
        let url = self.endpoint(&format!("admin/content/list/{content_type}"))?;
        debug!("api: GET {url}");
        let response = self.http.get(url).send().await?;
        read_lenient(response).await
    }

    async fn list_quizzes(&self) -> Result<Vec<QuizSummary>> {
        let url = self.endpoint("api/quizzes")?;
        debug!("api: GET {url}");
        let response = self.http.get(url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }

    async fn check_answer(&self, request: &CheckAnswerRequest) -> Result<CheckAnswerResponse> {
        self.post_strict("api/quiz/check_answer", request).await
    }

    async fn submit_result(&self, request: &SubmitResultRequest) -> Result<SubmitResultResponse> {
        self.post_strict("api/quiz/submit_result", request).await
    }

    async fn validate_session(
        &self,
        request: &ValidateSessionRequest,
    ) -> Result<ValidateSessionResponse> {
        self.post_strict("api/session/validate", request).await
    }

    async fn check_step(&self, request: &CheckStepRequest) -> Result<CheckStepResponse> {
        self.post_strict("api/lab/check_step", request).await
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
