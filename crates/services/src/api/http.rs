use async_trait::async_trait;
use log::debug;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use najah_core::model::{
    CompletedQuizRecord, CorrectionResult, QuizAssignment, QuizId, QuizQuestion, UserId,
};

use super::dto::{
    AssignmentDto, CorrectionDto, QuestionDto, ResultDto, StartQuizResponse, SubmitRequest,
};
use super::{QuizApi, SubmittedAnswer};
use crate::auth::AuthContext;
use crate::config::ApiConfig;
use crate::error::ApiError;

/// `QuizApi` over the platform's REST endpoints.
#[derive(Clone)]
pub struct HttpQuizApi {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpQuizApi {
    /// Build a client with the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Transport` if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig, auth: &AuthContext) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url().clone(),
            token: auth.token().map(str::to_string),
        })
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::Transport(format!("invalid endpoint {path}: {e}")))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response: Response = self.authorize(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::HttpStatus(status));
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl QuizApi for HttpQuizApi {
    async fn list_assignments(&self, student: UserId) -> Result<Vec<QuizAssignment>, ApiError> {
        let url = self.url(&format!("students/{student}/quiz-assignments"))?;
        debug!("GET {url}");
        let items: Vec<AssignmentDto> = self.send(self.client.get(url)).await?;
        items.into_iter().map(AssignmentDto::into_domain).collect()
    }

    async fn list_results(&self, student: UserId) -> Result<Vec<CompletedQuizRecord>, ApiError> {
        let url = self.url(&format!("students/{student}/quiz-results"))?;
        debug!("GET {url}");
        let items: Vec<ResultDto> = self.send(self.client.get(url)).await?;
        Ok(items.into_iter().map(ResultDto::into_domain).collect())
    }

    async fn start_quiz(&self, quiz: QuizId) -> Result<Vec<QuizQuestion>, ApiError> {
        let url = self.url(&format!("quizzes/{quiz}/start"))?;
        debug!("POST {url}");
        let body: StartQuizResponse = self.send(self.client.post(url)).await?;
        body.questions
            .into_iter()
            .map(QuestionDto::into_domain)
            .collect()
    }

    async fn submit_quiz(
        &self,
        quiz: QuizId,
        answers: &[SubmittedAnswer],
    ) -> Result<CorrectionResult, ApiError> {
        let url = self.url(&format!("quizzes/{quiz}/submit"))?;
        debug!("POST {url} ({} answers)", answers.len());
        let request = self.client.post(url).json(&SubmitRequest { answers });
        let body: CorrectionDto = self.send(request).await?;
        Ok(body.into_domain())
    }
}
