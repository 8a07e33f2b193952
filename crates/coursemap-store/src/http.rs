//! HTTP implementation of ModuleStore

use std::time::Duration;

use async_trait::async_trait;
use coursemap_core::{CourseModule, CourseModuleId, EdgeEdit, ModuleEdit};
use serde::Deserialize;

use crate::{ModuleStore, StoreError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Talks to the coursemap REST API (or any compatible backend) with a bearer
/// token. Every request carries an explicit timeout.
pub struct HttpStore {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

/// Error body returned by the API on rejections.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpStore {
    /// Fails if the underlying client cannot be constructed; a client
    /// without its request timeout is never handed out.
    pub fn new(base_url: &str) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn with_token(mut self, token: String) -> Self {
        self.token = Some(token);
        self
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Map a non-success response to a typed error, reading the API's error
    /// body when one is present.
    async fn reject(
        &self,
        course_code: &str,
        response: reqwest::Response,
    ) -> StoreError {
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return StoreError::UnknownCourse(course_code.to_string());
        }
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => format!("unexpected status {status}"),
        };
        StoreError::Rejected(message)
    }
}

#[async_trait]
impl ModuleStore for HttpStore {
    async fn fetch_modules(&self, course_code: &str) -> Result<Vec<CourseModule>, StoreError> {
        let url = format!("{}/courseModule/course/{}/modules", self.base_url, course_code);
        let response = self.authorize(self.client.get(&url)).send().await?;
        if !response.status().is_success() {
            return Err(self.reject(course_code, response).await);
        }
        Ok(response.json().await?)
    }

    async fn update_module(
        &self,
        course_code: &str,
        module: &CourseModule,
    ) -> Result<CourseModule, StoreError> {
        let url = format!(
            "{}/courseModule/course/{}/module/edit/{}",
            self.base_url, course_code, module.id
        );
        let response = self
            .authorize(self.client.put(&url))
            .json(&ModuleEdit::from(module))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(self.reject(course_code, response).await);
        }
        Ok(response.json().await?)
    }

    async fn apply_edge(
        &self,
        course_code: &str,
        edit: EdgeEdit,
    ) -> Result<Vec<CourseModule>, StoreError> {
        let url = format!("{}/courseModule/course/{}/edge", self.base_url, course_code);
        let response = self
            .authorize(self.client.post(&url))
            .json(&edit)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(self.reject(course_code, response).await);
        }
        Ok(response.json().await?)
    }

    async fn delete_module(
        &self,
        course_code: &str,
        id: CourseModuleId,
    ) -> Result<(), StoreError> {
        let url = format!(
            "{}/courseModule/course/{}/module/{}",
            self.base_url, course_code, id
        );
        let response = self.authorize(self.client.delete(&url)).send().await?;
        if !response.status().is_success() {
            return Err(self.reject(course_code, response).await);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "http"
    }
}
