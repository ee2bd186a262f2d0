use crate::config::{BackendConfig, Endpoints};
use crate::domain::model::{
    Course, CourseDraft, CourseId, EnrolledCourses, EnrollmentRequest, MessageBody, SavedCourse,
};
use crate::domain::ports::CourseBackend;
use crate::utils::error::{DeskError, ParseError, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// [`CourseBackend`] over the backend's REST API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
    endpoints: Endpoints,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }

        let base_url = Url::parse(&config.base_url).map_err(|e| {
            DeskError::InvalidConfigValueError {
                field: "backend.base_url".to_string(),
                value: config.base_url.clone(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            client: builder.build()?,
            base_url,
            endpoints: config.endpoints.clone(),
        })
    }

    fn url(&self, path: &str, id: Option<&CourseId>) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| DeskError::config(format!("{} cannot be a base URL", self.base_url)))?;
            segments.pop_if_empty();
            segments.extend(path.split('/').filter(|s| !s.is_empty()));
            if let Some(id) = id {
                segments.push(&id.to_string());
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, token: &str) -> RequestBuilder {
        tracing::debug!("{} {}", method, url);
        self.client.request(method, url).bearer_auth(token)
    }

    async fn send(&self, request: RequestBuilder) -> Result<(StatusCode, String)> {
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("Backend response status: {}", status);
        let body = response.text().await?;
        Ok((status, body))
    }

    /// Sends the request and fails on any non-success status, ignoring the body.
    async fn send_expecting_success(&self, request: RequestBuilder) -> Result<String> {
        let (status, body) = self.send(request).await?;
        if !status.is_success() {
            return Err(DeskError::Status {
                status: status.as_u16(),
                message: None,
            });
        }
        Ok(body)
    }

    async fn change_enrollment(&self, path: &str, token: &str, id: &CourseId) -> Result<MessageBody> {
        let url = self.url(path, None)?;
        let request = self
            .request(Method::POST, url, token)
            .json(&EnrollmentRequest { course_id: id });

        let (status, body) = self.send(request).await?;
        if !status.is_success() {
            let message = serde_json::from_str::<MessageBody>(&body)
                .ok()
                .map(|b| b.message);
            return Err(DeskError::Status {
                status: status.as_u16(),
                message,
            });
        }
        parse_body(path, &body)
    }
}

fn parse_body<T: DeserializeOwned>(endpoint: &str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| ParseError::new(endpoint, e.to_string()).into())
}

#[async_trait]
impl CourseBackend for HttpBackend {
    async fn list_courses(&self, token: &str) -> Result<Vec<Course>> {
        let path = &self.endpoints.list_courses;
        let request = self.request(Method::GET, self.url(path, None)?, token);
        let body = self.send_expecting_success(request).await?;
        parse_body(path, &body)
    }

    async fn list_enrolled(&self, token: &str) -> Result<EnrolledCourses> {
        let path = &self.endpoints.student_courses;
        let request = self.request(Method::GET, self.url(path, None)?, token);
        let body = self.send_expecting_success(request).await?;
        parse_body(path, &body)
    }

    async fn create_course(&self, token: &str, draft: &CourseDraft) -> Result<SavedCourse> {
        let path = &self.endpoints.add_course;
        let request = self
            .request(Method::POST, self.url(path, None)?, token)
            .json(draft);
        let body = self.send_expecting_success(request).await?;
        parse_body(path, &body)
    }

    async fn update_course(
        &self,
        token: &str,
        id: &CourseId,
        draft: &CourseDraft,
    ) -> Result<SavedCourse> {
        let path = &self.endpoints.update_course;
        let request = self
            .request(Method::PUT, self.url(path, Some(id))?, token)
            .json(draft);
        let body = self.send_expecting_success(request).await?;
        parse_body(path, &body)
    }

    async fn remove_course(&self, token: &str, id: &CourseId) -> Result<()> {
        let path = &self.endpoints.remove_course;
        let request = self.request(Method::DELETE, self.url(path, Some(id))?, token);
        self.send_expecting_success(request).await?;
        Ok(())
    }

    async fn enroll(&self, token: &str, id: &CourseId) -> Result<MessageBody> {
        self.change_enrollment(&self.endpoints.enroll, token, id).await
    }

    async fn unenroll(&self, token: &str, id: &CourseId) -> Result<MessageBody> {
        self.change_enrollment(&self.endpoints.unenroll, token, id).await
    }
}
