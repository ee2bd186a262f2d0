use crate::domain::model::Course;
use crate::domain::ports::{CourseBackend, CourseFeed, TokenProvider};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Parent-page course source backed by `GET /get_courses`.
pub struct RemoteCourseFeed<B: CourseBackend, T: TokenProvider> {
    backend: B,
    tokens: T,
    courses: Mutex<Vec<Course>>,
    loading: AtomicBool,
}

impl<B: CourseBackend, T: TokenProvider> RemoteCourseFeed<B, T> {
    pub fn new(backend: B, tokens: T) -> Self {
        Self {
            backend,
            tokens,
            courses: Mutex::new(Vec::new()),
            loading: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl<B: CourseBackend, T: TokenProvider> CourseFeed for RemoteCourseFeed<B, T> {
    fn courses(&self) -> Vec<Course> {
        self.courses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Keeps the previous list when the fetch fails.
    async fn fetch_courses(&self) {
        self.loading.store(true, Ordering::SeqCst);

        let result = match self.tokens.bearer_token() {
            Ok(token) => self.backend.list_courses(&token).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(courses) => {
                tracing::debug!("Fetched {} courses", courses.len());
                *self.courses.lock().unwrap_or_else(|e| e.into_inner()) = courses;
            }
            Err(e) => tracing::error!("Error fetching courses: {}", e),
        }

        self.loading.store(false, Ordering::SeqCst);
    }
}

/// Lets one feed be shared between the page and the course list.
#[async_trait]
impl<F: CourseFeed + ?Sized> CourseFeed for Arc<F> {
    fn courses(&self) -> Vec<Course> {
        (**self).courses()
    }

    fn is_loading(&self) -> bool {
        (**self).is_loading()
    }

    async fn fetch_courses(&self) {
        (**self).fetch_courses().await
    }
}
