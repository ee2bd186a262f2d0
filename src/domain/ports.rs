use crate::domain::model::{
    Course, CourseDraft, CourseId, EnrolledCourses, MessageBody, SavedCourse,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Source of the bearer credential attached to every backend request.
pub trait TokenProvider: Send + Sync {
    fn bearer_token(&self) -> Result<String>;
}

/// The backend REST surface the course views consume.
#[async_trait]
pub trait CourseBackend: Send + Sync {
    async fn list_courses(&self, token: &str) -> Result<Vec<Course>>;
    async fn list_enrolled(&self, token: &str) -> Result<EnrolledCourses>;
    async fn create_course(&self, token: &str, draft: &CourseDraft) -> Result<SavedCourse>;
    async fn update_course(
        &self,
        token: &str,
        id: &CourseId,
        draft: &CourseDraft,
    ) -> Result<SavedCourse>;
    async fn remove_course(&self, token: &str, id: &CourseId) -> Result<()>;
    async fn enroll(&self, token: &str, id: &CourseId) -> Result<MessageBody>;
    async fn unenroll(&self, token: &str, id: &CourseId) -> Result<MessageBody>;
}

/// What the parent page hands to the course list: the fetched courses, a
/// loading flag and a way to refetch.
#[async_trait]
pub trait CourseFeed: Send + Sync {
    fn courses(&self) -> Vec<Course>;
    fn is_loading(&self) -> bool;
    async fn fetch_courses(&self);
}
