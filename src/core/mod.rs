pub mod catalog;
pub mod course_list;
pub mod edit_form;
pub mod in_flight;
pub mod reconcile;

pub use crate::domain::model::{Course, CourseDraft, CourseId, Level, SavedCourse, ViewerRole};
pub use crate::domain::ports::{CourseBackend, CourseFeed, TokenProvider};
pub use crate::utils::error::Result;
