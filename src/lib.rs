pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::DeskConfig;

pub use adapters::{FileTokenStore, HttpBackend};
pub use crate::core::{
    catalog::RemoteCourseFeed, course_list::CourseListView, edit_form::EditForm,
    reconcile::Snapshot,
};
pub use utils::error::{DeskError, Result};
