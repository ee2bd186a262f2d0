use crate::domain::model::{Course, CourseId, ViewerRole};
use std::collections::HashSet;

pub type EnrollmentSet = HashSet<CourseId>;

/// Courses the viewer is not enrolled in, in course-list order.
pub fn available_courses<'a>(courses: &'a [Course], enrolled: &EnrollmentSet) -> Vec<&'a Course> {
    courses
        .iter()
        .filter(|course| !enrolled.contains(&course.id))
        .collect()
}

/// Courses the viewer is enrolled in, in course-list order. Enrolled ids
/// without a matching course are skipped.
pub fn registered_courses<'a>(courses: &'a [Course], enrolled: &EnrollmentSet) -> Vec<&'a Course> {
    courses
        .iter()
        .filter(|course| enrolled.contains(&course.id))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowCategory {
    Advanced,
    Intermediate,
    Beginner,
    Default,
}

impl RowCategory {
    pub fn class_name(&self) -> &'static str {
        match self {
            RowCategory::Advanced => "advanced-level",
            RowCategory::Intermediate => "intermediate-level",
            RowCategory::Beginner => "beginner-level",
            RowCategory::Default => "",
        }
    }
}

pub fn classify_row(level: &str) -> RowCategory {
    match level {
        "Advanced" => RowCategory::Advanced,
        "Intermediate" => RowCategory::Intermediate,
        "Beginner" => RowCategory::Beginner,
        _ => RowCategory::Default,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowAction {
    Enroll,
    Unenroll,
    Edit,
    Remove,
}

impl RowAction {
    pub fn label(&self) -> &'static str {
        match self {
            RowAction::Enroll => "Add",
            RowAction::Unenroll | RowAction::Remove => "Remove",
            RowAction::Edit => "Edit",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CourseRow {
    pub course: Course,
    pub category: RowCategory,
    pub actions: Vec<RowAction>,
}

impl CourseRow {
    fn new(course: &Course, actions: Vec<RowAction>) -> Self {
        Self {
            course: course.clone(),
            category: classify_row(course.level.as_str()),
            actions,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    Loading,
    Ready {
        /// Present only for students with at least one enrollment.
        registered: Option<Vec<CourseRow>>,
        /// Empty means "No Available Courses".
        available: Vec<CourseRow>,
    },
}

pub fn build_snapshot(
    courses: &[Course],
    enrolled: &EnrollmentSet,
    role: &ViewerRole,
    loading: bool,
) -> Snapshot {
    if loading {
        return Snapshot::Loading;
    }

    let registered = if role.is_student() && !enrolled.is_empty() {
        Some(
            registered_courses(courses, enrolled)
                .into_iter()
                .map(|course| CourseRow::new(course, vec![RowAction::Unenroll]))
                .collect(),
        )
    } else {
        None
    };

    let row_actions = if role.is_student() {
        vec![RowAction::Enroll]
    } else {
        vec![RowAction::Edit, RowAction::Remove]
    };

    let available = available_courses(courses, enrolled)
        .into_iter()
        .map(|course| CourseRow::new(course, row_actions.clone()))
        .collect();

    Snapshot::Ready {
        registered,
        available,
    }
}
