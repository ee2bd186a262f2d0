use crate::domain::model::{Course, CourseDraft};

/// Edit form visibility and the course it was opened for.
/// `Open { course: None }` means the form is creating a new course.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EditForm {
    #[default]
    Closed,
    Open { course: Option<Course> },
}

impl EditForm {
    /// Opens the form for `course` when closed, closes it when open.
    pub fn toggle(&mut self, course: Option<Course>) {
        *self = match self {
            EditForm::Closed => EditForm::Open { course },
            EditForm::Open { .. } => EditForm::Closed,
        };
    }

    pub fn close(&mut self) {
        *self = EditForm::Closed;
    }

    pub fn is_open(&self) -> bool {
        matches!(self, EditForm::Open { .. })
    }

    pub fn selection(&self) -> Option<&Course> {
        match self {
            EditForm::Open { course } => course.as_ref(),
            EditForm::Closed => None,
        }
    }

    /// Initial field values for the form: the selected course, or a blank draft.
    pub fn draft(&self) -> Option<CourseDraft> {
        match self {
            EditForm::Open { course: Some(c) } => Some(c.to_draft()),
            EditForm::Open { course: None } => Some(CourseDraft::default()),
            EditForm::Closed => None,
        }
    }
}
