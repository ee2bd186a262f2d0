use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Backend course identifier. The backend hands out either numbers or strings,
/// and the JSON form is preserved when the id is sent back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CourseId {
    Number(i64),
    Text(String),
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CourseId::Number(n) => write!(f, "{}", n),
            CourseId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for CourseId {
    fn from(value: i64) -> Self {
        CourseId::Number(value)
    }
}

impl From<&str> for CourseId {
    fn from(value: &str) -> Self {
        CourseId::Text(value.to_string())
    }
}

impl From<String> for CourseId {
    fn from(value: String) -> Self {
        CourseId::Text(value)
    }
}

impl CourseId {
    /// Parses user input: all-digit input becomes a numeric id, anything else a text id.
    pub fn parse(input: &str) -> Self {
        match input.trim().parse::<i64>() {
            Ok(n) => CourseId::Number(n),
            Err(_) => CourseId::Text(input.trim().to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
    #[default]
    Unspecified,
    Other(String),
}

impl Level {
    pub fn as_str(&self) -> &str {
        match self {
            Level::Beginner => "Beginner",
            Level::Intermediate => "Intermediate",
            Level::Advanced => "Advanced",
            Level::Unspecified => "",
            Level::Other(s) => s,
        }
    }
}

impl From<String> for Level {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Beginner" => Level::Beginner,
            "Intermediate" => Level::Intermediate,
            "Advanced" => Level::Advanced,
            "" => Level::Unspecified,
            _ => Level::Other(value),
        }
    }
}

impl From<Level> for String {
    fn from(value: Level) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A course as the backend stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    #[serde(default)]
    pub instructor: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub duration: String,
    #[serde(default)]
    pub level: Level,
}

impl Course {
    pub fn to_draft(&self) -> CourseDraft {
        CourseDraft {
            id: Some(self.id.clone()),
            name: self.name.clone(),
            instructor: self.instructor.clone(),
            start_date: self.start_date.clone(),
            duration: self.duration.clone(),
            level: self.level.clone(),
        }
    }

    /// Start date rendered as a calendar date, or the raw text when it cannot be read.
    pub fn display_start_date(&self) -> String {
        let raw = self.start_date.trim();
        if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
            return dt
                .with_timezone(&chrono::Local)
                .date_naive()
                .format("%Y-%m-%d")
                .to_string();
        }
        if let Ok(date) = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return date.format("%Y-%m-%d").to_string();
        }
        raw.to_string()
    }
}

/// Course-shaped record produced by the edit form. `id` is absent for new courses.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CourseId>,
    pub name: String,
    #[serde(default)]
    pub instructor: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub duration: String,
    #[serde(default)]
    pub level: Level,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerRole {
    Student,
    /// Any role other than "student" gets administrative actions.
    Administrative(String),
}

impl ViewerRole {
    pub fn parse(value: &str) -> Self {
        if value == "student" {
            ViewerRole::Student
        } else {
            ViewerRole::Administrative(value.to_string())
        }
    }

    pub fn is_student(&self) -> bool {
        matches!(self, ViewerRole::Student)
    }
}

impl fmt::Display for ViewerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewerRole::Student => f.write_str("student"),
            ViewerRole::Administrative(role) => f.write_str(role),
        }
    }
}

// Response schemas

/// `GET /get_student_courses`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EnrolledCourses {
    pub courses: Vec<CourseId>,
}

/// `{message}` bodies returned by the enrollment endpoints, on success and failure alike.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

/// Success body of the add/update endpoints: the stored course, or a plain acknowledgement.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SavedCourse {
    Stored(Course),
    Acknowledged(MessageBody),
}

/// Request body of the enrollment endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentRequest<'a> {
    pub course_id: &'a CourseId,
}

fn text_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
        Null,
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
        Raw::Null => String::new(),
    })
}
