use crate::config::{AuthConfig, DeskConfig};
use crate::domain::model::{CourseDraft, Level};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "course-desk")]
#[command(about = "Browse courses, manage enrollments and edit the course catalogue")]
pub struct CliConfig {
    #[arg(long, short, default_value = "course-desk.toml")]
    pub config: PathBuf,

    #[arg(long, help = "Override backend.base_url")]
    pub base_url: Option<String>,

    #[arg(long, help = "Override viewer.role (\"student\" or any administrative role)")]
    pub role: Option<String>,

    #[arg(long, help = "Use this bearer token instead of the configured source")]
    pub token: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show registered and available courses
    List,
    /// Enroll in a course
    Enroll { id: String },
    /// Drop a course
    Unenroll { id: String },
    /// Create a course
    Create(CourseFields),
    /// Change a course's fields; omitted flags keep their current values
    Update {
        id: String,
        #[command(flatten)]
        fields: CourseFields,
    },
    /// Delete a course
    Remove { id: String },
    /// Save a token into the file token store
    SetToken { token: String },
}

#[derive(Debug, Clone, Default, Args)]
pub struct CourseFields {
    #[arg(long, help = "Required when creating a course")]
    pub name: Option<String>,
    #[arg(long)]
    pub instructor: Option<String>,
    #[arg(long)]
    pub start_date: Option<String>,
    #[arg(long)]
    pub duration: Option<String>,
    #[arg(long, help = "Beginner, Intermediate, Advanced or free text")]
    pub level: Option<String>,
}

impl CourseFields {
    /// Writes the given flags over `draft`. Omitted flags leave its values alone.
    pub fn apply_to(self, mut draft: CourseDraft) -> CourseDraft {
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(instructor) = self.instructor {
            draft.instructor = instructor;
        }
        if let Some(start_date) = self.start_date {
            draft.start_date = start_date;
        }
        if let Some(duration) = self.duration {
            draft.duration = duration;
        }
        if let Some(level) = self.level {
            draft.level = Level::from(level);
        }
        draft
    }

    /// Draft for a new course, or `None` when `--name` is missing.
    pub fn into_new_draft(self) -> Option<CourseDraft> {
        if self.name.is_none() {
            return None;
        }
        Some(self.apply_to(CourseDraft::default()))
    }
}

impl CliConfig {
    /// Command-line flags win over the file.
    pub fn apply_overrides(&self, config: &mut DeskConfig) {
        if let Some(base_url) = &self.base_url {
            config.backend.base_url = base_url.clone();
        }
        if let Some(role) = &self.role {
            config.viewer.role = role.clone();
        }
        if let Some(token) = &self.token {
            config.auth = AuthConfig::Static {
                token: token.clone(),
            };
        }
    }

    /// Reads the config file when it exists, built-in defaults otherwise.
    pub fn load_config(&self) -> crate::Result<DeskConfig> {
        let mut config = if self.config.exists() {
            DeskConfig::from_file(&self.config)?
        } else {
            DeskConfig::default()
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }
}
