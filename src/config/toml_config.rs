use crate::domain::model::ViewerRole;
use crate::utils::error::{DeskError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskConfig {
    pub backend: BackendConfig,
    pub auth: AuthConfig,
    pub viewer: ViewerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    /// No timeout when absent.
    pub timeout_seconds: Option<u64>,
    pub endpoints: Endpoints,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_seconds: None,
            endpoints: Endpoints::default(),
        }
    }
}

/// Backend paths, relative to `base_url`. Course ids are appended as an extra
/// path segment for update and remove.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub list_courses: String,
    pub student_courses: String,
    pub add_course: String,
    pub update_course: String,
    pub remove_course: String,
    pub enroll: String,
    pub unenroll: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            list_courses: "get_courses".to_string(),
            student_courses: "get_student_courses".to_string(),
            add_course: "add_course".to_string(),
            update_course: "update_course".to_string(),
            remove_course: "remove_course".to_string(),
            enroll: "add_course_to_user".to_string(),
            unenroll: "remove_course_from_user".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum AuthConfig {
    Static {
        token: String,
    },
    Env {
        #[serde(default = "default_env_var")]
        env_var: String,
    },
    File {
        #[serde(default = "default_store_path")]
        path: String,
        #[serde(default = "default_store_key")]
        key: String,
    },
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig::File {
            path: default_store_path(),
            key: default_store_key(),
        }
    }
}

fn default_env_var() -> String {
    "COURSE_DESK_TOKEN".to_string()
}

fn default_store_path() -> String {
    "./local_storage.json".to_string()
}

fn default_store_key() -> String {
    "accessToken".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub role: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            role: "student".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

impl DeskConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DeskError::Io)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content)
            .map_err(|e| DeskError::config(format!("TOML parsing error: {}", e)))
    }

    /// 替換環境變數 (例如 ${API_TOKEN})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| DeskError::config(format!("invalid substitution pattern: {}", e)))?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn viewer_role(&self) -> ViewerRole {
        ViewerRole::parse(&self.viewer.role)
    }
}

impl Validate for DeskConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("backend.base_url", &self.backend.base_url)?;

        if let Some(seconds) = self.backend.timeout_seconds {
            validation::validate_range("backend.timeout_seconds", seconds, 1, 3600)?;
        }

        let endpoints = &self.backend.endpoints;
        for (field, value) in [
            ("backend.endpoints.list_courses", &endpoints.list_courses),
            ("backend.endpoints.student_courses", &endpoints.student_courses),
            ("backend.endpoints.add_course", &endpoints.add_course),
            ("backend.endpoints.update_course", &endpoints.update_course),
            ("backend.endpoints.remove_course", &endpoints.remove_course),
            ("backend.endpoints.enroll", &endpoints.enroll),
            ("backend.endpoints.unenroll", &endpoints.unenroll),
        ] {
            validation::validate_non_empty_string(field, value)?;
        }

        match &self.auth {
            AuthConfig::Static { token } => {
                validation::validate_non_empty_string("auth.token", token)?
            }
            AuthConfig::Env { env_var } => {
                validation::validate_non_empty_string("auth.env_var", env_var)?
            }
            AuthConfig::File { path, key } => {
                validation::validate_path("auth.path", path)?;
                validation::validate_non_empty_string("auth.key", key)?;
            }
        }

        validation::validate_non_empty_string("viewer.role", &self.viewer.role)
    }
}
