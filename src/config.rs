use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::url::DEFAULT_BASE_URL;

/// Interview category served by the agent backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewScope {
    Project,
    Process,
    ChangeRequest,
}

impl InterviewScope {
    pub fn parse(value: &str) -> Option<Self> {
        Some(match value.trim().to_ascii_lowercase().as_str() {
            "project" => Self::Project,
            "process" => Self::Process,
            "change_request" | "change-request" => Self::ChangeRequest,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Process => "process",
            Self::ChangeRequest => "change_request",
        }
    }
}

/// Transport configuration for interview agent requests.
#[derive(Debug, Clone)]
pub struct InterviewApiConfig {
    /// Base URL for the agent service.
    pub base_url: String,
    /// Interview scope this client talks to.
    pub scope: InterviewScope,
    /// Optional `Accept-Language` preference, also forwarded to the
    /// test-agent simulation request when the caller leaves it unset.
    pub language: Option<String>,
    /// Optional `User-Agent` override.
    pub user_agent: Option<String>,
    /// Additional headers merged into request headers.
    pub extra_headers: BTreeMap<String, String>,
    /// Optional request timeout. Leave unset for streaming-friendly reads.
    pub timeout: Option<Duration>,
}

impl Default for InterviewApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            scope: InterviewScope::Project,
            language: None,
            user_agent: None,
            extra_headers: BTreeMap::new(),
            timeout: None,
        }
    }
}

impl InterviewApiConfig {
    pub fn new(scope: InterviewScope) -> Self {
        Self {
            scope,
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn insert_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(key.into(), value.into());
        self
    }

    pub fn with_headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.extra_headers.extend(headers);
        self
    }
}
