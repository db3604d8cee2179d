//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::BlogError;
use crate::helpers::is_valid_date_format;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub language: String,
    pub timezone: String,
    pub date_format: String,

    // URL / Directory
    pub root: String,
    pub public_dir: String,

    // Content backend
    #[serde(default)]
    pub cms: CmsConfig,

    // Regeneration intervals
    #[serde(default)]
    pub revalidate: RevalidateConfig,

    #[serde(default)]
    pub reading: ReadingConfig,

    #[serde(default)]
    pub messages: MessagesConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "spacetraveling".to_string(),
            language: "pt-BR".to_string(),
            timezone: "America/Sao_Paulo".to_string(),
            date_format: "DD MMM YYYY".to_string(),

            root: "/".to_string(),
            public_dir: "public".to_string(),

            cms: CmsConfig::default(),
            revalidate: RevalidateConfig::default(),
            reading: ReadingConfig::default(),
            messages: MessagesConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the generator cannot work with
    pub fn validate(&self) -> std::result::Result<(), BlogError> {
        if self.cms.endpoint.trim().is_empty() {
            return Err(BlogError::Config("cms.endpoint must not be empty".into()));
        }
        if self.cms.page_size == 0 {
            return Err(BlogError::Config("cms.page_size must be greater than 0".into()));
        }
        if self.reading.words_per_minute == 0 {
            return Err(BlogError::Config(
                "reading.words_per_minute must be greater than 0".into(),
            ));
        }
        if !is_valid_date_format(&self.date_format) {
            return Err(BlogError::Config(format!(
                "Invalid date_format: {}",
                self.date_format
            )));
        }
        self.tz()?;
        Ok(())
    }

    /// Parsed display timezone
    pub fn tz(&self) -> std::result::Result<chrono_tz::Tz, BlogError> {
        self.timezone
            .parse::<chrono_tz::Tz>()
            .map_err(|_| BlogError::Config(format!("Unknown timezone: {}", self.timezone)))
    }
}

/// Headless CMS connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CmsConfig {
    pub endpoint: String,
    pub access_token: Option<String>,
    pub document_type: String,
    pub page_size: usize,
    /// Pinned content release; the master ref is used when unset
    #[serde(rename = "ref")]
    pub content_ref: Option<String>,
    pub timeout_secs: u64,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://spacetraveling.cdn.prismic.io/api/v2".to_string(),
            access_token: None,
            document_type: "posts".to_string(),
            page_size: 2,
            content_ref: None,
            timeout_secs: 30,
        }
    }
}

/// Seconds after which a generated page is considered stale
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RevalidateConfig {
    pub index: u64,
    pub post: u64,
}

impl Default for RevalidateConfig {
    fn default() -> Self {
        Self {
            index: 300,
            post: 180,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadingConfig {
    pub words_per_minute: usize,
}

impl Default for ReadingConfig {
    fn default() -> Self {
        Self {
            words_per_minute: crate::content::DEFAULT_WORDS_PER_MINUTE,
        }
    }
}

/// User-visible strings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagesConfig {
    pub load_more: String,
    pub loading: String,
    pub load_error: String,
    pub not_found: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            load_more: "Carregar mais posts".to_string(),
            loading: "Carregando...".to_string(),
            load_error: "Algo deu errado!".to_string(),
            not_found: "Post não encontrado".to_string(),
        }
    }
}
