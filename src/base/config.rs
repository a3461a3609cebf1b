//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use serde::Deserialize;

use super::types::Res;

/// Default Vertex AI region.
fn default_vertex_location() -> String {
    "us-central1".to_string()
}

/// Default Gemini model to use.
fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}

/// Default max output tokens for the Gemini model.
fn default_gemini_max_tokens() -> u32 {
    2000
}

/// Default sampling temperature for the Gemini model.
fn default_gemini_temperature() -> f32 {
    0.6
}

/// Default GCE metadata endpoint for service account tokens.
fn default_metadata_token_url() -> String {
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token".to_string()
}

/// Default blog pages used as reference context.
fn default_blog_urls() -> Vec<String> {
    vec![
        "https://abdyasam.blogspot.com/".to_string(),
        "https://abdyasam.blogspot.com/search?max-results=20".to_string(),
    ]
}

fn default_blog_timeout_secs() -> u64 {
    8
}

fn default_blog_refresh_secs() -> u64 {
    3600
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_feedback_capacity() -> usize {
    500
}

fn default_max_field_length() -> usize {
    2000
}

/// Configuration for the usa-guide application.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConfigInner {
    /// Google Cloud project id (`GOOGLE_CLOUD_PROJECT`).
    pub google_cloud_project: Option<String>,
    /// Fallback project id, consulted when `GOOGLE_CLOUD_PROJECT` is unset (`GCP_PROJECT`).
    pub gcp_project: Option<String>,
    /// Vertex AI region (`VERTEX_LOCATION`).
    #[serde(default = "default_vertex_location")]
    pub vertex_location: String,
    /// Gemini model name (`GEMINI_MODEL`).
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,
    /// Max output tokens for the model (`GEMINI_MAX_TOKENS`).
    #[serde(default = "default_gemini_max_tokens")]
    pub gemini_max_tokens: u32,
    /// Sampling temperature for the model (`GEMINI_TEMPERATURE`).
    /// Value between 0 and 2.
    #[serde(default = "default_gemini_temperature")]
    pub gemini_temperature: f32,
    /// Override for the Vertex AI base URL (`VERTEX_BASE_URL`).
    pub vertex_base_url: Option<String>,
    /// Static OAuth access token; skips the metadata server when set (`GOOGLE_OAUTH_ACCESS_TOKEN`).
    pub google_oauth_access_token: Option<String>,
    /// Metadata server token endpoint (`METADATA_TOKEN_URL`).
    #[serde(default = "default_metadata_token_url")]
    pub metadata_token_url: String,
    /// Blog pages to pull reference context from (`BLOG_URLS`, comma separated).
    #[serde(default = "default_blog_urls")]
    pub blog_urls: Vec<String>,
    /// Per-request timeout for blog fetches (`BLOG_TIMEOUT_SECS`).
    #[serde(default = "default_blog_timeout_secs")]
    pub blog_timeout_secs: u64,
    /// Background refresh interval for blog content; `0` fetches on every request (`BLOG_REFRESH_SECS`).
    #[serde(default = "default_blog_refresh_secs")]
    pub blog_refresh_secs: u64,
    /// Bind host (`HOST`).
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port (`PORT`).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory for rolling log files (`LOG_DIR`).
    pub log_dir: Option<String>,
    /// Number of feedback entries retained (`FEEDBACK_CAPACITY`).
    #[serde(default = "default_feedback_capacity")]
    pub feedback_capacity: usize,
    /// Maximum length of any string field in a request body (`MAX_FIELD_LENGTH`).
    #[serde(default = "default_max_field_length")]
    pub max_field_length: usize,
}

impl Default for ConfigInner {
    fn default() -> Self {
        Self {
            google_cloud_project: None,
            gcp_project: None,
            vertex_location: default_vertex_location(),
            gemini_model: default_gemini_model(),
            gemini_max_tokens: default_gemini_max_tokens(),
            gemini_temperature: default_gemini_temperature(),
            vertex_base_url: None,
            google_oauth_access_token: None,
            metadata_token_url: default_metadata_token_url(),
            blog_urls: default_blog_urls(),
            blog_timeout_secs: default_blog_timeout_secs(),
            blog_refresh_secs: default_blog_refresh_secs(),
            host: default_host(),
            port: default_port(),
            log_dir: None,
            feedback_capacity: default_feedback_capacity(),
            max_field_length: default_max_field_length(),
        }
    }
}

impl ConfigInner {
    /// The effective project id: `GOOGLE_CLOUD_PROJECT`, then `GCP_PROJECT`.
    pub fn project(&self) -> Option<&str> {
        [&self.google_cloud_project, &self.gcp_project]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .map(str::trim)
            .find(|p| !p.is_empty())
    }

    /// The Vertex AI base URL, derived from the location unless overridden.
    pub fn vertex_base_url(&self) -> String {
        match &self.vertex_base_url {
            Some(url) if !url.trim().is_empty() => url.trim_end_matches('/').to_string(),
            _ => format!("https://{}-aiplatform.googleapis.com", self.vertex_location),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Unprefixed environment source; `BLOG_URLS` is split on commas.
fn environment() -> config::Environment {
    config::Environment::default()
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("blog_urls")
}

impl Config {
    /// Load from an optional TOML file, overridden by environment variables.
    ///
    /// Environment variables are read without a prefix, so `GOOGLE_CLOUD_PROJECT`,
    /// `VERTEX_LOCATION`, `PORT` and friends map directly onto fields.
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        Self::load_with_env(explicit_path, environment())
    }

    fn load_with_env(explicit_path: Option<&std::path::Path>, env: config::Environment) -> Res<Self> {
        let mut cfg = config::Config::builder();

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        Self::from_settings(cfg.add_source(env).build()?)
    }

    /// Deserialize and validate already-built settings.
    pub fn from_settings(settings: config::Config) -> Res<Self> {
        let result = Config {
            inner: Arc::new(settings.try_deserialize()?),
        };

        if result.gemini_temperature < 0.0 || result.gemini_temperature > 2.0 {
            return Err(anyhow::anyhow!("Gemini temperature must be between 0 and 2."));
        }

        if result.gemini_max_tokens < 1 || result.gemini_max_tokens > 8192 {
            return Err(anyhow::anyhow!("Gemini max tokens must be between 1 and 8192."));
        }

        if result.feedback_capacity < 1 {
            return Err(anyhow::anyhow!("Feedback capacity must be at least 1."));
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(overrides: &[(&str, &str)]) -> config::Config {
        let mut builder = config::Config::builder();

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value).unwrap();
        }

        builder.build().unwrap()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_settings(settings(&[])).unwrap();

        assert_eq!(config.vertex_location, "us-central1");
        assert_eq!(config.gemini_model, "gemini-1.5-flash");
        assert_eq!(config.port, 5000);
        assert_eq!(config.feedback_capacity, 500);
        assert_eq!(config.blog_urls.len(), 2);
        assert!(config.project().is_none());
    }

    #[test]
    fn project_falls_back_to_gcp_project() {
        let config = Config::from_settings(settings(&[("gcp_project", "fallback-proj")])).unwrap();
        assert_eq!(config.project(), Some("fallback-proj"));

        let config = Config::from_settings(settings(&[("google_cloud_project", "main-proj"), ("gcp_project", "fallback-proj")])).unwrap();
        assert_eq!(config.project(), Some("main-proj"));

        let config = Config::from_settings(settings(&[("google_cloud_project", "  "), ("gcp_project", "fallback-proj")])).unwrap();
        assert_eq!(config.project(), Some("fallback-proj"));
    }

    #[test]
    fn vertex_base_url_is_derived_from_location() {
        let config = Config::from_settings(settings(&[("vertex_location", "europe-west4")])).unwrap();
        assert_eq!(config.vertex_base_url(), "https://europe-west4-aiplatform.googleapis.com");

        let config = Config::from_settings(settings(&[("vertex_base_url", "http://127.0.0.1:9000/")])).unwrap();
        assert_eq!(config.vertex_base_url(), "http://127.0.0.1:9000");
    }

    #[test]
    fn out_of_range_temperature_is_rejected() {
        let result = Config::from_settings(settings(&[("gemini_temperature", "2.5")]));
        assert!(result.is_err());
    }

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let map = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect::<config::Map<_, _>>();

        environment().source(Some(map))
    }

    #[test]
    fn load_reads_unprefixed_environment() {
        let config = Config::load_with_env(
            None,
            env(&[
                ("GOOGLE_CLOUD_PROJECT", "123456789"),
                ("BLOG_URLS", "https://a.example/,https://b.example/"),
                ("PORT", "8080"),
                ("GEMINI_TEMPERATURE", "1"),
            ]),
        )
        .unwrap();

        assert_eq!(config.project(), Some("123456789"));
        assert_eq!(config.blog_urls, vec!["https://a.example/", "https://b.example/"]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.gemini_temperature, 1.0);
    }

    #[test]
    fn load_layers_environment_over_toml_file() {
        let path = std::env::temp_dir().join(format!("usa-guide-config-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            r#"
vertex_location = "europe-west4"
port = 7000
blog_urls = ["https://file.example/"]
"#,
        )
        .unwrap();

        let config = Config::load_with_env(Some(&path), env(&[("PORT", "9000")]));
        std::fs::remove_file(&path).unwrap();
        let config = config.unwrap();

        assert_eq!(config.vertex_location, "europe-west4");
        assert_eq!(config.port, 9000);
        assert_eq!(config.blog_urls, vec!["https://file.example/"]);
    }

    #[test]
    fn load_rejects_invalid_environment_values() {
        assert!(Config::load_with_env(None, env(&[("GEMINI_MAX_TOKENS", "0")])).is_err());
    }

    #[test]
    fn bind_addr_formats_correctly() {
        let config = Config::from_settings(settings(&[("host", "127.0.0.1"), ("port", "8080")])).unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
    }
}
