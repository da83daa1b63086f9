use color_eyre::eyre::Context;
use db::setup_db_pool;
use openai::OpenAiConfig;
use sqlx::PgPool;
use tracing::instrument;
use url::Url;

use crate::{barcode::OpenFoodFactsConfig, mailer::MailerConfig};

const DEFAULT_BASE_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub base_url: Url,
    /// `*` allows any origin.
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    #[instrument(name = "AppConfig::from_env")]
    pub fn from_env() -> color_eyre::Result<Self> {
        let base_url =
            std::env::var("APP_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(&base_url).wrap_err("Invalid APP_BASE_URL not parsable")?;

        let cors_origins = std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());

        Ok(Self {
            base_url,
            cors_origins: parse_origins(&cors_origins),
        })
    }

    pub fn app_url(&self, path: &str) -> String {
        let mut url = self.base_url.clone();

        url.set_path(path);

        url.into()
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Bearer token guarding the admin routes. Without one every admin request is refused.
#[derive(Clone, Default)]
pub struct AdminConfig {
    pub token: Option<String>,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl AdminConfig {
    #[instrument(name = "AdminConfig::from_env")]
    pub fn from_env() -> Self {
        let token = std::env::var("ADMIN_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());

        if token.is_none() {
            tracing::warn!("ADMIN_TOKEN is not set, admin routes will reject every request");
        }

        Self { token }
    }
}

#[derive(Debug, Clone)]
pub struct VersionInfo {
    pub name: &'static str,
    pub version: &'static str,
}

impl VersionInfo {
    pub fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct AppState {
    pub db: PgPool,
    pub app: AppConfig,
    pub admin: AdminConfig,
    pub open_ai: Option<OpenAiConfig>,
    pub mailer: Option<MailerConfig>,
    pub open_food_facts: OpenFoodFactsConfig,
    pub http: reqwest::Client,
    pub versions: VersionInfo,
}

impl AppState {
    #[instrument(name = "AppState::from_env", err)]
    pub async fn from_env() -> color_eyre::Result<Self> {
        let open_ai = match OpenAiConfig::from_env() {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(error = %e, "OpenAI is not configured, AI suggestions will use fallbacks");
                None
            }
        };

        let app_state = AppState {
            db: setup_db_pool().await?,
            app: AppConfig::from_env()?,
            admin: AdminConfig::from_env(),
            open_ai,
            mailer: MailerConfig::from_env(),
            open_food_facts: OpenFoodFactsConfig::from_env(),
            http: reqwest::Client::new(),
            versions: VersionInfo::current(),
        };

        Ok(app_state)
    }

    pub fn db(&self) -> &PgPool {
        &self.db
    }
}
