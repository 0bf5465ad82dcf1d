use crate::backend::SqlGenerator;
use crate::config::AppConfig;
use crate::session::SessionStore;
use crate::web::templates::init_templates;
use minijinja::Environment;
use std::sync::Arc;

/// Shared application state for the web server
pub struct AppState {
    pub config: AppConfig,
    pub template_env: Environment<'static>,
    pub generator: Arc<dyn SqlGenerator>,
    pub sessions: SessionStore,
    pub startup_time: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(config: AppConfig, generator: Arc<dyn SqlGenerator>) -> Self {
        Self {
            config,
            template_env: init_templates(),
            generator,
            sessions: SessionStore::new(),
            startup_time: chrono::Utc::now(),
        }
    }
}
