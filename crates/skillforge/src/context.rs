// Application context — the fully-initialized service configuration.
//
// Built once at startup from options plus a storage adapter, then shared
// across request handlers as `Arc<AppContext>`. Collaborators are injected
// here explicitly; there is no process-wide registry.

use std::sync::Arc;

use skillforge_core::db::adapter::Adapter;
use skillforge_core::logger::AppLogger;
use skillforge_core::options::SkillForgeOptions;

use crate::store::Store;

/// Shared application context.
pub struct AppContext {
    /// The original configuration options.
    pub options: SkillForgeOptions,

    /// Application name for branding (default: "SkillForge").
    pub app_name: String,

    /// Typed store over the injected adapter.
    pub store: Store,

    /// Structured application logger.
    pub logger: AppLogger,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("app_name", &self.app_name)
            .field("base_path", &self.options.base_path)
            .field("logger", &self.logger)
            .finish()
    }
}

impl AppContext {
    /// Create a new context from options and a storage adapter.
    pub fn new(options: SkillForgeOptions, adapter: Arc<dyn Adapter>) -> Arc<Self> {
        let app_name = options
            .app_name
            .clone()
            .unwrap_or_else(|| "SkillForge".to_string());

        Arc::new(Self {
            options,
            app_name,
            store: Store::new(adapter),
            logger: AppLogger::default(),
        })
    }

    /// Create a context with a custom logger.
    pub fn with_logger(
        options: SkillForgeOptions,
        adapter: Arc<dyn Adapter>,
        logger: AppLogger,
    ) -> Arc<Self> {
        let app_name = options
            .app_name
            .clone()
            .unwrap_or_else(|| "SkillForge".to_string());

        Arc::new(Self {
            options,
            app_name,
            store: Store::new(adapter),
            logger,
        })
    }
}
