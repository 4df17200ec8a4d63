use std::sync::Arc;

use configs::AppConfig;
use service::Services;

use crate::auth::AuthSettings;

/// Page size bounds taken from `[pagination]`.
#[derive(Clone, Copy, Debug)]
pub struct PageLimits {
    pub default_per_page: u32,
    pub max_per_page: u32,
}

impl Default for PageLimits {
    fn default() -> Self { Self { default_per_page: 20, max_per_page: 100 } }
}

#[derive(Clone)]
pub struct AppState {
    pub services: Arc<Services>,
    pub auth: AuthSettings,
    pub pagination: PageLimits,
}

impl AppState {
    pub fn new(services: Arc<Services>, cfg: &AppConfig) -> Self {
        Self {
            services,
            auth: AuthSettings::new(&cfg.auth.jwt_secret, cfg.auth.elevated_roles.clone()),
            pagination: PageLimits {
                default_per_page: cfg.pagination.default_per_page,
                max_per_page: cfg.pagination.max_per_page,
            },
        }
    }
}
