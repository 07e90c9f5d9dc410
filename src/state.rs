use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::rate_limit::AttemptLimiter;
use crate::reports::AccessStore;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub access_store: Arc<dyn AccessStore>,
    pub login_limiter: AttemptLimiter,
}
