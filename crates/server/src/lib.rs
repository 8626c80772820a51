use std::sync::Arc;

use db::DBService;
use services::services::config::Config;

pub mod error;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    db: DBService,
    config: Arc<Config>,
}

impl AppState {
    pub fn new(db: DBService, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
