// File: tracker/src/web/mod.rs
pub mod handlers;
pub mod middleware;
pub mod server;

pub use server::{create_router, start_web_server};

use std::sync::Arc;

use crate::config::Config;
use crate::database::Database;
use crate::services::{TrackerDispatcher, TrackerSweepService};

// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub database: Arc<Database>,
    pub sweep_service: Arc<TrackerSweepService>,
    // Also used directly by the test-notification endpoint
    pub dispatcher: Arc<TrackerDispatcher>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        database: Arc<Database>,
        sweep_service: Arc<TrackerSweepService>,
        dispatcher: Arc<TrackerDispatcher>,
    ) -> Self {
        Self {
            config,
            database,
            sweep_service,
            dispatcher,
        }
    }
}
