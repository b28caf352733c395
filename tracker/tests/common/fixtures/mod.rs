//! This module provides reusable test utilities:
//! - Mock provider servers (email, push)
//! - Test configuration builders
//! - In-memory test databases with seed helpers
//! - Common test data
//! - A fully wired application for handler tests

// Allow unused code in test fixtures - not every test binary uses every helper
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod mock_providers;
pub mod test_app;
pub mod test_config;
pub mod test_data;
pub mod test_database;

// Re-export commonly used items
pub use mock_providers::{MockEmailServer, MockPushServer};
pub use test_app::TestApp;
pub use test_config::TestConfigBuilder;
pub use test_data::*;
pub use test_database::TestDatabase;
