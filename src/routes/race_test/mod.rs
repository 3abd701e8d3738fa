mod api;
mod page;

pub use api::*;
pub use page::race_test_page;

/// Base path of every race-test route
pub const RACE_TEST_PATH: &str = "/debug/realex-race-test";
