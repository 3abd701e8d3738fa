pub mod health_check; // Public for OpenAPI annotations
pub mod race_test; // Public for OpenAPI annotations

pub use health_check::*;
pub use race_test::*;
