//! Service layer
//!
//! Services contain the business logic of the webhook: dispatching accepted
//! runs to the external runner script.
//!
//! The launcher is trait-based to enable testing and dependency injection.

mod launcher;

// Re-export traits
pub use launcher::RunLauncher;

// Re-export implementations and types
pub use launcher::{ScriptLauncher, TerraformRun};
