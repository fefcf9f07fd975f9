// skillforge-core — shared foundation for the SkillForge workspace.
//
// Holds the pieces every other crate builds on: the error taxonomy, the
// structured logger, the configuration struct, the document-store adapter
// contract, and the typed domain models.

pub mod db;
pub mod error;
pub mod logger;
pub mod options;
pub mod utils;

// Re-exports for convenience
pub use db::adapter::Adapter;
pub use db::models::{Activity, Certificate, Course, Enrollment, Lesson, Video};
pub use error::{ApiError, ErrorKind, HttpStatus, SkillForgeError};
pub use logger::{AppLogger, LogHandler, LogLevel, LoggerConfig};
pub use options::SkillForgeOptions;
pub use utils::id::generate_id;
