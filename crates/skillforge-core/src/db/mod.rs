pub mod adapter;
pub mod models;

pub use adapter::Adapter;
pub use models::{Activity, Certificate, Course, Enrollment, Lesson, Video};
