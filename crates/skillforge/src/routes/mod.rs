// Route handler modules, one per resource.
//
// Handlers are framework-agnostic: they take `Arc<AppContext>` plus the
// typed request (and the Actor where the operation is authenticated) and
// return `Result<response, ApiError>`. The web layer does the HTTP mapping.

pub mod activities;
pub mod certificates;
pub mod courses;
pub mod enrollments;
pub mod lessons;
pub mod videos;
