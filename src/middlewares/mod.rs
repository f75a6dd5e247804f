pub mod auth;
pub mod cors;
pub mod upload;

pub use auth::*;
pub use cors::create_cors;
pub use upload::UploadForm;
