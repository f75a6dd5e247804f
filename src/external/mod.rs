pub mod cloudinary;
pub mod mailer;
pub mod storage;

pub use cloudinary::CloudinaryStorage;
pub use mailer::Mailer;
pub use storage::*;
