pub mod blog_service;
pub mod candidate_service;
pub mod certificate_service;
pub mod college_service;
pub mod contact_service;
pub mod country_service;
pub mod coupon_service;
pub mod course_service;
pub mod enquiry_service;
pub mod gallery_service;
pub mod intake_service;
pub mod job_service;
pub mod listing;
pub mod notifier;
pub mod offering_service;
pub mod package_service;
pub mod user_service;

pub use blog_service::*;
pub use candidate_service::*;
pub use certificate_service::*;
pub use college_service::*;
pub use contact_service::*;
pub use country_service::*;
pub use coupon_service::*;
pub use course_service::*;
pub use enquiry_service::*;
pub use gallery_service::*;
pub use intake_service::*;
pub use job_service::*;
pub use notifier::*;
pub use offering_service::*;
pub use package_service::*;
pub use user_service::*;
