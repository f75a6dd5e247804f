pub mod candidate;
pub mod college;
pub mod commerce;
pub mod common;
pub mod content;
pub mod country;
pub mod enquiry;
pub mod intake;
pub mod job;
pub mod user;

pub use candidate::candidate_config;
pub use college::{college_config, course_config};
pub use commerce::{coupon_config, package_config};
pub use common::common_config;
pub use content::{blog_config, gallery_config, offering_config};
pub use country::country_config;
pub use enquiry::{contact_config, enquiry_config};
pub use intake::intake_config;
pub use job::{certificate_config, job_config};
pub use user::user_config;
