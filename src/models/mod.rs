pub mod candidate;
pub mod college;
pub mod commerce;
pub mod common;
pub mod content;
pub mod country;
pub mod course;
pub mod enquiry;
pub mod intake;
pub mod job;
pub mod pagination;
pub mod user;

pub use candidate::*;
pub use college::*;
pub use commerce::*;
pub use common::*;
pub use content::*;
pub use country::*;
pub use course::*;
pub use enquiry::*;
pub use intake::*;
pub use job::*;
pub use pagination::*;
pub use user::*;

use crate::entities::{
    blog_entity, certificate_entity, college_entity, contact_entity, country_entity,
    coupon_entity, course_entity, enquiry_entity, gallery_entity, intake_entity, job_entity,
    offering_entity, package_entity,
};

// Entity rows are serialized as-is for these resources.
pub type Blog = blog_entity::Model;
pub type Certificate = certificate_entity::Model;
pub type College = college_entity::Model;
pub type Contact = contact_entity::Model;
pub type Country = country_entity::Model;
pub type Coupon = coupon_entity::Model;
pub type Course = course_entity::Model;
pub type Enquiry = enquiry_entity::Model;
pub type GalleryItem = gallery_entity::Model;
pub type Intake = intake_entity::Model;
pub type Job = job_entity::Model;
pub type Offering = offering_entity::Model;
pub type Package = package_entity::Model;
