pub mod blogs;
pub mod candidates;
pub mod certificates;
pub mod colleges;
pub mod contacts;
pub mod countries;
pub mod coupons;
pub mod courses;
pub mod enquiries;
pub mod galleries;
pub mod intakes;
pub mod jobs;
pub mod json_types;
pub mod offerings;
pub mod packages;
pub mod users;

pub use blogs as blog_entity;
pub use candidates as candidate_entity;
pub use certificates as certificate_entity;
pub use colleges as college_entity;
pub use contacts as contact_entity;
pub use countries as country_entity;
pub use coupons as coupon_entity;
pub use courses as course_entity;
pub use enquiries as enquiry_entity;
pub use galleries as gallery_entity;
pub use intakes as intake_entity;
pub use jobs as job_entity;
pub use offerings as offering_entity;
pub use packages as package_entity;
pub use users as user_entity;

pub use candidates::{CandidateStatus, Gender, GuardianRelation, IdentityType};
pub use colleges::{CollegeCategory, CollegeStatus};
pub use contacts::ContactStatus;
pub use coupons::CouponStatus;
pub use courses::CourseMode;
pub use enquiries::{EnquiryStatus, LeadQuality};
pub use intakes::{IntakeMonth, IntakeStatus};
pub use jobs::JobType;
pub use json_types::*;
pub use packages::{PackageStatus, PackageType};
pub use users::{UserStatus, UserType};
