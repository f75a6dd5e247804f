use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::*;
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::user::register,
        handlers::user::login,
        handlers::user::send_otp,
        handlers::user::verify_otp,
        handlers::user::forgot_password,
        handlers::user::reset_password,
        handlers::user::current,
        handlers::user::update,
        handlers::user::delete,
        handlers::user::block,
        handlers::user::reactivate,
        handlers::user::list,
        handlers::user::get,
        handlers::candidate::register,
        handlers::candidate::login,
        handlers::candidate::send_otp,
        handlers::candidate::verify_otp,
        handlers::candidate::forgot_password,
        handlers::candidate::reset_password,
        handlers::candidate::current,
        handlers::candidate::update,
        handlers::candidate::delete,
        handlers::candidate::block,
        handlers::candidate::reactivate,
        handlers::candidate::list,
        handlers::candidate::get,
        handlers::country::create_country,
        handlers::country::list_countries,
        handlers::country::count_countries,
        handlers::country::get_country,
        handlers::country::update_country,
        handlers::country::delete_country,
        handlers::college::create_college,
        handlers::college::list_colleges,
        handlers::college::count_colleges,
        handlers::college::get_college,
        handlers::college::update_college,
        handlers::college::soft_delete_college,
        handlers::college::hard_delete_college,
        handlers::college::create_course,
        handlers::college::list_courses,
        handlers::college::get_course,
        handlers::college::update_course,
        handlers::college::delete_course,
        handlers::intake::create_intake,
        handlers::intake::list_intakes,
        handlers::intake::count_intakes,
        handlers::intake::get_intake,
        handlers::intake::update_intake,
        handlers::intake::soft_delete_intake,
        handlers::intake::hard_delete_intake,
        handlers::job::create_job,
        handlers::job::list_jobs,
        handlers::job::count_jobs,
        handlers::job::get_job,
        handlers::job::update_job,
        handlers::job::delete_job,
        handlers::job::create_certificate,
        handlers::job::list_certificates,
        handlers::job::count_certificates,
        handlers::job::get_certificate,
        handlers::job::update_certificate,
        handlers::job::delete_certificate,
        handlers::content::create_blog,
        handlers::content::list_blogs,
        handlers::content::get_blog,
        handlers::content::update_blog,
        handlers::content::soft_delete_blog,
        handlers::content::hard_delete_blog,
        handlers::content::create_gallery_item,
        handlers::content::list_gallery,
        handlers::content::get_gallery_item,
        handlers::content::update_gallery_item,
        handlers::content::soft_delete_gallery_item,
        handlers::content::hard_delete_gallery_item,
        handlers::content::create_offering,
        handlers::content::list_offerings,
        handlers::content::count_offerings,
        handlers::content::get_offering,
        handlers::content::update_offering,
        handlers::content::soft_delete_offering,
        handlers::content::hard_delete_offering,
        handlers::enquiry::create_enquiry,
        handlers::enquiry::list_enquiries,
        handlers::enquiry::new_enquiry_count,
        handlers::enquiry::total_enquiry_count,
        handlers::enquiry::get_enquiry,
        handlers::enquiry::update_enquiry,
        handlers::enquiry::activate_enquiry,
        handlers::enquiry::soft_delete_enquiry,
        handlers::enquiry::enquiry_stream,
        handlers::enquiry::create_contact,
        handlers::enquiry::list_contacts,
        handlers::enquiry::update_contact_status,
        handlers::enquiry::delete_contact,
        handlers::enquiry::delete_all_contacts,
        handlers::enquiry::count_contacts,
        handlers::commerce::create_coupon,
        handlers::commerce::validate_coupon,
        handlers::commerce::list_coupons,
        handlers::commerce::get_coupon,
        handlers::commerce::update_coupon,
        handlers::commerce::delete_coupon,
        handlers::commerce::create_package,
        handlers::commerce::apply_coupon,
        handlers::commerce::list_packages,
        handlers::commerce::count_packages,
        handlers::commerce::get_package,
        handlers::commerce::update_package,
        handlers::commerce::delete_package,
        handlers::common::upload_image,
    ),
    components(
        schemas(
            RegisterUserRequest,
            UpdateUserRequest,
            LoginRequest,
            EmailRequest,
            VerifyOtpRequest,
            ResetPasswordRequest,
            UserResponse,
            UserAuthResponse,
            UserType,
            UserStatus,
            CandidateRequest,
            CandidateResponse,
            CandidateRegistered,
            CandidateAuthResponse,
            CandidateStatus,
            Gender,
            GuardianRelation,
            IdentityType,
            EducationDetail,
            CountryRequest,
            Country,
            CollegeRequest,
            CollegeListQuery,
            College,
            CollegeCategory,
            CollegeStatus,
            CourseRequest,
            CourseListQuery,
            Course,
            CourseMode,
            IntakeRequest,
            Intake,
            IntakeMonth,
            IntakeStatus,
            JobRequest,
            Job,
            JobType,
            CertificateRequest,
            Certificate,
            BlogRequest,
            Blog,
            GalleryRequest,
            GalleryItem,
            OfferingRequest,
            Offering,
            ServicePoint,
            EnquiryRequest,
            Enquiry,
            EnquiryBrief,
            NewEnquirySummary,
            EnquiryStatus,
            LeadQuality,
            ContactRequest,
            ContactStatusRequest,
            ContactCounts,
            Contact,
            ContactStatus,
            CouponRequest,
            ValidateCouponRequest,
            Coupon,
            CouponStatus,
            PackageRequest,
            ApplyCouponRequest,
            Package,
            PackageType,
            PackageStatus,
            PaginationParams,
            CountResponse,
            UploadResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "user", description = "Staff accounts"),
        (name = "candidate", description = "Candidate accounts"),
        (name = "country", description = "Destination countries"),
        (name = "college", description = "Colleges"),
        (name = "course", description = "Courses"),
        (name = "intake", description = "College intakes"),
        (name = "job", description = "Job openings"),
        (name = "certificate", description = "Certificates"),
        (name = "blog", description = "Blog posts"),
        (name = "gallery", description = "Gallery"),
        (name = "service", description = "Consultancy services"),
        (name = "enquiry", description = "Enquiries and live notifications"),
        (name = "contact", description = "Contact messages"),
        (name = "coupon", description = "Coupons"),
        (name = "package", description = "Packages"),
        (name = "upload", description = "Image upload"),
    ),
    info(
        title = "Edu Consult Backend API",
        version = "0.1.0",
        description = "REST API for the education consultancy platform"
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_resources() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/packages/apply-coupon"));
        assert!(doc.paths.paths.contains_key("/intake/hard/{id}"));
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
