use actix_files::Files;
use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::Context;
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use chrono::Local;  // timestamp in log lines
use std::sync::Arc;

use edu_consult_backend::{
    AppError,
    config::{Config, StorageBackend},
    database::{create_pool, run_migrations, share_pool},
    external::{CloudinaryStorage, FileStorage, LocalDiskStorage, Mailer},
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    tasks,
    utils::JwtService,
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {e}"))?;

    // 连接数据库并迁移
    let pool = create_pool(&config.database)
        .await
        .context("Failed to connect to the database")?;
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let jwt_service = JwtService::new(&config.jwt.secret, config.jwt.expires_in);
    let mailer = Mailer::new(&config.smtp).context("Failed to configure SMTP")?;

    // 文件存储：本地磁盘或 Cloudinary
    std::fs::create_dir_all(&config.storage.local_root)
        .with_context(|| format!("Failed to create {}", config.storage.local_root))?;
    let storage: Arc<dyn FileStorage> = match config.storage.backend {
        StorageBackend::Local => Arc::new(LocalDiskStorage::new(&config.storage)),
        StorageBackend::Cloudinary => Arc::new(
            CloudinaryStorage::new(config.storage.cloudinary.clone())
                .context("Failed to configure Cloudinary")?,
        ),
    };
    log::info!("Using {:?} file storage", config.storage.backend);

    let notifier = EnquiryNotifier::new();

    // 创建服务，每个服务持有共享连接池的一个句柄
    let db = || share_pool(&pool).context("Failed to share the database pool");
    let user_service = web::Data::new(UserService::new(
        db()?,
        jwt_service.clone(),
        mailer.clone(),
        storage.clone(),
    ));
    let candidate_service = web::Data::new(CandidateService::new(
        db()?,
        jwt_service.clone(),
        mailer.clone(),
        storage.clone(),
    ));
    let country_service = web::Data::new(CountryService::new(db()?, storage.clone()));
    let college_service = web::Data::new(CollegeService::new(db()?, storage.clone()));
    let course_service = web::Data::new(CourseService::new(db()?, storage.clone()));
    let intake_service = web::Data::new(IntakeService::new(db()?));
    let job_service = web::Data::new(JobService::new(db()?));
    let certificate_service = web::Data::new(CertificateService::new(db()?));
    let blog_service = web::Data::new(BlogService::new(db()?, storage.clone()));
    let gallery_service = web::Data::new(GalleryService::new(db()?, storage.clone()));
    let offering_service = web::Data::new(OfferingService::new(db()?, storage.clone()));
    let enquiry_service = web::Data::new(EnquiryService::new(
        db()?,
        mailer.clone(),
        notifier.clone(),
    ));
    let contact_service = web::Data::new(ContactService::new(db()?));
    let coupon_service = web::Data::new(CouponService::new(db()?));
    let package_service = web::Data::new(PackageService::new(db()?));

    // 初始数据
    country_service
        .ensure_home_country()
        .await
        .context("Failed to seed the default country")?;
    user_service
        .ensure_admin(&config.seed)
        .await
        .context("Failed to seed the default admin")?;

    tasks::spawn_all(
        enquiry_service.clone().into_inner(),
        intake_service.clone().into_inner(),
        notifier.clone(),
    );

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    let local_root = config.storage.local_root.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .wrap(create_cors())
            .wrap(Logger::default())
            .app_data(web::JsonConfig::default().limit(1024 * 1024).error_handler(
                |err, _| AppError::ValidationError(format!("Invalid JSON body: {err}")).into(),
            ))
            .app_data(web::QueryConfig::default().error_handler(|err, _| {
                AppError::ValidationError(format!("Invalid query string: {err}")).into()
            }))
            .app_data(web::PathConfig::default().error_handler(|err, _| {
                AppError::ValidationError(format!("Invalid path parameter: {err}")).into()
            }))
            .app_data(web::Data::new(storage.clone()))
            .app_data(web::Data::new(notifier.clone()))
            .app_data(user_service.clone())
            .app_data(candidate_service.clone())
            .app_data(country_service.clone())
            .app_data(college_service.clone())
            .app_data(course_service.clone())
            .app_data(intake_service.clone())
            .app_data(job_service.clone())
            .app_data(certificate_service.clone())
            .app_data(blog_service.clone())
            .app_data(gallery_service.clone())
            .app_data(offering_service.clone())
            .app_data(enquiry_service.clone())
            .app_data(contact_service.clone())
            .app_data(coupon_service.clone())
            .app_data(package_service.clone())
            .configure(swagger_config)
            .service(Files::new("/public", &local_root))
            .configure(handlers::common_config)
            .configure(handlers::user_config)
            .configure(handlers::candidate_config)
            .configure(handlers::country_config)
            .configure(handlers::college_config)
            .configure(handlers::course_config)
            .configure(handlers::intake_config)
            .configure(handlers::job_config)
            .configure(handlers::certificate_config)
            .configure(handlers::blog_config)
            .configure(handlers::gallery_config)
            .configure(handlers::offering_config)
            .configure(handlers::enquiry_config)
            .configure(handlers::contact_config)
            .configure(handlers::coupon_config)
            .configure(handlers::package_config)
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await?;

    Ok(())
}
