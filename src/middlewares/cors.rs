use actix_cors::Cors;

pub fn create_cors() -> Cors {
    Cors::default()
        // 前台、后台与候选人端分别部署，来源不固定
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
        .allow_any_header()
        .expose_headers(vec!["Content-Type"])
        .max_age(3600)
}
