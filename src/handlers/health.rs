use crate::config::AppSettings;
use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    status: String,
    service: String,
    version: String,
}

pub async fn health_check(settings: web::Data<AppSettings>) -> impl Responder {
    // Public endpoint - basic status only, no configuration details
    let response = HealthResponse {
        status: "ok".to_string(),
        service: settings.app.name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    HttpResponse::Ok().json(response)
}
