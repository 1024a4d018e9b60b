use actix_web::web;

// Configure API routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // Charge routes (/api/charges/*)
    cfg.service(
        web::scope("/charges")
            .service(crate::handlers::charge_handlers::submit_charge)
            .service(crate::handlers::charge_handlers::get_charge_status)
            .service(crate::handlers::charge_handlers::refund_charge),
    );
}
