use crate::{
    api::{attendance, toil},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-scope limiter config; governors built from the
    // same config share one rate limiter.
    fn build_limiter(requests_per_min: u32) -> GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap()
    }

    let attendance_limiter = build_limiter(config.rate_attendance_per_min);
    let toil_limiter = build_limiter(config.rate_toil_per_min);

    cfg.service(
        web::scope(&config.api_prefix)
            .service(
                web::scope("/attendance")
                    .wrap(Governor::new(&attendance_limiter))
                    .service(
                        web::resource("/check-in").route(web::post().to(attendance::check_in)),
                    )
                    .service(
                        web::resource("/check-out").route(web::put().to(attendance::check_out)),
                    ),
            )
            .service(
                web::scope("/toil")
                    .wrap(Governor::new(&toil_limiter))
                    // /toil/balance/{employee_id}
                    .service(
                        web::resource("/balance/{employee_id}")
                            .route(web::get().to(toil::get_balance)),
                    )
                    // /toil/use
                    .service(web::resource("/use").route(web::post().to(toil::use_hours)))
                    // /toil/expire — invoked by the external scheduler
                    .service(web::resource("/expire").route(web::post().to(toil::expire)))
                    // /toil/entries/{employee_id}
                    .service(
                        web::resource("/entries/{employee_id}")
                            .route(web::get().to(toil::list_entries)),
                    ),
            )
            .service(
                web::scope("/holiday").wrap(Governor::new(&toil_limiter)).service(
                    web::resource("")
                        .route(web::get().to(toil::list_holidays))
                        .route(web::post().to(toil::add_holiday)),
                ),
            ),
    );
}
