use axum::{http::Method, routing::get, Router};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::{app_state::AppState, config::Settings};

pub fn create(app_state: AppState, config: &Settings) -> Router<()> {
    let app = Router::new()
        .route("/", get(|| async { "itinera-api" }))
        .nest(
            "/trips",
            crate::routes::trips::router().merge(crate::routes::checklist::router()),
        );

    let app_url = config.application.app_url.clone();
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers(["content-type".parse().expect("valid header name")])
        .allow_origin(AllowOrigin::predicate(move |origin, _| {
            origin.to_str().unwrap_or_default() == app_url
        }));

    app.layer(cors)
        .layer(
            TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::new().include_headers(false)),
        )
        .with_state(app_state)
}
