use crate::{
    handlers::*,
    services::{PaymentLedger, PromptStore, SiteApi},
};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn PaymentLedger>,
    pub prompts: Arc<dyn PromptStore>,
    pub site: Arc<SiteApi>,
    pub public_url: String,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        ledger: Arc<dyn PaymentLedger>,
        prompts: Arc<dyn PromptStore>,
        site: Arc<SiteApi>,
        public_url: &str,
    ) -> Self {
        Self {
            ledger,
            prompts,
            site,
            public_url: public_url.trim_end_matches('/').to_string(),
            started_at: Instant::now(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/frame", post(frame_action))
        .route("/api/prompts", post(create_prompt))
        .route(
            "/api/prompts/:id/payments",
            get(payment_status).post(record_payment),
        )
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
}
