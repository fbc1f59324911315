// src/app.rs

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::{config::AppState, handlers, middleware::auth::auth_guard};

// Capturas de página em PNG podem passar de alguns MB
const RASTER_BODY_LIMIT: usize = 20 * 1024 * 1024;

pub fn build_router(app_state: AppState) -> Router {
    // Define as rotas públicas
    let public_routes = Router::new()
        .route("/health", get(handlers::session::health))
        .route("/config/public", get(handlers::session::public_config));

    // Define as rotas do operador (protegidas pelo middleware)
    let session_routes = Router::new()
        .route("/me", get(handlers::session::get_me))
        .route("/lookups", get(handlers::session::get_lookups))
        .route("/quotations/{id}", get(handlers::session::get_quotation))
        .route(
            "/enquiries",
            get(handlers::enquiries::list_enquiries).post(handlers::enquiries::create_enquiry),
        );

    let survey_routes = Router::new()
        .route("/form-schema", get(handlers::surveys::form_schema))
        .route("/sessions", post(handlers::surveys::open_survey))
        .route(
            "/sessions/{session_id}",
            get(handlers::surveys::get_survey).delete(handlers::surveys::close_survey),
        )
        .route("/sessions/{session_id}/draft", put(handlers::surveys::update_draft))
        .route("/sessions/{session_id}/next", post(handlers::surveys::next_tab))
        .route("/sessions/{session_id}/back", post(handlers::surveys::previous_tab))
        .route("/sessions/{session_id}/destinations", post(handlers::surveys::add_destination))
        .route(
            "/sessions/{session_id}/destinations/{entry_id}",
            put(handlers::surveys::update_destination).delete(handlers::surveys::remove_destination),
        )
        .route("/sessions/{session_id}/articles", post(handlers::surveys::add_article))
        .route(
            "/sessions/{session_id}/articles/{entry_id}",
            delete(handlers::surveys::remove_article),
        )
        .route("/sessions/{session_id}/pets", post(handlers::surveys::add_pet))
        .route("/sessions/{session_id}/pets/{entry_id}", delete(handlers::surveys::remove_pet))
        .route("/sessions/{session_id}/submit", post(handlers::surveys::submit_survey));

    let booking_routes = Router::new()
        .route(
            "/{id}",
            get(handlers::bookings::get_booking)
                .put(handlers::bookings::update_booking)
                .delete(handlers::bookings::delete_booking),
        )
        .route("/{id}/confirmation.pdf", get(handlers::documents::confirmation_pdf))
        .route(
            "/{id}/confirmation/raster",
            post(handlers::documents::confirmation_raster).layer(DefaultBodyLimit::max(RASTER_BODY_LIMIT)),
        )
        .route("/{id}/share", get(handlers::documents::share_booking));

    // Aplica o middleware de Auth em tudo que é do operador
    let protected = Router::new()
        .merge(session_routes)
        .nest("/surveys", survey_routes)
        .nest("/bookings", booking_routes)
        .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    // Combina tudo no router principal
    Router::new()
        .nest("/api", public_routes.merge(protected))
        .with_state(app_state)
}
