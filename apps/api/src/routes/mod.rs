pub mod health;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::assets;
use crate::documents::handlers as document_handlers;
use crate::profiles::handlers as profile_handlers;
use crate::recommend::handlers as recommend_handlers;
use crate::sections::handlers as section_handlers;
use crate::state::AppState;
use crate::templates::handlers as template_handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Sections
        .route("/api/v1/sections", post(section_handlers::handle_create_section))
        .route("/api/v1/sections", get(section_handlers::handle_list_sections))
        .route(
            "/api/v1/sections/bulk",
            post(section_handlers::handle_bulk_create),
        )
        .route(
            "/api/v1/sections/bulk-delete",
            post(section_handlers::handle_bulk_delete),
        )
        .route(
            "/api/v1/sections/:id",
            get(section_handlers::handle_get_section),
        )
        .route(
            "/api/v1/sections/:id",
            patch(section_handlers::handle_update_section),
        )
        .route(
            "/api/v1/sections/:id",
            delete(section_handlers::handle_delete_section),
        )
        // Documents (resumes)
        .route(
            "/api/v1/documents",
            post(document_handlers::handle_create_document),
        )
        .route(
            "/api/v1/documents",
            get(document_handlers::handle_list_documents),
        )
        .route(
            "/api/v1/documents/:id",
            get(document_handlers::handle_get_document),
        )
        .route(
            "/api/v1/documents/:id",
            patch(document_handlers::handle_update_document),
        )
        .route(
            "/api/v1/documents/:id",
            delete(document_handlers::handle_delete_document),
        )
        .route(
            "/api/v1/documents/:id/full",
            get(document_handlers::handle_compose_document),
        )
        // Profile
        .route("/api/v1/profile", put(profile_handlers::handle_create_profile))
        .route("/api/v1/profile", get(profile_handlers::handle_get_profile))
        .route(
            "/api/v1/profile",
            patch(profile_handlers::handle_update_profile),
        )
        // Template catalog
        .route(
            "/api/v1/templates",
            get(template_handlers::handle_list_templates),
        )
        .route(
            "/api/v1/templates/:id",
            get(template_handlers::handle_get_template),
        )
        // Recommendations
        .route(
            "/api/v1/recommendations",
            post(recommend_handlers::handle_recommend),
        )
        // Assets
        .route(
            "/api/v1/assets/images",
            post(assets::handle_upload_image),
        )
        .with_state(state)
}
