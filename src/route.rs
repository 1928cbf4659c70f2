//! Route definitions for the listing API
//!
//! Maps the REST endpoints onto their handlers, layers the bearer-token
//! middleware over the protected subsets and serves uploaded images as
//! static files under `/uploads`.

use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::services::ServeDir;

use crate::database::AppState;
use crate::handler::{
    create_property, delete_property, get_filter_options, get_property_by_id,
    get_rent_properties, get_sale_properties, list_properties, search_properties,
    update_property,
};
use crate::inquiry::{
    get_all_general_inquiries, get_all_inquiries, get_general_inquiry_by_id,
    get_inquiries_by_property, get_inquiries_by_user, get_inquiry_by_id,
    submit_general_inquiry, submit_inquiry,
};
use crate::middleware::auth_middleware;

/// Creates and configures the application router
///
/// # Route Map
///
/// Properties:
/// - `GET    /properties` - filtered listing (public)
/// - `GET    /properties/search` - text search (public)
/// - `GET    /properties/filters` - distinct filter menu values (public)
/// - `GET    /properties/for-rent`, `/for-sale` - fixed listing-type lists (public)
/// - `GET    /properties/{id}` - structured detail view (public)
/// - `POST   /properties` - create with multipart image (auth)
/// - `PUT    /properties/{id}` - update, optional new image (auth + admin)
/// - `DELETE /properties/{id}` - delete record and image (auth + admin)
///
/// Inquiries:
/// - `POST /inquiries/submit` - public, optional token attribution
/// - `GET  /inquiries/byProperty/{propertyId}` - public
/// - `GET  /inquiries/{id}` - public
/// - `GET  /inquiries/byUser` - auth, caller's own inquiries only
/// - `GET  /inquiries/getAllInquiry` - auth
///
/// General inquiries:
/// - `POST /general-inquiries/submit-general-inquiry` - public
/// - `GET  /general-inquiries/getgeneralInquiryById/{id}` - public
/// - `GET  /general-inquiries/getAllgeneralInquiries` - auth
pub fn create_app(state: AppState) -> Router {
    let protected_properties = Router::new()
        .route("/", post(create_property))
        .route("/{id}", put(update_property).delete(delete_property))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let properties = Router::new()
        .route("/", get(list_properties))
        .route("/search", get(search_properties))
        .route("/filters", get(get_filter_options))
        .route("/for-rent", get(get_rent_properties))
        .route("/for-sale", get(get_sale_properties))
        .route("/{id}", get(get_property_by_id))
        .merge(protected_properties);

    let protected_inquiries = Router::new()
        .route("/byUser", get(get_inquiries_by_user))
        .route("/getAllInquiry", get(get_all_inquiries))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let inquiries = Router::new()
        .route("/submit", post(submit_inquiry))
        .route("/byProperty/{propertyId}", get(get_inquiries_by_property))
        .route("/{id}", get(get_inquiry_by_id))
        .merge(protected_inquiries);

    let protected_general_inquiries = Router::new()
        .route("/getAllgeneralInquiries", get(get_all_general_inquiries))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let general_inquiries = Router::new()
        .route("/submit-general-inquiry", post(submit_general_inquiry))
        .route(
            "/getgeneralInquiryById/{id}",
            get(get_general_inquiry_by_id),
        )
        .merge(protected_general_inquiries);

    Router::new()
        .nest("/properties", properties)
        .nest("/inquiries", inquiries)
        .nest("/general-inquiries", general_inquiries)
        // Uploaded images are addressable by filename at the well-known prefix
        .nest_service("/uploads", ServeDir::new(&state.config.upload_dir))
        .with_state(state)
}
