use axum::{
    Router,
    routing::{get, post, put},
};

pub mod products;
pub mod system;
pub mod users;

/// Every endpoint, unprotected. Access control is layered on in `build_router`.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/api/users/register", post(users::register))
        .route("/api/users/login", post(users::login))
        .route("/api/users/me", get(users::me))
        .route("/api/products", get(products::list_my_products))
        .route("/api/products/all", get(products::list_all_products))
        .route("/api/products/add", post(products::create_product))
        .route("/api/products/farmer/:farmer_id", get(products::list_farmer_products))
        .route("/api/products/edit/:id", put(products::update_product))
        .route(
            "/api/products/:id",
            get(products::get_product).delete(products::delete_product),
        )
}
