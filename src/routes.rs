//! Router assembly and the route → access policy table.
//!
//! Route templates are shared between the router and [`policy_table`] so the
//! gate's `MatchedPath` lookup always sees the same strings.

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_cookies::CookieManagerLayer;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::handlers::{protected, public};
use crate::middleware::{session_gate, AccessPolicy, Gate, PolicyTable, RoutePolicy};
use crate::state::AppState;

pub const HEALTH: &str = "/v1/health";

pub const LOGIN: &str = "/v1/auth/login";
pub const REGISTER: &str = "/v1/auth/register";
pub const CONFIRM: &str = "/v1/auth/confirm";
pub const RESEND: &str = "/v1/auth/resend";
pub const FORGOT: &str = "/v1/auth/forgot";
pub const RESET: &str = "/v1/auth/reset";
pub const GOOGLE: &str = "/v1/auth/google";
pub const CALLBACK: &str = "/v1/auth/callback";

pub const LOGOUT: &str = "/v1/auth/logout";
pub const ME: &str = "/v1/auth/me";
pub const ADD_USER_GROUPS: &str = "/v1/auth/add-user-groups";
pub const LIST_GROUPS: &str = "/v1/auth/list-groups";

pub const PRODUCTS: &str = "/v1/products";
pub const PRODUCT: &str = "/v1/product/:id";
pub const CATEGORIES: &str = "/v1/products/category";
pub const CATEGORY: &str = "/v1/products/category/:id";
pub const SIZE_TYPES: &str = "/v1/products/size";
pub const SIZE_TYPE: &str = "/v1/products/size/:id";

pub const OPERATIONALS: &str = "/v1/groceries/operational";
pub const OPERATIONAL: &str = "/v1/groceries/operational/:id";
pub const GROCERY_PRODUCTS: &str = "/v1/groceries/products";
pub const GROCERY_PRODUCT: &str = "/v1/groceries/products/:id";

pub const CARTS: &str = "/v1/transactions/carts";
pub const CART: &str = "/v1/transactions/carts/:id";
pub const CHECKOUTS: &str = "/v1/transactions/checkout";
pub const CHECKOUT: &str = "/v1/transactions/checkout/:id";
pub const ORDERS: &str = "/v1/transactions/orders";
pub const ORDER: &str = "/v1/transactions/orders/:id";

/// Required groups for every protected route
pub fn policy_table() -> PolicyTable {
    use AccessPolicy::*;

    let mut routes = vec![
        RoutePolicy::new(Method::GET, LOGOUT, Authenticated),
        RoutePolicy::new(Method::GET, ME, Authenticated),
        RoutePolicy::new(Method::POST, ADD_USER_GROUPS, Authenticated),
        RoutePolicy::new(Method::GET, LIST_GROUPS, Admin),
        RoutePolicy::new(Method::GET, PRODUCTS, Authenticated),
        RoutePolicy::new(Method::GET, PRODUCT, Authenticated),
        RoutePolicy::new(Method::POST, CATEGORIES, Grosir),
        RoutePolicy::new(Method::GET, CATEGORIES, Authenticated),
        RoutePolicy::new(Method::GET, CATEGORY, Authenticated),
        RoutePolicy::new(Method::PUT, CATEGORY, Grosir),
        RoutePolicy::new(Method::DELETE, CATEGORY, Grosir),
        RoutePolicy::new(Method::POST, SIZE_TYPES, Grosir),
        RoutePolicy::new(Method::GET, SIZE_TYPES, Authenticated),
        RoutePolicy::new(Method::GET, SIZE_TYPE, Authenticated),
        RoutePolicy::new(Method::PUT, SIZE_TYPE, Grosir),
        RoutePolicy::new(Method::DELETE, SIZE_TYPE, Grosir),
        RoutePolicy::new(Method::GET, OPERATIONALS, Authenticated),
        RoutePolicy::new(Method::POST, OPERATIONALS, Grosir),
        RoutePolicy::new(Method::GET, OPERATIONAL, Authenticated),
        RoutePolicy::new(Method::PUT, OPERATIONAL, GrosirManagement),
        RoutePolicy::new(Method::DELETE, OPERATIONAL, Grosir),
        RoutePolicy::new(Method::POST, GROCERY_PRODUCTS, Grosir),
        RoutePolicy::new(Method::GET, GROCERY_PRODUCTS, Authenticated),
        RoutePolicy::new(Method::PUT, GROCERY_PRODUCT, Grosir),
        RoutePolicy::new(Method::DELETE, GROCERY_PRODUCT, Grosir),
    ];

    for (collection, item) in [(CARTS, CART), (CHECKOUTS, CHECKOUT), (ORDERS, ORDER)] {
        routes.push(RoutePolicy::new(Method::POST, collection, Retail));
        routes.push(RoutePolicy::new(Method::GET, collection, Retail));
        routes.push(RoutePolicy::new(Method::GET, item, Retail));
        routes.push(RoutePolicy::new(Method::PUT, item, Retail));
        routes.push(RoutePolicy::new(Method::DELETE, item, Retail));
    }

    PolicyTable::new(routes)
}

/// The full application: public routes, gated routes, cookies, CORS, tracing
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.settings.cors_origins);
    let gate = Gate::new(state.clone(), policy_table());

    Router::new()
        .merge(public_routes())
        .merge(protected_routes().route_layer(from_fn_with_state(gate, session_gate)))
        .fallback(not_found)
        .with_state(state)
        .layer(CookieManagerLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn public_routes() -> Router<AppState> {
    use public::{auth, health};

    Router::new()
        .route(HEALTH, get(health::health))
        .route(LOGIN, post(auth::login))
        .route(REGISTER, post(auth::register))
        .route(CONFIRM, post(auth::confirm))
        .route(RESEND, post(auth::resend))
        .route(FORGOT, post(auth::forgot))
        .route(RESET, post(auth::reset))
        .route(GOOGLE, get(auth::google))
        .route(CALLBACK, get(auth::callback))
}

fn protected_routes() -> Router<AppState> {
    use protected::{auth, catalog, groceries, transactions as tx};

    Router::new()
        // Session
        .route(LOGOUT, get(auth::logout))
        .route(ME, get(auth::me))
        .route(ADD_USER_GROUPS, post(auth::add_user_groups))
        .route(LIST_GROUPS, get(auth::list_groups))
        // Catalog
        .route(PRODUCTS, get(catalog::list_products))
        .route(PRODUCT, get(catalog::get_product))
        .route(CATEGORIES, get(catalog::list_categories).post(catalog::create_category))
        .route(
            CATEGORY,
            get(catalog::get_category)
                .put(catalog::update_category)
                .delete(catalog::delete_category),
        )
        .route(SIZE_TYPES, get(catalog::list_size_types).post(catalog::create_size_type))
        .route(
            SIZE_TYPE,
            get(catalog::get_size_type)
                .put(catalog::update_size_type)
                .delete(catalog::delete_size_type),
        )
        // Groceries
        .route(
            OPERATIONALS,
            get(groceries::list_operationals).post(groceries::create_operational),
        )
        .route(
            OPERATIONAL,
            get(groceries::get_operational)
                .put(groceries::update_operational)
                .delete(groceries::delete_operational),
        )
        .route(
            GROCERY_PRODUCTS,
            get(groceries::list_own_products).post(groceries::create_product),
        )
        .route(
            GROCERY_PRODUCT,
            axum::routing::put(groceries::update_product).delete(groceries::delete_product),
        )
        // Transactions
        .route(CARTS, get(tx::list_cart).post(tx::add_to_cart))
        .route(
            CART,
            get(tx::get_cart_line).put(tx::update_cart_line).delete(tx::delete_cart_line),
        )
        .route(CHECKOUTS, get(tx::list_checkouts).post(tx::create_checkout))
        .route(
            CHECKOUT,
            get(tx::get_checkout).put(tx::update_checkout).delete(tx::delete_checkout),
        )
        .route(ORDERS, get(tx::list_orders).post(tx::create_order))
        .route(ORDER, get(tx::get_order).put(tx::update_order).delete(tx::delete_order))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": true,
            "message": "Route not found",
            "code": "NOT_FOUND"
        })),
    )
}
