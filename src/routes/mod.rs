use axum::{
    extract::DefaultBodyLimit,
    handler::Handler,
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::handlers::{auth, catalogo, informes, revision, usuarios, vehiculos};
use crate::middleware::auth::{auth_middleware, require_admin};
use crate::middleware::request_log::log_request;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    let admin_only = || middleware::from_fn(require_admin);

    // Public routes
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    // Everything else needs a bearer token; admin-only methods carry an
    // extra role check on the handler itself
    let protected_routes = Router::new()
        .route("/usuarios", get(usuarios::list_usuarios.layer(admin_only())))
        // Vehicles
        .route(
            "/vehiculos",
            get(vehiculos::list_vehiculos).post(vehiculos::create_vehiculo),
        )
        .route(
            "/vehiculos/{placa}",
            put(vehiculos::update_vehiculo).delete(vehiculos::delete_vehiculo),
        )
        // Catalog
        .route(
            "/repuestos",
            get(catalogo::list_repuestos).post(catalogo::create_repuesto.layer(admin_only())),
        )
        .route(
            "/reparaciones",
            get(catalogo::list_reparaciones)
                .post(catalogo::create_reparacion.layer(admin_only())),
        )
        // Revisions
        .route(
            "/revision",
            get(revision::list_revisiones).post(revision::create_revision.layer(admin_only())),
        )
        .route(
            "/revision/{id}",
            get(revision::get_revision).patch(revision::update_revision),
        )
        .route(
            "/revision/{id}/repuestos",
            post(revision::attach_repuesto.layer(admin_only())),
        )
        // Informes
        .route(
            "/informes",
            get(informes::list_informes.layer(admin_only()))
                .post(informes::create_informe.layer(admin_only())),
        )
        .route("/informes/{id}", get(informes::get_informe))
        .route("/informes/{id}/estado", put(informes::update_estado_informe))
        .route("/informes-cliente", get(informes::list_informes_cliente))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let body_limit = state.config.body_limit_bytes;

    Router::new()
        .nest("/api", auth_routes.merge(protected_routes))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
