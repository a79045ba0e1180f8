// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};

use crate::{config::AppState, handlers, middleware::auth::session_layer};

pub fn build_router(app_state: AppState) -> Router {
    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        .route("/me", get(handlers::auth::get_me));

    // Gestão de contas (somente admin, verificado pelo RequirePermission)
    let user_routes = Router::new()
        .route("/list", get(handlers::users::list_users))
        .route("/create", post(handlers::users::create_user))
        .route(
            "/{id}",
            get(handlers::users::get_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        );

    Router::new()
        .route("/api/health", get(handlers::catalog::health))
        .route("/api/tipos", get(handlers::catalog::list_tipos))
        .route(
            "/api/trpc/{procedure}",
            get(handlers::rpc::query).post(handlers::rpc::mutation),
        )
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        // Toda requisição passa pela resolução de sessão
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            session_layer,
        ))
        .with_state(app_state)
}
