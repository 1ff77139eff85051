use axum::Router;

mod health;
mod pull_requests;
mod stats;
mod teams;
mod users;

pub fn configure_routes(router: Router) -> Router {
    router
        .merge(health::configure())
        .nest("/team", teams::configure())
        .nest("/users", users::configure())
        .nest("/pullRequests", pull_requests::configure())
        .nest("/stats", stats::configure())
}
