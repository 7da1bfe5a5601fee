/*
 * Responsibility
 * - v1 の公開ポイント (routes() / RouteTable の re-export など)
 */
pub mod extractors;
pub mod handlers;
mod routes;

pub use routes::{RouteMeta, RouteTable, routes};
