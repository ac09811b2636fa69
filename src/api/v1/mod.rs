/*
 * Responsibility
 * - v1 public surface (routes(), well_known_routes())
 */
pub mod dto;
pub mod handlers;
mod routes;

pub use routes::{routes, well_known_routes};
