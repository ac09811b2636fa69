/*
 * Responsibility
 * - Cross-cutting HTTP middleware applied in app::build_router
 */
pub mod http;
