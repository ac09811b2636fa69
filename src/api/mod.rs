/*
 * Responsibility
 * - HTTP surface, versioned under api::v1
 */
pub mod v1;
