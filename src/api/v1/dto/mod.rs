/*
 * Responsibility
 * - Wire-level request DTOs; conversion into pipeline requests
 */
pub mod authorize;
pub mod token;
pub mod webfinger;
