//! OpenID Connect provider action pipeline.
//!
//! Each protocol endpoint runs an ordered [`pipeline::Pipeline`] of small
//! steps over a typed [`context::Invocation`]. The standard pipelines live in
//! [`flows`]; [`app`] hosts them behind axum.

pub mod actions;
pub mod api;
pub mod app;
pub mod config;
pub mod context;
pub mod error;
pub mod flows;
pub mod middleware;
pub mod pipeline;
pub mod services;
pub mod state;

#[cfg(test)]
mod test_support;
