//! Bearer-token authorization subrequest service.
//!
//! A front-end HTTP server asks `GET /auth` whether the request it is about to
//! serve (forwarded in `X-Original-Method` / `X-Original-URI`) is allowed for
//! the bearer token the client presented.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
