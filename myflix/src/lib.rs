//! Client library for the myflix movie catalog API.
//!
//! [`api::ApiClient`] wraps every HTTP call, attaching the bearer token from
//! a [`session::SessionStore`] and publishing user changes through a
//! [`notify::UserNotifier`]. [`views`] holds the screen logic the CLI renders.

pub mod api;
pub mod config;
pub mod logging;
pub mod models;
pub mod notify;
pub mod session;
pub mod views;
