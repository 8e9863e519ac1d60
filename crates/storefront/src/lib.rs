//! Aurora Storefront - headless storefront for Óptica La Inteligente.
//!
//! A JSON facade over the Aurora backend API: catalog browsing with a
//! filter/sort/paginate pipeline, cart and checkout (Wompi), price quotes,
//! and the admin audit viewer with a live SSE tail.
//!
//! # Architecture
//!
//! - Axum HTTP server exposing the routes in [`routes`]
//! - One [`api::ApiClient`] against the backend base URL resolved at startup
//! - Domain services in [`services`], [`catalog`], and [`audit`]
//! - A file-backed [`prefs::PreferenceStore`] for UI state that survives
//!   restarts

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod audit;
pub mod catalog;
pub mod config;
pub mod error;
pub mod prefs;
pub mod routes;
pub mod services;
pub mod state;
