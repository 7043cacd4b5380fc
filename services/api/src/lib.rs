//! wavecast API service
//!
//! REST backend for a short-form audio sharing application: registration
//! and login, audio upload, a swipeable feed, likes, comments, follows,
//! and public profiles.

pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod upload;
pub mod validation;
