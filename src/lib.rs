pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod provider;
pub mod service;
pub mod store;
