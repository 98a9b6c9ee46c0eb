pub mod api;
pub mod config;
pub mod db;
pub mod range;
pub mod service;
pub mod store;
