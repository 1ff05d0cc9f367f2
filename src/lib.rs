pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod ml;
pub mod models;
pub mod routes;
pub mod services;
