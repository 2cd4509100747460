pub mod app;
pub mod auth;
pub mod charts;
pub mod config;
pub mod db;
pub mod error;
pub mod health;
pub mod middleware;
pub mod pages;
pub mod state;
pub mod views;
pub mod weights;
