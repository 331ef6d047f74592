pub mod app;
pub mod config;
pub mod console;
pub mod domain;
pub mod error;
pub mod fs_util;
pub mod guide;
pub mod output;
pub mod reconcile;
pub mod select;
pub mod store;
pub mod tmdb;
