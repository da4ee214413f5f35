pub mod analytics;
pub mod cli;
pub mod config;
pub mod input;
pub mod request;
pub mod view;
