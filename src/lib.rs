// Library exports for the preview binary and integration tests
pub mod app;
pub mod async_tasks;
pub mod cli;
pub mod components;
pub mod constants;
pub mod error;
pub mod markup;
pub mod persistence;
pub mod types;
pub mod ui;
