pub mod advice;
pub mod aggregate;
pub mod config;
pub mod dataset;
pub mod error;
pub mod models;
pub mod report;
pub mod sales;
pub mod scoring;
