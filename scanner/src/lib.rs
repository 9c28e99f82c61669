pub mod config;
pub mod error;
pub mod gates;
pub mod market;
pub mod metrics;
pub mod microstructure;
pub mod scan;
pub mod scoring;
pub mod sink;
