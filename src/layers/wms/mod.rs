//! WMS layers: configuration, parameter translation, construction and live updates

pub mod config;
pub mod factory;
pub mod layer;
pub mod params;
pub mod scheduler;
