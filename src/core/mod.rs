pub mod analysis;
pub mod config;
pub mod error;
pub mod fusion;
pub mod provenance;
pub mod video;
