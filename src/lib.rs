//! Library crate for elmo-back, exposing modules for binaries and integration tests.

pub mod ai;
pub mod config;
pub mod dao;
mod dto;
mod error;
mod ids;
pub mod routes;
pub mod services;
pub mod state;
