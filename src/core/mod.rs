//! Core functionality: document model, persistence, admin gate and mutations

pub mod admin;
pub mod config;
pub mod image;
pub mod model;
pub mod mutate;
pub mod state;
pub mod storage;
