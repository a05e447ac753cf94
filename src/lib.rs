// src/lib.rs

//! offerwatch library: job offer change detection and notification.

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
