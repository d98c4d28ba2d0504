// src/lib.rs

//! IPO Feed Library

pub mod api;
pub mod diagnostics;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;
