// src/core/mod.rs
pub mod context;
pub mod engine;
pub mod portfolio;
pub mod risk;
pub mod watchlist;
