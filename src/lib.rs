pub mod config;
pub mod data;
pub mod error;
pub mod factors;
pub mod model;
pub mod networks;
pub mod operators;
pub mod score;
pub mod search;
// cmd and reports are binary modules (declared from main.rs).
