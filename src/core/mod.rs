pub mod config;
pub mod engine;
pub mod generation;
pub mod library;
pub mod scanner;
pub mod session;
