#![allow(dead_code)]

pub mod app;
pub mod strategies;

pub use app::*;
pub use strategies::*;
