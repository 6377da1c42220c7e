pub mod config;
pub mod operators;
pub mod plan;
pub mod run;
pub mod validate;
