//! IdeaStruct: turn an app idea into a technical blueprint.
//!
//! A request flows through [`prompt`] into the [`generation`] provider chain;
//! when no provider answers, [`blueprint`] renders a deterministic fallback.
//! [`pipeline`] ties those together, [`db`] stores saved ideas and [`api`]
//! exposes everything over HTTP.

pub mod api;
pub mod blueprint;
pub mod config;
pub mod db;
pub mod generation;
pub mod models;
pub mod pipeline;
pub mod prompt;
