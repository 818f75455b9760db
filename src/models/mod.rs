//! Domain models for IdeaStruct.
//!
//! # Core Concepts
//!
//! - [`GenerationRequest`]: A validated app idea submission (idea, platform,
//!   optional audience and features). Built fresh per submission.
//! - [`GenerationResult`]: The blueprint markdown plus whether it came from an
//!   AI provider or the deterministic fallback.
//! - [`Idea`]: A saved blueprint owned by a [`User`]. Created on explicit save,
//!   deletable by its owner, otherwise immutable.

mod generation;
mod idea;
mod user;

pub use generation::*;
pub use idea::*;
pub use user::*;
