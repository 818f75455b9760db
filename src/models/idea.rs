use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::generation::Platform;

/// A saved blueprint together with the inputs that produced it.
///
/// Ideas are owned by exactly one user. Once created they are immutable;
/// the owner may delete them but nothing else changes them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Idea {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub owner_id: Uuid,
    pub idea_description: String,
    pub platform: Platform,
    pub target_audience: Option<String>,
    pub features: Option<String>,
    /// The markdown blueprint.
    pub blueprint: String,
}

/// Input for saving an idea.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIdeaInput {
    pub idea_description: String,
    pub platform: Platform,
    pub target_audience: Option<String>,
    pub features: Option<String>,
    pub blueprint: String,
}

/// Default number of ideas per dashboard page.
pub const DEFAULT_PAGE_SIZE: u32 = 6;

/// Upper bound on a single page.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Query parameters for listing a user's ideas.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListIdeasQuery {
    /// Number of ideas to skip.
    pub offset: Option<u32>,
    /// Page size. Defaults to [`DEFAULT_PAGE_SIZE`].
    pub limit: Option<u32>,
    /// Case-insensitive search over idea, audience and features.
    pub q: Option<String>,
    pub platform: Option<Platform>,
}

impl ListIdeasQuery {
    pub fn page(offset: u32, limit: u32) -> Self {
        Self {
            offset: Some(offset),
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn offset(&self) -> u32 {
        self.offset.unwrap_or(0)
    }

    pub fn limit(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }
}

/// One page of a user's ideas, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaPage {
    pub ideas: Vec<Idea>,
    /// Total matching ideas across all pages.
    pub total: u64,
    pub offset: u32,
    pub limit: u32,
    pub has_more: bool,
}
