//! The blueprint pipeline: build prompt, try providers, fall back, optionally persist.
//!
//! Generation never fails for a valid request. Provider failures are logged
//! and replaced by the deterministic fallback document; persistence failures
//! are reported separately so the caller still has the blueprint.

use thiserror::Error;

use crate::blueprint::fallback_for;
use crate::db::{Database, StoreError};
use crate::generation::ProviderChain;
use crate::models::*;
use crate::prompt::build_prompt;

/// Why a generated blueprint could not be saved.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("Sign in to save blueprints")]
    Unauthorized,

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone)]
pub struct BlueprintService {
    chain: ProviderChain,
}

impl BlueprintService {
    pub fn new(chain: ProviderChain) -> Self {
        Self { chain }
    }

    /// Produce a blueprint for `request`, falling back to the template.
    pub async fn generate(&self, request: &GenerationRequest) -> GenerationResult {
        let prompt = build_prompt(request);
        tracing::debug!(
            "Generating blueprint for '{}' ({})",
            request.idea_description(),
            request.platform()
        );

        match self.chain.generate(&prompt).await {
            Ok(generated) => GenerationResult {
                content: generated.text,
                source_kind: SourceKind::Ai,
            },
            Err(unavailable) => {
                tracing::warn!("{}; using fallback blueprint", unavailable);
                GenerationResult {
                    content: fallback_for(request),
                    source_kind: SourceKind::Fallback,
                }
            }
        }
    }
}

/// Save a blueprint and the request that produced it for `owner`.
pub fn save_result(
    db: &Database,
    owner: Option<&User>,
    request: &GenerationRequest,
    result: &GenerationResult,
) -> Result<Idea, SaveError> {
    let owner = owner.ok_or(SaveError::Unauthorized)?;

    let idea = db.create_idea(
        owner.id,
        CreateIdeaInput {
            idea_description: request.idea_description().to_string(),
            platform: request.platform(),
            target_audience: request.target_audience().map(String::from),
            features: request.features().map(String::from),
            blueprint: result.content.clone(),
        },
    )?;

    tracing::info!("Saved idea {} for user {}", idea.id, owner.id);
    Ok(idea)
}
