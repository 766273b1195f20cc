//! Shared service state and request operations
//!
//! Handlers in [`crate::routes`] are thin; every operation lives here so it can
//! be exercised without HTTP.

use crate::config::ServerConfig;
use crate::error::ApiError;
use dashmap::DashMap;
use lca_advisory::{
    Advisor, AdvisoryError, AdvisoryRequest, AdvisorySlot, Completion, GeminiClient, Insights,
    QuickTips, TipsRequest,
};
use lca_core::export::{file_name, render};
use lca_core::{
    ExportFormat, IdGenerator, ImpactResult, ProjectId, ProjectInput, ProjectPatch, ScoringEngine,
    ValidationError, Wizard,
};
use lca_store::{JsonFileBackend, MemoryBackend, ResultStore, StoreError};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;

/// Slot key for insight requests that carry no result id
const UNSAVED_SUBJECT: &str = "unsaved";

/// Startup failures
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// Store could not be opened
    #[error("failed to open result store: {0}")]
    Store(#[from] StoreError),

    /// Advisory client could not be built
    #[error("failed to build advisory client: {0}")]
    Advisory(#[from] AdvisoryError),
}

/// Insight request body: the advisory payload plus an optional result id
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsBody {
    /// Stored result this narrative belongs to
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    /// Result-derived fields
    #[serde(flatten)]
    pub request: AdvisoryRequest,
}

/// Decode an advisory body, running `projectData` through input validation
///
/// # Errors
/// [`ApiError::Validation`] when `projectData` fails coercion or domain
/// checks, [`ApiError::BadRequest`] when the rest of the body has the wrong
/// shape.
pub fn decode_advisory<T: DeserializeOwned>(mut body: serde_json::Value) -> Result<T, ApiError> {
    if let Some(data) = body.get_mut("projectData") {
        let input = ProjectInput::from_json(data.take())?;
        *data = serde_json::to_value(input).map_err(ValidationError::from)?;
    }
    serde_json::from_value(body).map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// Rendered export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    /// Document body
    pub body: String,
    /// Content type
    pub mime_type: &'static str,
    /// Suggested download name
    pub file_name: String,
}

type SlotOutcome<T> = Result<T, AdvisoryError>;

/// State shared by every request
pub struct AppState {
    store: Arc<ResultStore>,
    engine: Mutex<ScoringEngine>,
    wizard: Mutex<Wizard>,
    advisor: Advisor,
    insight_slots: DashMap<ProjectId, Arc<AdvisorySlot<SlotOutcome<Insights>>>>,
    tips_slot: AdvisorySlot<SlotOutcome<QuickTips>>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("store", &self.store)
            .field("advisor", &self.advisor)
            .field("insight_slots", &self.insight_slots.len())
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Assemble state from parts, resuming any persisted draft
    ///
    /// The engine's id generator should already start after the newest
    /// stored id; [`AppState::from_config`] arranges that.
    #[must_use]
    pub fn new(store: Arc<ResultStore>, engine: ScoringEngine, advisor: Advisor) -> Self {
        let wizard = store.draft().map_or_else(Wizard::new, Wizard::with_project);
        Self {
            store,
            engine: Mutex::new(engine),
            wizard: Mutex::new(wizard),
            advisor,
            insight_slots: DashMap::new(),
            tips_slot: AdvisorySlot::new(),
        }
    }

    /// Build state from configuration
    ///
    /// # Errors
    /// [`StartupError`] if the store cannot be loaded or the HTTP client
    /// cannot be built.
    pub fn from_config(config: &ServerConfig) -> Result<Self, StartupError> {
        let store = if config.ephemeral {
            ResultStore::open(MemoryBackend::new())?
        } else {
            ResultStore::open(JsonFileBackend::new(&config.storage_path))?
        };
        let ids = IdGenerator::starting_after(store.newest_id_millis().unwrap_or(0));
        let engine = ScoringEngine::with_ids(StdRng::from_entropy(), Arc::new(ids));

        let advisory = &config.advisory;
        let client = GeminiClient::new(
            advisory.base_url.clone(),
            advisory.api_key.clone(),
            advisory.timeout(),
        )?;
        if !client.has_credential() {
            tracing::warn!("No advisory API key configured; insights and tips will be unavailable");
        }
        let advisor = Advisor::with_models(
            Arc::new(client),
            advisory.insights_model.clone(),
            advisory.tips_model.clone(),
        );

        tracing::info!(
            entries = store.len(),
            ephemeral = config.ephemeral,
            path = %config.storage_path.display(),
            "Opened result store"
        );
        Ok(Self::new(Arc::new(store), engine, advisor))
    }

    /// Underlying store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<ResultStore> {
        &self.store
    }

    /// Validate, score and store a submitted input
    ///
    /// # Errors
    /// [`ApiError::Validation`] for bad input, [`ApiError::Store`] when the
    /// result cannot be persisted.
    pub fn analyze(&self, body: serde_json::Value) -> Result<ImpactResult, ApiError> {
        let input = ProjectInput::from_json(body)?;
        self.score_and_store(&input)
    }

    fn score_and_store(&self, input: &ProjectInput) -> Result<ImpactResult, ApiError> {
        // held across the put so results land in id order
        let mut engine = self.engine.lock();
        let result = engine.score(input)?;
        self.store.put(result.clone())?;
        Ok(result)
    }

    /// Stored result by id
    ///
    /// # Errors
    /// [`ApiError::Store`] wrapping `NotFound` for unknown ids.
    pub fn result(&self, id: &ProjectId) -> Result<ImpactResult, ApiError> {
        Ok(self.store.get(id)?)
    }

    /// Most recently stored result
    ///
    /// # Errors
    /// [`ApiError::NoLatest`] when nothing is stored.
    pub fn latest(&self) -> Result<ImpactResult, ApiError> {
        self.store.latest().ok_or(ApiError::NoLatest)
    }

    /// Render a stored result
    ///
    /// # Errors
    /// [`ApiError::Validation`] for an unknown format, [`ApiError::Store`]
    /// for an unknown id, [`ApiError::Export`] if rendering fails.
    pub fn export(&self, id: &ProjectId, format: &str) -> Result<Export, ApiError> {
        let format: ExportFormat = format.parse()?;
        let result = self.store.get(id)?;
        let body = render(&result, format).map_err(ApiError::Export)?;
        Ok(Export {
            body,
            mime_type: format.mime_type(),
            file_name: file_name(&result, format),
        })
    }

    /// Remove every stored result, the draft and any cached narrative
    ///
    /// # Errors
    /// [`ApiError::Store`] when the cleared state cannot be persisted.
    pub fn clear(&self) -> Result<(), ApiError> {
        let mut wizard = self.wizard.lock();
        self.store.clear()?;
        wizard.reset();
        self.insight_slots.clear();
        Ok(())
    }

    /// Current draft and step
    #[must_use]
    pub fn wizard(&self) -> Wizard {
        self.wizard.lock().clone()
    }

    /// Merge an edit into the draft and persist it
    ///
    /// # Errors
    /// [`ApiError::Validation`] or [`ApiError::Store`]; the draft is unchanged
    /// on either.
    pub fn update_wizard(&self, body: serde_json::Value) -> Result<Wizard, ApiError> {
        let patch: ProjectPatch =
            serde_json::from_value(body).map_err(ValidationError::from)?;
        let mut wizard = self.wizard.lock();
        let mut next = wizard.clone();
        next.apply(patch)?;
        self.store.save_draft(&next.project)?;
        *wizard = next;
        Ok(wizard.clone())
    }

    /// Advance one step
    #[must_use]
    pub fn next_step(&self) -> Wizard {
        let mut wizard = self.wizard.lock();
        wizard.next();
        wizard.clone()
    }

    /// Go back one step
    #[must_use]
    pub fn prev_step(&self) -> Wizard {
        let mut wizard = self.wizard.lock();
        wizard.prev();
        wizard.clone()
    }

    /// Discard the draft
    ///
    /// # Errors
    /// [`ApiError::Store`] when the persisted draft cannot be removed.
    pub fn reset_wizard(&self) -> Result<Wizard, ApiError> {
        let mut wizard = self.wizard.lock();
        self.store.clear_draft()?;
        wizard.reset();
        Ok(wizard.clone())
    }

    /// Score and store the current draft
    ///
    /// # Errors
    /// [`ApiError::Validation`] if the draft is incomplete.
    pub fn submit_wizard(&self) -> Result<ImpactResult, ApiError> {
        let draft = self.wizard.lock().project.clone();
        self.score_and_store(&draft)
    }

    /// Generate insights; only the newest request per result is answered
    ///
    /// A `projectId` must name a stored result. Its slot lives only while a
    /// request for it is outstanding.
    ///
    /// # Errors
    /// [`ApiError::Store`] for an unknown result id, [`ApiError::Insights`] on
    /// advisory failure, [`ApiError::Superseded`] when a newer request for the
    /// same result was issued meanwhile.
    pub async fn insights(&self, body: InsightsBody) -> Result<Insights, ApiError> {
        let key = match body.project_id {
            Some(id) => {
                self.store.get(&id)?;
                id
            }
            None => ProjectId::new(UNSAVED_SUBJECT),
        };
        let (slot, ticket) = {
            let entry = self.insight_slots.entry(key.clone()).or_default();
            (Arc::clone(entry.value()), entry.begin())
        };

        let outcome = self.advisor.insights(&body.request).await;
        let completion = slot.complete(ticket, outcome.clone());
        self.insight_slots
            .remove_if(&key, |_, current| Arc::ptr_eq(current, &slot) && !current.is_pending());

        match completion {
            Completion::Accepted => outcome.map_err(ApiError::Insights),
            Completion::Stale => Err(ApiError::Superseded),
        }
    }

    /// Results with an insight request in flight
    #[must_use]
    pub fn pending_insights(&self) -> usize {
        self.insight_slots.len()
    }

    /// Generate quick tips; only the newest request is answered
    ///
    /// # Errors
    /// [`ApiError::Suggestions`] on advisory failure, [`ApiError::Superseded`]
    /// when a newer request was issued meanwhile.
    pub async fn suggestions(&self, request: TipsRequest) -> Result<QuickTips, ApiError> {
        let ticket = self.tips_slot.begin();
        let outcome = self.advisor.quick_tips(&request).await;
        match self.tips_slot.complete(ticket, outcome.clone()) {
            Completion::Accepted => outcome.map_err(ApiError::Suggestions),
            Completion::Stale => Err(ApiError::Superseded),
        }
    }
}
