//! Request and response shapes exchanged with advisory consumers
//!
//! Requests carry every result-derived field the narrative needs, so nothing
//! is recomputed remotely. Responses are opaque text blocks plus, for quick
//! tips, the parsed three-item list.

use crate::error::AdvisoryError;
use lca_core::{CircularFlowData, EnvironmentalImpacts, ImpactResult, ProjectInput};
use serde::{Deserialize, Serialize};

/// Number of quick tips returned
pub const TIP_COUNT: usize = 3;

/// Body of a `1. tip` or `1) tip` line
fn numbered_item(line: &str) -> Option<&str> {
    let line = line.trim();
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = line[digits..].strip_prefix(['.', ')'])?.trim();
    (!rest.is_empty()).then_some(rest)
}

/// Insight request: the full scored result minus identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisoryRequest {
    /// Originating input
    pub project_data: ProjectInput,
    /// All four metrics
    pub environmental_impacts: EnvironmentalImpacts,
    /// Flow graph and circularity score
    pub circular_flow_data: CircularFlowData,
}

impl AdvisoryRequest {
    /// Request grounded on a stored result
    #[must_use]
    pub fn from_result(result: &ImpactResult) -> Self {
        Self {
            project_data: result.project_data.clone(),
            environmental_impacts: result.environmental_impacts.clone(),
            circular_flow_data: result.circular_flow_data.clone(),
        }
    }
}

/// Quick-tips request: inputs only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TipsRequest {
    /// Draft or submitted input
    pub project_data: ProjectInput,
}

/// Narrative advisory text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insights {
    /// Sectioned free text
    pub text: String,
}

/// Exactly three short optimization tips
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickTips {
    tips: Vec<String>,
}

impl QuickTips {
    /// Parse generated text, keeping the first three numbered lines
    ///
    /// # Errors
    /// [`AdvisoryError::MalformedResponse`] when fewer than three numbered
    /// lines are present.
    pub fn parse(text: &str) -> Result<Self, AdvisoryError> {
        let tips: Vec<String> = text
            .lines()
            .filter_map(numbered_item)
            .map(str::to_string)
            .take(TIP_COUNT)
            .collect();

        if tips.len() < TIP_COUNT {
            return Err(AdvisoryError::MalformedResponse(format!(
                "expected {TIP_COUNT} numbered tips, found {}",
                tips.len()
            )));
        }
        Ok(Self { tips })
    }

    /// The tips in order
    #[inline]
    #[must_use]
    pub fn tips(&self) -> &[String] {
        &self.tips
    }

    /// Render as three numbered lines
    #[must_use]
    pub fn to_numbered_text(&self) -> String {
        self.tips
            .iter()
            .enumerate()
            .map(|(i, tip)| format!("{}. {tip}", i + 1))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// `{success: true, insights}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightsResponse {
    /// Always `true`
    pub success: bool,
    /// Narrative text
    pub insights: String,
}

impl From<Insights> for InsightsResponse {
    fn from(insights: Insights) -> Self {
        Self {
            success: true,
            insights: insights.text,
        }
    }
}

/// `{success: true, suggestions, tips}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionsResponse {
    /// Always `true`
    pub success: bool,
    /// Exactly three numbered lines
    pub suggestions: String,
    /// The same tips as a list
    pub tips: Vec<String>,
}

impl From<QuickTips> for SuggestionsResponse {
    fn from(tips: QuickTips) -> Self {
        Self {
            success: true,
            suggestions: tips.to_numbered_text(),
            tips: tips.tips,
        }
    }
}

/// `{error, details?, fallback?}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisoryFailure {
    /// Short error summary
    pub error: String,
    /// Underlying cause
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// User-safe replacement text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
}

impl AdvisoryFailure {
    /// Failure body for the insights endpoint
    #[must_use]
    pub fn insights(err: &AdvisoryError) -> Self {
        Self {
            error: summary(err, "Failed to generate AI insights"),
            details: Some(err.to_string()),
            fallback: Some(err.fallback_message().to_string()),
        }
    }

    /// Failure body for the suggestions endpoint
    #[must_use]
    pub fn suggestions(err: &AdvisoryError) -> Self {
        Self {
            error: summary(err, "Failed to generate suggestions"),
            details: Some(err.to_string()),
            fallback: None,
        }
    }
}

fn summary(err: &AdvisoryError, generic: &str) -> String {
    match err {
        AdvisoryError::MissingCredential => "Google Gemini API key not configured".to_string(),
        _ => generic.to_string(),
    }
}
