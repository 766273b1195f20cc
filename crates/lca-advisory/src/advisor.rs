//! Advisor: prompt building, generation and response shaping

use crate::contract::{AdvisoryRequest, Insights, QuickTips, TipsRequest};
use crate::error::AdvisoryError;
use crate::generator::{GenerationSettings, TextGenerator};
use crate::prompt::{insights_prompt, tips_prompt};
use std::sync::Arc;

/// Default model for insights
pub const DEFAULT_INSIGHTS_MODEL: &str = "gemini-2.0-flash";
/// Default model for quick tips
pub const DEFAULT_TIPS_MODEL: &str = "gemini-1.5-flash";

/// Narrative advisory over any [`TextGenerator`]
pub struct Advisor {
    generator: Arc<dyn TextGenerator>,
    insights_settings: GenerationSettings,
    tips_settings: GenerationSettings,
}

impl std::fmt::Debug for Advisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Advisor")
            .field("insights_model", &self.insights_settings.model)
            .field("tips_model", &self.tips_settings.model)
            .finish_non_exhaustive()
    }
}

impl Advisor {
    /// Advisor using the default models
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self::with_models(generator, DEFAULT_INSIGHTS_MODEL, DEFAULT_TIPS_MODEL)
    }

    /// Advisor with explicit model names
    pub fn with_models(
        generator: Arc<dyn TextGenerator>,
        insights_model: impl Into<String>,
        tips_model: impl Into<String>,
    ) -> Self {
        Self {
            generator,
            insights_settings: GenerationSettings::insights(insights_model),
            tips_settings: GenerationSettings::tips(tips_model),
        }
    }

    /// Sectioned narrative grounded on a scored result
    ///
    /// # Errors
    /// Any [`AdvisoryError`]; callers keep showing the result and offer retry.
    pub async fn insights(&self, request: &AdvisoryRequest) -> Result<Insights, AdvisoryError> {
        let prompt = insights_prompt(request);
        match self.generator.generate(&prompt, &self.insights_settings).await {
            Ok(text) => {
                let text = text.trim().to_string();
                if text.is_empty() {
                    return Err(AdvisoryError::MalformedResponse("empty insights".to_string()));
                }
                tracing::info!(
                    project = %request.project_data.project_name,
                    len = text.len(),
                    "Generated insights"
                );
                Ok(Insights { text })
            }
            Err(e) => {
                tracing::warn!(error = %e, retryable = e.is_retryable(), "Insights generation failed");
                Err(e)
            }
        }
    }

    /// Three quick tips for a draft or submitted input
    ///
    /// # Errors
    /// Any [`AdvisoryError`], including [`AdvisoryError::MalformedResponse`]
    /// when fewer than three numbered tips come back.
    pub async fn quick_tips(&self, request: &TipsRequest) -> Result<QuickTips, AdvisoryError> {
        let prompt = tips_prompt(request);
        let result = self
            .generator
            .generate(&prompt, &self.tips_settings)
            .await
            .and_then(|text| QuickTips::parse(&text));

        if let Err(e) = &result {
            tracing::warn!(error = %e, retryable = e.is_retryable(), "Quick tips generation failed");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mockall::mock;
    use pretty_assertions::assert_eq;

    mock! {
        Generator {}

        #[async_trait]
        impl TextGenerator for Generator {
            async fn generate(&self, prompt: &str, settings: &GenerationSettings) -> Result<String, AdvisoryError>;
        }
    }

    fn request() -> AdvisoryRequest {
        AdvisoryRequest::from_result(&lca_test_utils::sample_result(7))
    }

    #[tokio::test]
    async fn insights_use_insights_model() {
        let mut mock = MockGenerator::new();
        mock.expect_generate()
            .withf(|prompt, settings| {
                settings.model == DEFAULT_INSIGHTS_MODEL
                    && settings.max_output_tokens == 1024
                    && prompt.contains("CIRCULARITY SCORE")
            })
            .times(1)
            .returning(|_, _| Ok("  1. Environmental Assessment: fine\n".to_string()));

        let advisor = Advisor::new(Arc::new(mock));
        let insights = advisor.insights(&request()).await.unwrap();
        assert_eq!(insights.text, "1. Environmental Assessment: fine");
    }

    #[tokio::test]
    async fn whitespace_insights_are_malformed() {
        let mut mock = MockGenerator::new();
        mock.expect_generate()
            .returning(|_, _| Ok("   \n".to_string()));

        let advisor = Advisor::new(Arc::new(mock));
        let err = advisor.insights(&request()).await.unwrap_err();
        assert!(matches!(err, AdvisoryError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn insights_error_propagates() {
        let mut mock = MockGenerator::new();
        mock.expect_generate()
            .returning(|_, _| Err(AdvisoryError::MissingCredential));

        let advisor = Advisor::new(Arc::new(mock));
        assert_eq!(
            advisor.insights(&request()).await.unwrap_err(),
            AdvisoryError::MissingCredential
        );
    }

    #[tokio::test]
    async fn quick_tips_are_parsed() {
        let mut mock = MockGenerator::new();
        mock.expect_generate()
            .withf(|_, settings| settings.model == "tips-model" && settings.max_output_tokens == 512)
            .times(1)
            .returning(|_, _| Ok("1. Use scrap\n2. Switch to wind\n3. Ship by rail".to_string()));

        let advisor = Advisor::with_models(Arc::new(mock), "insights-model", "tips-model");
        let tips = advisor
            .quick_tips(&TipsRequest {
                project_data: lca_test_utils::sample_input(),
            })
            .await
            .unwrap();
        assert_eq!(tips.tips(), ["Use scrap", "Switch to wind", "Ship by rail"]);
    }

    #[tokio::test]
    async fn two_tips_are_malformed() {
        let mut mock = MockGenerator::new();
        mock.expect_generate()
            .returning(|_, _| Ok("1. Use scrap\n2. Switch to wind".to_string()));

        let advisor = Advisor::new(Arc::new(mock));
        let err = advisor
            .quick_tips(&TipsRequest {
                project_data: lca_test_utils::sample_input(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AdvisoryError::MalformedResponse(_)));
    }
}
