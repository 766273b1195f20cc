//! Project input model
//!
//! [`ProjectInput`] holds the five scoring inputs plus a display label.
//! Updates arrive as a [`ProjectPatch`] (typically straight from a form), where
//! numeric fields may be numbers or numeric strings and are coerced here.

use crate::error::ValidationError;
use crate::types::{EndOfLifeOption, EnergySource, Metal};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive upper bound of `rawMaterialPercentage`
pub const MAX_PERCENTAGE: u8 = 100;

/// Wizard inputs describing a metal product's lifecycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    /// User label, not used in computation
    pub project_name: String,
    /// Metal type
    pub metal: Metal,
    /// Virgin share of input material, 0..=100
    pub raw_material_percentage: u8,
    /// Manufacturing energy source
    pub energy_source: EnergySource,
    /// Transport distance in kilometers
    pub transport_distance: f64,
    /// End-of-life disposition
    pub end_of_life_option: EndOfLifeOption,
}

impl Default for ProjectInput {
    fn default() -> Self {
        Self {
            project_name: String::new(),
            metal: Metal::Aluminium,
            raw_material_percentage: 80,
            energy_source: EnergySource::Grid,
            transport_distance: 500.0,
            end_of_life_option: EndOfLifeOption::Recycle,
        }
    }
}

impl ProjectInput {
    /// Input seeded with the documented defaults
    #[inline]
    #[must_use]
    pub fn create() -> Self {
        Self::default()
    }

    /// With project name
    #[inline]
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = name.into();
        self
    }

    /// Recycled share of input material
    #[inline]
    #[must_use]
    pub fn recycled_percentage(&self) -> u8 {
        MAX_PERCENTAGE.saturating_sub(self.raw_material_percentage)
    }

    /// Merge `patch` into a copy of this input
    ///
    /// # Errors
    /// Returns the first field that fails coercion or domain checks; `self` is
    /// never modified.
    pub fn update(&self, patch: ProjectPatch) -> Result<Self, ValidationError> {
        let mut next = self.clone();
        if let Some(name) = patch.project_name {
            next.project_name = name;
        }
        if let Some(metal) = patch.metal {
            next.metal = metal.parse()?;
        }
        if let Some(raw) = patch.raw_material_percentage {
            next.raw_material_percentage = raw.percentage()?;
        }
        if let Some(source) = patch.energy_source {
            next.energy_source = source.parse()?;
        }
        if let Some(distance) = patch.transport_distance {
            next.transport_distance = distance.distance()?;
        }
        if let Some(option) = patch.end_of_life_option {
            next.end_of_life_option = option.parse()?;
        }
        Ok(next)
    }

    /// Check every field against its domain
    ///
    /// # Errors
    /// [`ValidationError`] describing the first offending field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.project_name.trim().is_empty() {
            return Err(ValidationError::EmptyProjectName);
        }
        if self.raw_material_percentage > MAX_PERCENTAGE {
            return Err(ValidationError::OutOfRange {
                field: "rawMaterialPercentage",
                value: f64::from(self.raw_material_percentage),
                expected: "0..=100",
            });
        }
        check_distance(self.transport_distance)?;
        Ok(())
    }

    /// Strictly decode a submitted input
    ///
    /// Every field must be present; numeric fields follow the same coercion
    /// rules as [`ProjectInput::update`].
    ///
    /// # Errors
    /// [`ValidationError`] for malformed JSON, missing or out-of-domain fields.
    pub fn from_json(value: serde_json::Value) -> Result<Self, ValidationError> {
        let patch: ProjectPatch = serde_json::from_value(value)?;
        let input = patch.into_input()?;
        input.validate()?;
        Ok(input)
    }

    /// [`ProjectInput::from_json`] over raw text
    ///
    /// # Errors
    /// See [`ProjectInput::from_json`].
    pub fn from_json_str(raw: &str) -> Result<Self, ValidationError> {
        let value: serde_json::Value = serde_json::from_str(raw)?;
        Self::from_json(value)
    }
}

fn check_distance(value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::InvalidNumber {
            field: "transportDistance",
            value: value.to_string(),
        });
    }
    if value < 0.0 {
        return Err(ValidationError::OutOfRange {
            field: "transportDistance",
            value,
            expected: ">= 0",
        });
    }
    Ok(value)
}

/// Numeric form value: a JSON number or a numeric string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    /// Already numeric
    Number(f64),
    /// Text to coerce
    Text(String),
}

impl NumericInput {
    fn coerce(&self, field: &'static str) -> Result<f64, ValidationError> {
        let value = match self {
            NumericInput::Number(n) => *n,
            NumericInput::Text(text) => {
                text.trim()
                    .parse::<f64>()
                    .map_err(|_| ValidationError::InvalidNumber {
                        field,
                        value: text.clone(),
                    })?
            }
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(ValidationError::InvalidNumber {
                field,
                value: self.to_string(),
            })
        }
    }

    fn percentage(&self) -> Result<u8, ValidationError> {
        const FIELD: &str = "rawMaterialPercentage";
        let value = self.coerce(FIELD)?;
        if !(0.0..=f64::from(MAX_PERCENTAGE)).contains(&value) {
            return Err(ValidationError::OutOfRange {
                field: FIELD,
                value,
                expected: "0..=100",
            });
        }
        if value.fract() != 0.0 {
            return Err(ValidationError::InvalidNumber {
                field: FIELD,
                value: self.to_string(),
            });
        }
        // range checked above
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Ok(value as u8)
    }

    fn distance(&self) -> Result<f64, ValidationError> {
        check_distance(self.coerce("transportDistance")?)
    }
}

impl fmt::Display for NumericInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericInput::Number(n) => write!(f, "{n}"),
            NumericInput::Text(text) => f.write_str(text),
        }
    }
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        NumericInput::Number(value)
    }
}

impl From<u32> for NumericInput {
    fn from(value: u32) -> Self {
        NumericInput::Number(f64::from(value))
    }
}

impl From<&str> for NumericInput {
    fn from(value: &str) -> Self {
        NumericInput::Text(value.to_string())
    }
}

/// Partial field set merged by [`ProjectInput::update`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    /// New project name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    /// New metal, as text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metal: Option<String>,
    /// New raw material percentage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_material_percentage: Option<NumericInput>,
    /// New energy source, as text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_source: Option<String>,
    /// New transport distance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport_distance: Option<NumericInput>,
    /// New end-of-life option, as text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_of_life_option: Option<String>,
}

impl ProjectPatch {
    /// Empty patch
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With project name
    #[must_use]
    pub fn project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = Some(name.into());
        self
    }

    /// With metal
    #[must_use]
    pub fn metal(mut self, metal: impl Into<String>) -> Self {
        self.metal = Some(metal.into());
        self
    }

    /// With raw material percentage
    #[must_use]
    pub fn raw_material_percentage(mut self, value: impl Into<NumericInput>) -> Self {
        self.raw_material_percentage = Some(value.into());
        self
    }

    /// With energy source
    #[must_use]
    pub fn energy_source(mut self, source: impl Into<String>) -> Self {
        self.energy_source = Some(source.into());
        self
    }

    /// With transport distance
    #[must_use]
    pub fn transport_distance(mut self, value: impl Into<NumericInput>) -> Self {
        self.transport_distance = Some(value.into());
        self
    }

    /// With end-of-life option
    #[must_use]
    pub fn end_of_life_option(mut self, option: impl Into<String>) -> Self {
        self.end_of_life_option = Some(option.into());
        self
    }

    /// Whether no field is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Build a complete input, requiring every field
    fn into_input(self) -> Result<ProjectInput, ValidationError> {
        let project_name = self
            .project_name
            .ok_or(ValidationError::MissingField("projectName"))?;
        let metal = self.metal.ok_or(ValidationError::MissingField("metal"))?;
        let raw = self
            .raw_material_percentage
            .ok_or(ValidationError::MissingField("rawMaterialPercentage"))?;
        let source = self
            .energy_source
            .ok_or(ValidationError::MissingField("energySource"))?;
        let distance = self
            .transport_distance
            .ok_or(ValidationError::MissingField("transportDistance"))?;
        let option = self
            .end_of_life_option
            .ok_or(ValidationError::MissingField("endOfLifeOption"))?;

        Ok(ProjectInput {
            project_name,
            metal: metal.parse()?,
            raw_material_percentage: raw.percentage()?,
            energy_source: source.parse()?,
            transport_distance: distance.distance()?,
            end_of_life_option: option.parse()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn create_uses_documented_defaults() {
        let input = ProjectInput::create();
        assert_eq!(input.project_name, "");
        assert_eq!(input.metal, Metal::Aluminium);
        assert_eq!(input.raw_material_percentage, 80);
        assert_eq!(input.energy_source, EnergySource::Grid);
        assert_eq!(input.transport_distance, 500.0);
        assert_eq!(input.end_of_life_option, EndOfLifeOption::Recycle);
        assert_eq!(input.recycled_percentage(), 20);
    }

    #[test]
    fn update_coerces_numeric_strings() {
        let input = ProjectInput::create()
            .update(
                ProjectPatch::new()
                    .raw_material_percentage("35")
                    .transport_distance(" 1200.5 "),
            )
            .unwrap();
        assert_eq!(input.raw_material_percentage, 35);
        assert_eq!(input.transport_distance, 1200.5);
    }

    #[test]
    fn update_rejects_out_of_range_percentage() {
        let err = ProjectInput::create()
            .update(ProjectPatch::new().raw_material_percentage(150u32))
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::OutOfRange {
                field: "rawMaterialPercentage",
                ..
            }
        ));
    }

    #[test]
    fn update_rejects_non_finite_and_garbage() {
        let base = ProjectInput::create();
        assert!(base
            .update(ProjectPatch::new().transport_distance(f64::INFINITY))
            .is_err());
        assert!(base
            .update(ProjectPatch::new().transport_distance("far"))
            .is_err());
        assert!(base
            .update(ProjectPatch::new().raw_material_percentage(f64::NAN))
            .is_err());
        assert!(base
            .update(ProjectPatch::new().raw_material_percentage("12.5"))
            .is_err());
        assert!(base
            .update(ProjectPatch::new().transport_distance(-1.0))
            .is_err());
    }

    #[test]
    fn failed_update_leaves_original_untouched() {
        let base = ProjectInput::create().with_name("Wire");
        let before = base.clone();
        let result = base.update(
            ProjectPatch::new()
                .metal("copper")
                .end_of_life_option("compost"),
        );
        assert!(result.is_err());
        assert_eq!(base, before);
    }

    #[test]
    fn update_parses_enums() {
        let input = ProjectInput::create()
            .update(
                ProjectPatch::new()
                    .metal("copper")
                    .energy_source("solar")
                    .end_of_life_option("landfill"),
            )
            .unwrap();
        assert_eq!(input.metal, Metal::Copper);
        assert_eq!(input.energy_source, EnergySource::Solar);
        assert_eq!(input.end_of_life_option, EndOfLifeOption::Landfill);
    }

    #[test]
    fn validate_requires_name() {
        assert_eq!(
            ProjectInput::create().with_name("   ").validate(),
            Err(ValidationError::EmptyProjectName)
        );
        assert!(ProjectInput::create().with_name("Rod").validate().is_ok());
    }

    #[test]
    fn from_json_accepts_complete_input() {
        let input = ProjectInput::from_json(json!({
            "projectName": "Cable",
            "metal": "copper",
            "rawMaterialPercentage": 40,
            "energySource": "wind",
            "transportDistance": "250",
            "endOfLifeOption": "reuse"
        }))
        .unwrap();
        assert_eq!(input.raw_material_percentage, 40);
        assert_eq!(input.transport_distance, 250.0);
        assert_eq!(input.energy_source, EnergySource::Wind);
    }

    #[test]
    fn from_json_reports_missing_field() {
        let err = ProjectInput::from_json(json!({
            "projectName": "Cable",
            "metal": "copper",
            "rawMaterialPercentage": 40,
            "energySource": "wind",
            "endOfLifeOption": "reuse"
        }))
        .unwrap_err();
        assert_eq!(err, ValidationError::MissingField("transportDistance"));
    }

    #[test]
    fn from_json_rejects_compost() {
        let err = ProjectInput::from_json(json!({
            "projectName": "Cable",
            "metal": "copper",
            "rawMaterialPercentage": 40,
            "energySource": "wind",
            "transportDistance": 10,
            "endOfLifeOption": "compost"
        }))
        .unwrap_err();
        assert_eq!(err.field(), Some("endOfLifeOption"));
    }

    #[test]
    fn serde_uses_camel_case() {
        let value = serde_json::to_value(ProjectInput::create().with_name("x")).unwrap();
        assert_eq!(value["rawMaterialPercentage"], json!(80));
        assert_eq!(value["endOfLifeOption"], json!("recycle"));
    }
}
