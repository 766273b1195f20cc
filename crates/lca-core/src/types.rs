//! Core types for lifecycle assessments
//!
//! Defines:
//! - Input enums (metal, energy source, end-of-life option)
//! - Impact metrics and their ratings
//! - Material flow stages and circularity data
//! - The immutable [`ImpactResult`]

use crate::error::ValidationError;
use crate::id::ProjectId;
use crate::project::ProjectInput;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Parse a lowercase enum name, trimming whitespace and ignoring ASCII case
fn normalise(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

/// Metal the product is made of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metal {
    /// Aluminium
    #[default]
    Aluminium,
    /// Copper
    Copper,
}

impl Metal {
    /// All supported metals
    pub const ALL: [Metal; 2] = [Metal::Aluminium, Metal::Copper];

    /// Wire name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Metal::Aluminium => "aluminium",
            Metal::Copper => "copper",
        }
    }
}

impl FromStr for Metal {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise(s).as_str() {
            "aluminium" => Ok(Metal::Aluminium),
            "copper" => Ok(Metal::Copper),
            _ => Err(ValidationError::unknown("metal", s)),
        }
    }
}

impl fmt::Display for Metal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Energy source used during manufacturing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergySource {
    /// Mixed grid electricity
    #[default]
    Grid,
    /// Solar
    Solar,
    /// Wind
    Wind,
}

impl EnergySource {
    /// All supported energy sources
    pub const ALL: [EnergySource; 3] = [EnergySource::Grid, EnergySource::Solar, EnergySource::Wind];

    /// Wire name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EnergySource::Grid => "grid",
            EnergySource::Solar => "solar",
            EnergySource::Wind => "wind",
        }
    }

    /// Whether the source is renewable
    #[inline]
    #[must_use]
    pub fn is_renewable(&self) -> bool {
        !matches!(self, EnergySource::Grid)
    }
}

impl FromStr for EnergySource {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise(s).as_str() {
            "grid" => Ok(EnergySource::Grid),
            "solar" => Ok(EnergySource::Solar),
            "wind" => Ok(EnergySource::Wind),
            _ => Err(ValidationError::unknown("energySource", s)),
        }
    }
}

impl fmt::Display for EnergySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happens to the product at end of life
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndOfLifeOption {
    /// Material is recycled
    #[default]
    Recycle,
    /// Product is reused
    Reuse,
    /// Product goes to landfill
    Landfill,
}

impl EndOfLifeOption {
    /// All supported end-of-life options
    pub const ALL: [EndOfLifeOption; 3] = [
        EndOfLifeOption::Recycle,
        EndOfLifeOption::Reuse,
        EndOfLifeOption::Landfill,
    ];

    /// Wire name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EndOfLifeOption::Recycle => "recycle",
            EndOfLifeOption::Reuse => "reuse",
            EndOfLifeOption::Landfill => "landfill",
        }
    }
}

impl FromStr for EndOfLifeOption {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise(s).as_str() {
            "recycle" => Ok(EndOfLifeOption::Recycle),
            "reuse" => Ok(EndOfLifeOption::Reuse),
            "landfill" => Ok(EndOfLifeOption::Landfill),
            _ => Err(ValidationError::unknown("endOfLifeOption", s)),
        }
    }
}

impl fmt::Display for EndOfLifeOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Qualitative rating derived from a metric value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    /// Low impact
    Low,
    /// Moderate impact
    Moderate,
    /// High impact
    High,
}

impl Rating {
    /// Wire name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Low => "low",
            Rating::Moderate => "moderate",
            Rating::High => "high",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single environmental impact figure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactMetric {
    /// Magnitude
    pub value: f64,
    /// Unit label
    pub unit: String,
    /// Rating derived from `value`
    pub rating: Rating,
}

impl ImpactMetric {
    /// Create a metric
    #[inline]
    #[must_use]
    pub fn new(value: f64, unit: impl Into<String>, rating: Rating) -> Self {
        Self {
            value,
            unit: unit.into(),
            rating,
        }
    }
}

/// Identifies one of the four impact metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    /// Greenhouse gas emissions
    CarbonFootprint,
    /// Water consumed
    WaterUsage,
    /// Energy consumed
    EnergyConsumption,
    /// Waste produced
    WasteGeneration,
}

impl MetricKind {
    /// All metrics in display order
    pub const ALL: [MetricKind; 4] = [
        MetricKind::CarbonFootprint,
        MetricKind::WaterUsage,
        MetricKind::EnergyConsumption,
        MetricKind::WasteGeneration,
    ];

    /// JSON key
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            MetricKind::CarbonFootprint => "carbonFootprint",
            MetricKind::WaterUsage => "waterUsage",
            MetricKind::EnergyConsumption => "energyConsumption",
            MetricKind::WasteGeneration => "wasteGeneration",
        }
    }

    /// Human-readable label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::CarbonFootprint => "Carbon Footprint",
            MetricKind::WaterUsage => "Water Usage",
            MetricKind::EnergyConsumption => "Energy Consumption",
            MetricKind::WasteGeneration => "Waste Generation",
        }
    }
}

/// The four impact metrics of a result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentalImpacts {
    /// kg CO2-eq
    pub carbon_footprint: ImpactMetric,
    /// liters
    pub water_usage: ImpactMetric,
    /// MJ
    pub energy_consumption: ImpactMetric,
    /// kg
    pub waste_generation: ImpactMetric,
}

impl EnvironmentalImpacts {
    /// Metric by kind
    #[must_use]
    pub fn get(&self, kind: MetricKind) -> &ImpactMetric {
        match kind {
            MetricKind::CarbonFootprint => &self.carbon_footprint,
            MetricKind::WaterUsage => &self.water_usage,
            MetricKind::EnergyConsumption => &self.energy_consumption,
            MetricKind::WasteGeneration => &self.waste_generation,
        }
    }

    /// Iterate metrics in display order
    pub fn iter(&self) -> impl Iterator<Item = (MetricKind, &ImpactMetric)> + '_ {
        MetricKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }
}

/// Lifecycle stage name in the material flow graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Material sourcing
    #[serde(rename = "Raw Material")]
    RawMaterial,
    /// Production
    #[serde(rename = "Manufacturing")]
    Manufacturing,
    /// Product in service
    #[serde(rename = "Use Phase")]
    UsePhase,
    /// Disposal
    #[serde(rename = "End of Life")]
    EndOfLife,
}

impl Stage {
    /// Stages in flow order
    pub const ORDER: [Stage; 4] = [
        Stage::RawMaterial,
        Stage::Manufacturing,
        Stage::UsePhase,
        Stage::EndOfLife,
    ];

    /// Display name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::RawMaterial => "Raw Material",
            Stage::Manufacturing => "Manufacturing",
            Stage::UsePhase => "Use Phase",
            Stage::EndOfLife => "End of Life",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One edge of the material flow graph
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialFlowStage {
    /// Stage
    pub stage: Stage,
    /// Quantity entering the stage
    pub input: f64,
    /// Quantity leaving the stage
    pub output: f64,
}

/// Material flow graph plus circularity score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircularFlowData {
    /// Stages in flow order
    pub material_flow: Vec<MaterialFlowStage>,
    /// Integer percentage
    pub circularity_score: u8,
}

impl CircularFlowData {
    /// Stage entry by name
    #[must_use]
    pub fn stage(&self, stage: Stage) -> Option<&MaterialFlowStage> {
        self.material_flow.iter().find(|s| s.stage == stage)
    }
}

/// Scored assessment, immutable once computed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactResult {
    /// Unique identifier
    pub project_id: ProjectId,
    /// Creation instant
    pub timestamp: DateTime<Utc>,
    /// Input that produced this result
    pub project_data: ProjectInput,
    /// Impact metrics
    pub environmental_impacts: EnvironmentalImpacts,
    /// Recommendations in display order
    pub recommendations: Vec<String>,
    /// Flow graph and circularity score
    pub circular_flow_data: CircularFlowData,
}
