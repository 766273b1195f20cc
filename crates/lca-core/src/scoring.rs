//! Scoring engine
//!
//! Closed-form transform from a [`ProjectInput`] to an [`ImpactResult`]:
//! - four impact metrics with threshold ratings
//! - circularity score keyed on the end-of-life option
//! - four-stage material flow graph
//! - four ordered recommendations
//!
//! Everything is deterministic except `wasteGeneration`, which is drawn from an
//! injected random source so tests can fix the seed.

use crate::error::ValidationError;
use crate::id::IdGenerator;
use crate::project::ProjectInput;
use crate::types::{
    CircularFlowData, EndOfLifeOption, EnergySource, EnvironmentalImpacts, ImpactMetric,
    ImpactResult, MaterialFlowStage, Metal, Rating, Stage,
};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::sync::Arc;

/// Carbon footprint above this is rated high
pub const CARBON_HIGH_THRESHOLD: f64 = 10.0;
/// Water usage above this is rated high
pub const WATER_HIGH_THRESHOLD: f64 = 1000.0;
/// Energy consumption above this is rated high
pub const ENERGY_HIGH_THRESHOLD: f64 = 35.0;

/// Lower bound of the waste draw (inclusive)
pub const WASTE_MIN_KG: f64 = 1.0;
/// Upper bound of the waste draw (exclusive before rounding)
pub const WASTE_MAX_KG: f64 = 6.0;

/// Ceiling for the recycled-content recommendation
const RECOMMENDED_CONTENT_CAP: u8 = 95;
/// Step added to the current share in the recycled-content recommendation
const RECOMMENDED_CONTENT_STEP: u8 = 20;

/// Per-metal base factors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetalProfile {
    /// kg CO2-eq factor
    pub base_emissions: f64,
    /// liters factor
    pub base_water: f64,
    /// MJ factor
    pub base_energy: f64,
}

impl Metal {
    /// Base factors for this metal
    #[must_use]
    pub fn profile(&self) -> MetalProfile {
        match self {
            Metal::Aluminium => MetalProfile {
                base_emissions: 12.5,
                base_water: 1500.0,
                base_energy: 45.0,
            },
            Metal::Copper => MetalProfile {
                base_emissions: 8.3,
                base_water: 900.0,
                base_energy: 28.0,
            },
        }
    }
}

impl EnergySource {
    /// Multiplier applied to emissions and energy
    #[inline]
    #[must_use]
    pub fn factor(&self) -> f64 {
        match self {
            EnergySource::Grid => 1.0,
            EnergySource::Solar | EnergySource::Wind => 0.3,
        }
    }
}

impl EndOfLifeOption {
    /// Circularity score in percent
    #[inline]
    #[must_use]
    pub fn circularity_score(&self) -> u8 {
        match self {
            EndOfLifeOption::Recycle => 75,
            EndOfLifeOption::Reuse => 85,
            EndOfLifeOption::Landfill => 15,
        }
    }
}

/// Round half away from zero to `decimals` places
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// Intermediate factors derived from an input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Factors {
    /// Recycled share as a fraction
    pub recycling: f64,
    /// Energy multiplier
    pub energy: f64,
    /// Transport distance in thousands of km
    pub transport: f64,
}

impl Factors {
    /// Factors for `input`
    #[must_use]
    pub fn of(input: &ProjectInput) -> Self {
        Self {
            recycling: f64::from(input.recycled_percentage()) / 100.0,
            energy: input.energy_source.factor(),
            transport: input.transport_distance / 1000.0,
        }
    }
}

fn threshold(value: f64, limit: f64, below: Rating) -> Rating {
    if value > limit {
        Rating::High
    } else {
        below
    }
}

/// Turns project inputs into impact results
#[derive(Debug)]
pub struct ScoringEngine<R = StdRng> {
    rng: R,
    ids: Arc<IdGenerator>,
}

impl ScoringEngine<StdRng> {
    /// Engine with an OS-seeded generator
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Engine with a fixed seed
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: RngCore> ScoringEngine<R> {
    /// Engine over `rng` with a fresh id generator
    #[must_use]
    pub fn new(rng: R) -> Self {
        Self::with_ids(rng, Arc::new(IdGenerator::new()))
    }

    /// Engine over `rng` sharing an existing id generator
    #[must_use]
    pub fn with_ids(rng: R, ids: Arc<IdGenerator>) -> Self {
        Self { rng, ids }
    }

    /// Id generator used for new results
    #[inline]
    #[must_use]
    pub fn ids(&self) -> &Arc<IdGenerator> {
        &self.ids
    }

    /// Validate `input` and derive a complete result
    ///
    /// # Errors
    /// [`ValidationError`] when any input field is out of its domain.
    pub fn score(&mut self, input: &ProjectInput) -> Result<ImpactResult, ValidationError> {
        input.validate()?;

        let environmental_impacts = self.impacts(input);
        let result = ImpactResult {
            project_id: self.ids.next_id(),
            timestamp: Utc::now(),
            project_data: input.clone(),
            environmental_impacts,
            recommendations: recommendations(input),
            circular_flow_data: circular_flow(input),
        };

        tracing::debug!(
            project_id = %result.project_id,
            metal = %input.metal,
            carbon = result.environmental_impacts.carbon_footprint.value,
            "Scored project"
        );
        Ok(result)
    }

    /// Impact metrics for `input`
    pub fn impacts(&mut self, input: &ProjectInput) -> EnvironmentalImpacts {
        let profile = input.metal.profile();
        let factors = Factors::of(input);

        let carbon = round_to(
            profile.base_emissions * (1.0 - factors.recycling * 0.6) * factors.energy
                + factors.transport * 0.5,
            2,
        );
        let water = round_to(profile.base_water * (1.0 - factors.recycling * 0.4), 0);
        let energy = round_to(profile.base_energy * factors.energy, 1);
        let waste = round_to(self.rng.gen_range(WASTE_MIN_KG..WASTE_MAX_KG), 1);

        EnvironmentalImpacts {
            carbon_footprint: ImpactMetric::new(
                carbon,
                "kg CO2-eq",
                threshold(carbon, CARBON_HIGH_THRESHOLD, Rating::Moderate),
            ),
            water_usage: ImpactMetric::new(
                water,
                "liters",
                threshold(water, WATER_HIGH_THRESHOLD, Rating::Low),
            ),
            energy_consumption: ImpactMetric::new(
                energy,
                "MJ",
                threshold(energy, ENERGY_HIGH_THRESHOLD, Rating::Moderate),
            ),
            waste_generation: ImpactMetric::new(waste, "kg", Rating::Low),
        }
    }
}

/// Material flow graph and circularity score for `input`
#[must_use]
pub fn circular_flow(input: &ProjectInput) -> CircularFlowData {
    let raw = f64::from(input.raw_material_percentage);
    let manufactured = raw * 0.95;
    let used = raw * 0.9;
    let recovered = match input.end_of_life_option {
        EndOfLifeOption::Recycle => raw * 0.8,
        EndOfLifeOption::Reuse | EndOfLifeOption::Landfill => 0.0,
    };

    let material_flow = vec![
        MaterialFlowStage {
            stage: Stage::RawMaterial,
            input: raw,
            output: raw,
        },
        MaterialFlowStage {
            stage: Stage::Manufacturing,
            input: raw,
            output: manufactured,
        },
        MaterialFlowStage {
            stage: Stage::UsePhase,
            input: manufactured,
            output: used,
        },
        MaterialFlowStage {
            stage: Stage::EndOfLife,
            input: used,
            output: recovered,
        },
    ];

    CircularFlowData {
        material_flow,
        circularity_score: input.end_of_life_option.circularity_score(),
    }
}

/// Ordered recommendations for `input`
#[must_use]
pub fn recommendations(input: &ProjectInput) -> Vec<String> {
    let target = input
        .raw_material_percentage
        .saturating_add(RECOMMENDED_CONTENT_STEP)
        .min(RECOMMENDED_CONTENT_CAP);
    let energy = if input.energy_source.is_renewable() {
        "Continue using renewable energy sources"
    } else {
        "Switch to renewable energy sources for manufacturing"
    };

    vec![
        format!("Increase recycled content to {target}% to reduce carbon footprint"),
        energy.to_string(),
        "Optimize transport routes to reduce emissions".to_string(),
        "Implement circular design principles for better end-of-life recovery".to_string(),
    ]
}
