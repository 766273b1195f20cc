//! Testing utilities for the LCA workspace
//!
//! Shared fixtures for inputs and scored results.

#![allow(missing_docs)]

use chrono::{TimeZone, Utc};
use lca_core::{
    EndOfLifeOption, EnergySource, ImpactResult, Metal, ProjectId, ProjectInput, ScoringEngine,
};

pub fn sample_input() -> ProjectInput {
    ProjectInput::create().with_name("Test Extrusion")
}

pub fn copper_solar_input() -> ProjectInput {
    ProjectInput {
        project_name: "Recycled Copper Busbar".to_string(),
        metal: Metal::Copper,
        raw_material_percentage: 0,
        energy_source: EnergySource::Solar,
        transport_distance: 1000.0,
        end_of_life_option: EndOfLifeOption::Recycle,
    }
}

pub fn seeded_engine(seed: u64) -> ScoringEngine {
    ScoringEngine::seeded(seed)
}

/// Scored [`sample_input`] with a fixed timestamp
pub fn sample_result(seed: u64) -> ImpactResult {
    let millis = 1_760_000_000_000 + i64::try_from(seed).unwrap_or(0);
    sample_result_with_id(seed, ProjectId::from_millis(millis))
}

pub fn sample_result_with_id(seed: u64, id: ProjectId) -> ImpactResult {
    let mut result = seeded_engine(seed).score(&sample_input()).unwrap();
    result.project_id = id;
    result.timestamp = Utc.with_ymd_and_hms(2026, 10, 14, 12, 0, 0).unwrap();
    result
}
