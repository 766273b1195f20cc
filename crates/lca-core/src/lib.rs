//! LCA Core - project inputs, scoring and exports
//!
//! The computational core of the metal lifecycle assessment service:
//! - Validates and coerces wizard inputs
//! - Scores inputs into impact metrics, a circularity score and a material flow graph
//! - Issues unique, time-ordered result identifiers
//! - Projects results into JSON, CSV and text exports
//!
//! # Example
//!
//! ```rust
//! use lca_core::{ProjectInput, ProjectPatch, ScoringEngine};
//!
//! let input = ProjectInput::create()
//!     .update(ProjectPatch::new().project_name("Copper wire").metal("copper"))
//!     .unwrap();
//!
//! let mut engine = ScoringEngine::seeded(42);
//! let result = engine.score(&input).unwrap();
//! assert_eq!(result.circular_flow_data.circularity_score, 75);
//! ```

#![warn(unreachable_pub)]

pub mod error;
pub mod export;
pub mod id;
pub mod project;
pub mod scoring;
pub mod types;
pub mod wizard;

pub use error::ValidationError;
pub use export::{ExportDocument, ExportFormat, ProjectInfo};
pub use id::{IdGenerator, ProjectId};
pub use project::{NumericInput, ProjectInput, ProjectPatch};
pub use scoring::{circular_flow, recommendations, Factors, MetalProfile, ScoringEngine};
pub use types::{
    CircularFlowData, EndOfLifeOption, EnergySource, EnvironmentalImpacts, ImpactMetric,
    ImpactResult, MaterialFlowStage, Metal, MetricKind, Rating, Stage,
};
pub use wizard::{Wizard, WizardStep};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with LCA Core
    pub use crate::{
        ImpactResult, ProjectId, ProjectInput, ProjectPatch, ScoringEngine, ValidationError,
        Wizard,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
