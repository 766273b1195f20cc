//! Prompt templates
//!
//! The insight prompt restates every scored value so the remote model never
//! has to recompute anything.

use crate::contract::{AdvisoryRequest, TipsRequest, TIP_COUNT};
use lca_core::ProjectInput;
use std::fmt::Write as _;

fn project_lines(out: &mut String, input: &ProjectInput) {
    let _ = writeln!(out, "- Product: {}", input.project_name);
    let _ = writeln!(out, "- Metal: {}", input.metal);
    let _ = writeln!(out, "- Raw material: {}%", input.raw_material_percentage);
    let _ = writeln!(out, "- Recycled material: {}%", input.recycled_percentage());
    let _ = writeln!(out, "- Energy source: {}", input.energy_source);
    let _ = writeln!(out, "- Transport distance: {} km", input.transport_distance);
    let _ = writeln!(out, "- End of life: {}", input.end_of_life_option);
}

/// Prompt for the sectioned narrative
#[must_use]
pub fn insights_prompt(request: &AdvisoryRequest) -> String {
    let mut out = String::from(
        "You are an environmental consultant specialising in life cycle assessment of metal products.\n\
         Review the assessment below and write advisory notes.\n\n",
    );

    out.push_str("PROJECT\n");
    project_lines(&mut out, &request.project_data);

    out.push_str("\nIMPACTS\n");
    for (kind, metric) in request.environmental_impacts.iter() {
        let _ = writeln!(
            out,
            "- {}: {} {} ({})",
            kind.label(),
            metric.value,
            metric.unit,
            metric.rating
        );
    }

    out.push_str("\nMATERIAL FLOW\n");
    for stage in &request.circular_flow_data.material_flow {
        let _ = writeln!(out, "- {}: in {} / out {}", stage.stage, stage.input, stage.output);
    }
    let _ = writeln!(
        out,
        "\nCIRCULARITY SCORE: {}%",
        request.circular_flow_data.circularity_score
    );

    out.push_str(
        "\nRespond with these sections:\n\
         1. Environmental Assessment (2-3 sentences)\n\
         2. Key Strengths (3-4 bullets)\n\
         3. Priority Improvements (4-5 bullets with expected effect)\n\
         4. Sustainability Rating (1-10 with justification)\n\
         5. Future Outlook (2-3 sentences)\n",
    );
    out
}

/// Prompt for the short tip list
#[must_use]
pub fn tips_prompt(request: &TipsRequest) -> String {
    let mut out = String::from(
        "You are an environmental sustainability expert. Suggest quick optimizations for this project.\n\n",
    );
    project_lines(&mut out, &request.project_data);
    let _ = write!(
        out,
        "\nReply with exactly {TIP_COUNT} numbered lines (\"1. ...\"), each under 15 words, nothing else.\n"
    );
    out
}
