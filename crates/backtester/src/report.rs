//! Markdown backtest report.

use std::fmt::Write;

use fico_core::types::RiskTier;

use crate::agents::SampleAgent;
use crate::error::Result;
use crate::runner::{
    default_weight_variations, describe_weights, percent, BacktestRunner, BacktestSummary,
    SensitivityAnalysis,
};

const TIERS: [RiskTier; 5] = [
    RiskTier::Excellent,
    RiskTier::Good,
    RiskTier::Average,
    RiskTier::BelowAverage,
    RiskTier::Poor,
];

/// Backtest `agents` with the runner's weights, compare the default
/// variations and render both as markdown.
pub fn generate_report(runner: &BacktestRunner, agents: &[SampleAgent]) -> Result<String> {
    let summary = runner.run_backtest(agents);
    let sensitivity = runner.analyze_weight_sensitivity(agents, &default_weight_variations()?)?;
    Ok(render(&summary, &sensitivity))
}

fn render(summary: &BacktestSummary, sensitivity: &SensitivityAnalysis) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(out, "# AgentFICO Backtest Report\n");
    let _ = writeln!(out, "## Summary");
    let _ = writeln!(out, "- Total agents: {}", summary.total_agents);
    let _ = writeln!(out, "- Prediction accuracy: {}", percent(summary.accuracy, 1));
    let _ = writeln!(out, "- Average score: {:.0}", summary.avg_score);
    let _ = writeln!(
        out,
        "- Score range: {} - {}",
        summary.min_score, summary.max_score
    );
    let _ = writeln!(out, "- Standard deviation: {:.1}\n", summary.score_std);

    let _ = writeln!(out, "## Score Distribution");
    let _ = writeln!(out, "| Tier | Count |");
    let _ = writeln!(out, "|------|-------|");
    for tier in TIERS {
        let _ = writeln!(out, "| {} | {} |", tier_label(tier), summary.tier_count(tier));
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "## Individual Results");
    let _ = writeln!(out, "| Agent ID | Expected | Actual | Score | Match |");
    let _ = writeln!(out, "|----------|----------|--------|-------|-------|");
    for result in &summary.results {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            result.agent_id,
            tier_label(result.expected_tier),
            tier_label(result.actual_tier),
            result.overall_score,
            if result.is_correct { "✓" } else { "✗" },
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "## Weight Sensitivity");
    for variation in &sensitivity.variations {
        let _ = writeln!(
            out,
            "- {} → accuracy {}, average {:.0}",
            describe_weights(&variation.weights),
            percent(variation.accuracy, 1),
            variation.avg_score,
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "## Conclusion");
    let _ = writeln!(out, "{}", sensitivity.recommendation);

    out
}

fn tier_label(tier: RiskTier) -> String {
    tier.name().to_uppercase()
}
