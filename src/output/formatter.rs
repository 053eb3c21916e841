use std::io::IsTerminal;

use owo_colors::OwoColorize;
use terminal_size::{terminal_size, Width};

use crate::rules::{RuleResult, RuleSummary, Severity};
use crate::scenario::ScenarioResult;
use crate::scoring::ScoringResult;
use crate::sensitivity::SensitivityReport;
use crate::simulate::MonteCarloSummary;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a 0-100 score with one decimal, colored by band when enabled.
pub fn format_score(score: f64, use_colors: bool) -> String {
    let text = format!("{:.1}", score);
    if !use_colors {
        return text;
    }
    if score >= 70.0 {
        text.green().bold().to_string()
    } else if score >= 40.0 {
        text.yellow().bold().to_string()
    } else {
        text.red().bold().to_string()
    }
}

/// Multi-line detail block for one scoring result.
pub fn format_scoring_result(
    business_id: &str,
    result: &ScoringResult,
    use_colors: bool,
) -> String {
    let mut out = String::new();

    let heading = format!(
        "{}  score {} / 100  (confidence {:.0}%)",
        business_id,
        format_score(result.score, use_colors),
        result.confidence * 100.0
    );
    if use_colors {
        out.push_str(&heading.bold().to_string());
    } else {
        out.push_str(&heading);
    }
    out.push('\n');

    for reason in &result.reasons {
        out.push_str(&format!("  + {}\n", reason));
    }
    for warning in &result.warnings {
        if use_colors {
            out.push_str(&format!("  ! {}\n", warning.yellow()));
        } else {
            out.push_str(&format!("  ! {}\n", warning));
        }
    }
    for recommendation in &result.recommendations {
        out.push_str(&format!("  > {}\n", recommendation));
    }
    out
}

/// One line per triggered rule, plus the summary footer.
pub fn format_rule_results(
    results: &[RuleResult],
    summary: &RuleSummary,
    use_colors: bool,
) -> String {
    if results.is_empty() {
        return "No rules triggered.".to_string();
    }

    let mut out = String::new();
    for result in results {
        let tag = severity_tag(result.severity, use_colors);
        out.push_str(&format!(
            "{} [{}] {} (confidence {:.0}%)\n        {}\n",
            tag,
            result.category.as_str(),
            result.message,
            result.confidence * 100.0,
            result.recommendation,
        ));
    }
    out.push_str(&format!(
        "\n{} triggered: {} blocking, {} critical, {} warning, {} info -> overall risk {}\n",
        summary.total_rules_triggered,
        summary.blocking_issues,
        summary.critical_issues,
        summary.warnings,
        summary.info_items,
        summary.overall_risk.as_str(),
    ));
    out
}

fn severity_tag(severity: Severity, use_colors: bool) -> String {
    let text = format!("{:>8}", severity.as_str().to_uppercase());
    if !use_colors {
        return text;
    }
    match severity {
        Severity::Blocking => text.red().bold().to_string(),
        Severity::Critical => text.red().to_string(),
        Severity::Warning => text.yellow().to_string(),
        Severity::Info => text.cyan().to_string(),
    }
}

/// Scenario table, one row per scenario, sorted as given.
pub fn format_scenario_table(results: &[ScenarioResult], use_colors: bool) -> String {
    if results.is_empty() {
        return "No scenarios produced a result.".to_string();
    }

    let name_width = name_column_width(results);
    let mut out = format!(
        "{:<width$} {:>9} {:>9} {:>8}  {}\n",
        "scenario",
        "score",
        "change",
        "pct",
        "risk",
        width = name_width
    );

    for result in results {
        let change = format!("{:+.1}", result.score_change);
        let change = if use_colors {
            if result.score_change >= 0.0 {
                change.green().to_string()
            } else {
                change.red().to_string()
            }
        } else {
            change
        };
        out.push_str(&format!(
            "{:<width$} {:>9.1} {:>9} {:>7.1}%  {}\n",
            truncate(&result.scenario_name, name_width),
            result.modified_score,
            change,
            result.score_change_percent,
            result.risk_shift.label(),
            width = name_width
        ));
    }
    out
}

fn name_column_width(results: &[ScenarioResult]) -> usize {
    let longest = results
        .iter()
        .map(|r| r.scenario_name.chars().count())
        .max()
        .unwrap_or(8)
        .max(8);
    // Leave room for the numeric columns on narrow terminals.
    let cap = terminal_size()
        .map(|(Width(w), _)| (w as usize).saturating_sub(50).max(12))
        .unwrap_or(40);
    longest.min(cap)
}

fn truncate(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        return text.to_string();
    }
    let mut out: String = chars[..max_width.saturating_sub(1)].iter().collect();
    out.push('…');
    out
}

/// Sensitivity ranking, most sensitive factor first.
pub fn format_sensitivity(report: &SensitivityReport, use_colors: bool) -> String {
    let mut out = format!(
        "base score {:.1}, weights perturbed by {:.0}%\n",
        report.base_score,
        report.adjustment * 100.0
    );
    for (factor, percent, band) in &report.ranked {
        let band_text = if use_colors {
            match band {
                crate::sensitivity::SensitivityBand::High => band.as_str().red().to_string(),
                crate::sensitivity::SensitivityBand::Medium => {
                    band.as_str().yellow().to_string()
                }
                crate::sensitivity::SensitivityBand::Low => band.as_str().green().to_string(),
            }
        } else {
            band.as_str().to_string()
        };
        out.push_str(&format!(
            "  {:<24} {:>6.2}%  {}\n",
            factor.as_str(),
            percent,
            band_text
        ));
    }
    out
}

/// Monte Carlo summary block.
pub fn format_monte_carlo(summary: &MonteCarloSummary, use_colors: bool) -> String {
    let s = &summary.statistics;
    let risk = &summary.risk;
    let ratio = risk
        .risk_reward_ratio
        .map(|r| format!("{:.2}", r))
        .unwrap_or_else(|| "inf".to_string());

    let header = format!(
        "SUMMARY ({} of {} trials valid)",
        summary.valid_trials, summary.requested_trials
    );
    let header = if use_colors {
        header.bold().to_string()
    } else {
        header
    };

    format!(
        "{}\n\
         \x20 baseline:          {:.1}\n\
         \x20 score:             mean={:.2}  std(pop)={:.2}  min={:.1}  max={:.1}\n\
         \x20 percentiles:       p5={:.1}  p25={:.1}  p50={:.1}  p75={:.1}  p95={:.1}\n\
         \x20 volatility:        {:.3} -> {} risk\n\
         \x20 downside/upside:   {:.1} / {:.1}  (reward ratio {})\n\
         \x20 P(below baseline): {:.0}%   P(score >= {:.0}): {:.0}%\n",
        header,
        summary.baseline_score,
        s.mean,
        s.std_dev,
        s.min,
        s.max,
        s.p5,
        s.p25,
        s.median,
        s.p75,
        s.p95,
        risk.volatility,
        risk.risk_level.as_str(),
        risk.downside_risk,
        risk.upside_potential,
        ratio,
        summary.probability_below_baseline * 100.0,
        summary.success_threshold,
        summary.probability_success * 100.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{CustomerSegment, MarketContext, UserInputs};
    use crate::engine::Engine;
    use crate::providers::FixtureProvider;

    fn demo_context() -> MarketContext {
        MarketContext::from_raw(FixtureProvider.raw_context(), CustomerSegment::General, 5)
    }

    #[test]
    fn test_format_score_plain() {
        assert_eq!(format_score(66.5, false), "66.5");
        assert_eq!(format_score(0.0, false), "0.0");
    }

    #[test]
    fn test_scoring_detail_contains_sections() {
        let engine = Engine::default();
        let result = engine.score_business("cafe", &UserInputs::default(), &demo_context());
        let text = format_scoring_result("cafe", &result, false);
        assert!(text.contains("cafe"));
        assert!(text.contains("score"));
        assert!(text.contains("confidence"));
    }

    #[test]
    fn test_rule_output_mentions_overall_risk() {
        let engine = Engine::default();
        let ctx = demo_context();
        let inputs = UserInputs::default();
        let scores = engine.component_scores("pharmacy", &inputs, &ctx);
        let (results, summary) = engine.evaluate_rules("pharmacy", &ctx, &scores);
        let text = format_rule_results(&results, &summary, false);
        assert!(text.contains("overall risk"));
    }

    #[test]
    fn test_scenario_table_has_one_row_per_result() {
        let engine = Engine::default();
        let results = engine.run_scenarios("cafe", &UserInputs::default(), &demo_context());
        let table = format_scenario_table(&results, false);
        // Header plus eight scenario rows.
        assert_eq!(table.trim_end().lines().count(), 9);
    }

    #[test]
    fn test_truncate_handles_unicode() {
        assert_eq!(truncate("short", 10), "short");
        let cut = truncate("a very long scenario name", 10);
        assert_eq!(cut.chars().count(), 10);
        assert!(cut.ends_with('…'));
    }

    #[test]
    fn test_monte_carlo_block_renders() {
        let engine = Engine::default();
        let summary = engine
            .simulate_monte_carlo(
                "cafe",
                &UserInputs::default(),
                &demo_context(),
                Some(80),
                Some(9),
            )
            .unwrap();
        let text = format_monte_carlo(&summary, false);
        assert!(text.contains("SUMMARY"));
        assert!(text.contains("percentiles"));
    }
}
