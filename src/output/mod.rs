pub mod formatter;

pub use formatter::{
    format_monte_carlo, format_rule_results, format_scenario_table, format_score,
    format_scoring_result, format_sensitivity, should_use_colors,
};
