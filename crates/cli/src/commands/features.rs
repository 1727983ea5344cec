//! Feature inspection commands

use anyhow::Result;
use tabled::Tabled;

use crate::client::{ApiClient, FeatureReport};
use crate::output::{print_info, print_table, OutputFormat};

/// Row for the feature defaults table
#[derive(Tabled, serde::Serialize)]
struct DefaultRow {
    #[tabled(rename = "Feature")]
    feature: String,
    #[tabled(rename = "Default")]
    default: String,
    #[tabled(rename = "Kind")]
    kind: String,
}

/// Row for the top features table
#[derive(Tabled, serde::Serialize)]
struct ImportanceRow {
    #[tabled(rename = "Rank")]
    rank: usize,
    #[tabled(rename = "Feature")]
    feature: String,
    #[tabled(rename = "Importance")]
    importance: String,
}

fn render_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Show feature defaults, or the best model's top features with `--top`
pub async fn show_features(client: &ApiClient, top: bool, format: OutputFormat) -> Result<()> {
    let report: FeatureReport = client.get("features").await?;

    if top {
        if report.top_features.is_empty() {
            print_info("The best model does not expose feature importances");
            return Ok(());
        }
        let rows: Vec<ImportanceRow> = report
            .top_features
            .iter()
            .filter_map(|name| {
                report.feature_importance.get(name).map(|entry| ImportanceRow {
                    rank: entry.rank,
                    feature: name.clone(),
                    importance: format!("{:.4}", entry.importance),
                })
            })
            .collect();
        print_table(&rows, format);
        return Ok(());
    }

    let rows: Vec<DefaultRow> = report
        .feature_defaults
        .iter()
        .map(|(name, value)| DefaultRow {
            feature: name.clone(),
            default: render_value(value),
            kind: if report.numerical_features.contains(name) {
                "numerical".to_string()
            } else {
                "categorical".to_string()
            },
        })
        .collect();
    print_table(&rows, format);
    Ok(())
}
