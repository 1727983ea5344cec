//! Model listing command

use anyhow::Result;
use tabled::Tabled;

use crate::client::{test_metric, ApiClient, ModelListing};
use crate::output::{format_r2, print_table, OutputFormat};

/// Row for the models table
#[derive(Tabled, serde::Serialize)]
struct ModelRow {
    #[tabled(rename = "Model")]
    name: String,
    #[tabled(rename = "Test MAE")]
    mae: String,
    #[tabled(rename = "Test RMSE")]
    rmse: String,
    #[tabled(rename = "Test R²")]
    r2: String,
    #[tabled(rename = "Features")]
    features: usize,
}

fn format_metric(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "-".to_string(),
    }
}

/// List available models with their evaluation metrics
pub async fn list_models(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let listing: ModelListing = client.get("models").await?;

    let rows: Vec<ModelRow> = listing
        .into_iter()
        .map(|(name, info)| ModelRow {
            name,
            mae: format_metric(test_metric(&info.metrics, "mae")),
            rmse: format_metric(test_metric(&info.metrics, "rmse")),
            r2: test_metric(&info.metrics, "r2")
                .map(format_r2)
                .unwrap_or_else(|| "-".to_string()),
            features: info.features.len(),
        })
        .collect();

    print_table(&rows, format);
    Ok(())
}
