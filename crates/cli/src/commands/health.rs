//! Service health command

use anyhow::Result;

use crate::client::{ApiClient, HealthResponse};
use crate::output::{print_error, print_success, OutputFormat};

/// Check service health and startup load state
pub async fn check_health(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let health: HealthResponse = client.get("health").await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&health)?);
        }
        OutputFormat::Table => {
            print_success(&format!(
                "Service {} ({} models loaded)",
                health.status, health.models_loaded
            ));
            if !health.has_reference_data {
                print_error("Reference dataset not loaded, feature defaults unavailable");
            }
        }
    }
    Ok(())
}
