//! Prediction command

use anyhow::{bail, Result};
use std::collections::BTreeMap;

use crate::client::{ApiClient, PredictRequest, PredictResponse};
use crate::output::{format_price, print_info, print_success, OutputFormat};

/// Parse a `KEY=VALUE` feature argument. Values that parse as numbers
/// are sent as numbers, everything else as strings.
pub fn parse_feature(arg: &str) -> Result<(String, serde_json::Value)> {
    let Some((key, value)) = arg.split_once('=') else {
        bail!("Invalid feature '{}', expected KEY=VALUE", arg);
    };
    if key.is_empty() {
        bail!("Invalid feature '{}', empty key", arg);
    }

    let value = match value.parse::<f64>() {
        Ok(n) => serde_json::json!(n),
        Err(_) => serde_json::json!(value),
    };
    Ok((key.to_string(), value))
}

/// Request a prediction and print the result
pub async fn predict(
    client: &ApiClient,
    features: &[String],
    model: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let mut parsed = BTreeMap::new();
    for arg in features {
        let (key, value) = parse_feature(arg)?;
        parsed.insert(key, value);
    }

    let request = PredictRequest {
        features: parsed,
        model_name: model,
    };
    let response: PredictResponse = client.post("predict", &request).await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Table => {
            print_success(&format!(
                "Predicted price: {}",
                format_price(response.predicted_price)
            ));
            print_info(&format!("Model used: {}", response.model_used));
            print_info(&format!(
                "Missing features filled from defaults: {}",
                response.missing_features.len()
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numeric_and_text_values() {
        let (key, value) = parse_feature("LotArea=9000").unwrap();
        assert_eq!(key, "LotArea");
        assert_eq!(value, serde_json::json!(9000.0));

        let (key, value) = parse_feature("Neighborhood=NAmes").unwrap();
        assert_eq!(key, "Neighborhood");
        assert_eq!(value, serde_json::json!("NAmes"));
    }

    #[test]
    fn rejects_malformed_arguments() {
        assert!(parse_feature("LotArea").is_err());
        assert!(parse_feature("=9000").is_err());
    }
}
