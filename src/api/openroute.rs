use anyhow::{Context, Result, bail};
use log::{info, warn};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::config::OpenRouteConfig;
use crate::domain::Facility;
use crate::feed::{Feature, FeatureCollection, GeoJson};

const USER_AGENT: &str = "reachmap/0.1.0";

/// Body of an openrouteservice isochrones request
#[derive(Debug, Serialize)]
struct IsochroneRequest<'a> {
    /// [lon, lat] per source
    locations: &'a [[f64; 2]],
    /// Band limits in seconds
    range: &'a [f64],
    units: &'static str,
    attributes: [&'static str; 1],
}

/// Split facility locations into request batches of [lon, lat] pairs
pub fn batch_locations(facilities: &[Facility], batch_size: usize) -> Vec<Vec<[f64; 2]>> {
    let locations: Vec<[f64; 2]> = facilities.iter().map(|f| [f.lon(), f.lat()]).collect();
    locations
        .chunks(batch_size.max(1))
        .map(|chunk| chunk.to_vec())
        .collect()
}

/// Fetch driving-time isochrones for every facility.
///
/// Locations are posted in batches of `config.batch_size`. A failing batch is
/// logged and skipped; the features of all successful batches are returned as
/// one collection, each carrying the provider's `value` (seconds).
///
/// # Arguments
/// * `facilities` - Sources to fetch isochrones for
/// * `range_seconds` - Band limits, already converted to seconds
/// * `config` - Endpoint, profile, batching and timeout settings
pub fn fetch_isochrones(
    facilities: &[Facility],
    range_seconds: &[f64],
    config: &OpenRouteConfig,
) -> Result<FeatureCollection> {
    let api_key = std::env::var(&config.api_key_env)
        .with_context(|| format!("{} not set in environment", config.api_key_env))?;

    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .context("Failed to create HTTP client")?;

    let url = format!("{}/{}", config.url.trim_end_matches('/'), config.profile);
    let batches = batch_locations(facilities, config.batch_size);

    let mut features: Vec<Feature> = Vec::new();
    for (i, locations) in batches.iter().enumerate() {
        info!("Fetching batch {} of {}", i + 1, batches.len());
        match fetch_batch(&client, &url, &api_key, locations, range_seconds) {
            Ok(batch) => features.extend(batch),
            Err(e) => warn!("Batch {} failed, skipping: {:#}", i + 1, e),
        }
    }

    Ok(FeatureCollection::new(features))
}

fn fetch_batch(
    client: &reqwest::blocking::Client,
    url: &str,
    api_key: &str,
    locations: &[[f64; 2]],
    range_seconds: &[f64],
) -> Result<Vec<Feature>> {
    let body = IsochroneRequest {
        locations,
        range: range_seconds,
        units: "m",
        attributes: ["total_pop"],
    };

    let response = client
        .post(url)
        .header("Authorization", api_key)
        .json(&body)
        .send()
        .context("Failed to send request to openrouteservice")?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().unwrap_or_default();
        bail!("openrouteservice returned error status {}: {}", status, text);
    }

    let value: Value = response
        .json()
        .context("Failed to parse openrouteservice JSON response")?;
    Ok(GeoJson::from_value(value)?.into_features())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FacilityKind;

    #[test]
    fn test_batch_locations() {
        let facilities: Vec<Facility> = (0..12)
            .map(|i| {
                Facility::new(
                    format!("H{}", i),
                    (44.0 + i as f64 * 0.1, -123.0),
                    FacilityKind::Hospital,
                )
            })
            .collect();

        let batches = batch_locations(&facilities, 5);
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].len(), 5);
        assert_eq!(batches[2].len(), 2);
        // [lon, lat] order on the wire
        assert_eq!(batches[0][0], [-123.0, 44.0]);
    }

    #[test]
    fn test_request_body() {
        let locations = [[-122.6865, 45.4995]];
        let ranges = [900.0, 1800.0];
        let body = IsochroneRequest {
            locations: &locations,
            range: &ranges,
            units: "m",
            attributes: ["total_pop"],
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["range"][1], 1800.0);
        assert_eq!(json["locations"][0][0], -122.6865);
        assert_eq!(json["attributes"][0], "total_pop");
    }

    #[test]
    fn test_parse_provider_response() {
        let json = r#"{
            "type": "FeatureCollection",
            "bbox": [-123.0, 44.0, -122.0, 45.0],
            "features": [
                {"type": "Feature",
                 "properties": {"group_index": 0, "value": 900.0, "center": [-122.68, 45.49], "total_pop": 1000.0},
                 "geometry": {"type": "Polygon", "coordinates": [[[-122.7,45.4],[-122.6,45.4],[-122.6,45.5],[-122.7,45.4]]]}}
            ],
            "metadata": {"service": "isochrones"}
        }"#;
        let value: Value = serde_json::from_str(json).unwrap();
        let features = GeoJson::from_value(value).unwrap().into_features();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].property_f64("value"), Some(900.0));
    }
}
