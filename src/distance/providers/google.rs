use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, trace};

use crate::config::constant::{
    GOOGLE_DISTANCE_MATRIX_URL, GOOGLE_MAX_DIMENSION, GOOGLE_MAX_ELEMENTS,
};
use crate::distance::lookup::{BatchResult, DistanceLookup, Element};
use crate::domain::types::Coordinate;
use crate::error::ProviderError;

/// Google Maps Distance Matrix API, driving mode.
#[derive(Debug, Clone)]
pub struct GoogleLookup {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GoogleLookup {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, GOOGLE_DISTANCE_MATRIX_URL)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    async fn fetch(&self, origins: &[Coordinate], destinations: &[Coordinate]) -> BatchResult {
        let origins_param = join_coordinates(origins);
        let destinations_param = join_coordinates(destinations);
        trace!("Google origins={} destinations={}", origins_param, destinations_param);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("origins", origins_param.as_str()),
                ("destinations", destinations_param.as_str()),
                ("mode", "driving"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| e.without_url())?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.to_string()));
        }

        let body = response
            .json::<DistanceMatrixResponse>()
            .await
            .map_err(|e| e.without_url())?;
        debug!(
            "Google answered {} rows for {}x{} request",
            body.rows.len(),
            origins.len(),
            destinations.len()
        );
        parse_response(body, origins.len(), destinations.len())
    }
}

impl DistanceLookup for GoogleLookup {
    fn name(&self) -> &'static str {
        "google"
    }

    fn max_elements(&self) -> usize {
        GOOGLE_MAX_ELEMENTS
    }

    fn max_dimension(&self) -> usize {
        GOOGLE_MAX_DIMENSION
    }

    fn distance_batch<'a>(
        &'a self,
        origins: &'a [Coordinate],
        destinations: &'a [Coordinate],
    ) -> BoxFuture<'a, BatchResult> {
        self.fetch(origins, destinations).boxed()
    }
}

fn join_coordinates(coords: &[Coordinate]) -> String {
    coords
        .iter()
        .map(|c| format!("{},{}", c.lat, c.lon))
        .collect::<Vec<String>>()
        .join("|")
}

fn parse_response(
    response: DistanceMatrixResponse,
    expected_rows: usize,
    expected_cols: usize,
) -> BatchResult {
    if response.status != "OK" {
        return Err(ProviderError::Status(response.status));
    }
    if response.rows.len() != expected_rows {
        return Err(ProviderError::Incomplete {
            expected_rows,
            expected_cols,
            rows: response.rows.len(),
        });
    }

    let matrix = response
        .rows
        .into_iter()
        .map(|row| {
            let mut elements: Vec<Element> = row
                .elements
                .into_iter()
                .map(|element| match (element.status.as_str(), element.distance) {
                    ("OK", Some(distance)) => Element::Meters(distance.value),
                    ("ZERO_RESULTS", _) => Element::NoRoute,
                    _ => Element::Missing,
                })
                .collect();
            elements.resize(expected_cols, Element::Missing);
            elements
        })
        .collect();

    Ok(matrix)
}

#[derive(Debug, Deserialize)]
struct DistanceMatrixResponse {
    status: String,
    #[serde(default)]
    rows: Vec<Row>,
}

#[derive(Debug, Deserialize)]
struct Row {
    #[serde(default)]
    elements: Vec<ElementBody>,
}

#[derive(Debug, Deserialize)]
struct ElementBody {
    status: String,
    distance: Option<Distance>,
}

#[derive(Debug, Deserialize)]
struct Distance {
    value: u64,
}
