use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, trace};

use crate::config::constant::{OSRM_DEFAULT_URL, OSRM_MAX_ELEMENTS};
use crate::distance::lookup::{BatchResult, DistanceLookup, Element};
use crate::domain::types::Coordinate;
use crate::error::ProviderError;

const MAX_URL_LEN: usize = 8000;
const USER_AGENT: &str = concat!("binroute/", env!("CARGO_PKG_VERSION"));

/// OSRM `table` service with `annotations=distance`.
#[derive(Debug, Clone)]
pub struct OsrmLookup {
    client: Client,
    base_url: String,
    max_elements: usize,
}

impl Default for OsrmLookup {
    fn default() -> Self {
        Self::new(OSRM_DEFAULT_URL)
    }
}

impl OsrmLookup {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_elements: OSRM_MAX_ELEMENTS,
        }
    }

    /// Self-hosted servers often raise `--max-table-size`; public ones do not.
    pub fn with_max_elements(mut self, max_elements: usize) -> Self {
        self.max_elements = max_elements.max(1);
        self
    }

    fn is_public(&self) -> bool {
        self.base_url.contains("router.project-osrm.org")
    }

    fn table_url(&self, origins: &[Coordinate], destinations: &[Coordinate]) -> String {
        let coord_str = origins
            .iter()
            .chain(destinations)
            .map(|c| format!("{},{}", c.lon, c.lat))
            .collect::<Vec<String>>()
            .join(";");
        let sources = (0..origins.len())
            .map(|i| i.to_string())
            .collect::<Vec<String>>()
            .join(";");
        let targets = (origins.len()..origins.len() + destinations.len())
            .map(|i| i.to_string())
            .collect::<Vec<String>>()
            .join(";");
        format!(
            "{}/{}?sources={}&destinations={}&annotations=distance",
            self.base_url, coord_str, sources, targets
        )
    }

    async fn fetch(&self, origins: &[Coordinate], destinations: &[Coordinate]) -> BatchResult {
        let url = self.table_url(origins, destinations);
        if url.len() > MAX_URL_LEN {
            return Err(ProviderError::RequestTooLarge(url.len()));
        }
        debug!("Built OSRM URL ({} chars)", url.len());
        trace!("OSRM URL: {}", url);

        let mut request = self.client.get(&url);
        if self.is_public() {
            request = request.header("User-Agent", USER_AGENT);
            info!("Using public OSRM, added User-Agent: {}", USER_AGENT);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(format!(
                "HTTP {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let text = response.text().await?;
        trace!("OSRM response size: {} bytes", text.len());
        let body: TableResponse = serde_json::from_str(&text).map_err(|e| {
            ProviderError::Decode(format!("{} (first 200 chars: {})", e, preview(&text, 200)))
        })?;

        parse_table(body, origins.len(), destinations.len())
    }
}

impl DistanceLookup for OsrmLookup {
    fn name(&self) -> &'static str {
        "osrm"
    }

    fn max_elements(&self) -> usize {
        self.max_elements
    }

    fn distance_batch<'a>(
        &'a self,
        origins: &'a [Coordinate],
        destinations: &'a [Coordinate],
    ) -> BoxFuture<'a, BatchResult> {
        self.fetch(origins, destinations).boxed()
    }
}

/// First `max_chars` characters of a response body, for error messages.
fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn parse_table(body: TableResponse, expected_rows: usize, expected_cols: usize) -> BatchResult {
    if body.code != "Ok" {
        return Err(ProviderError::Status(match body.message {
            Some(message) => format!("{}: {}", body.code, message),
            None => body.code,
        }));
    }

    let distances = body.distances.ok_or_else(|| {
        ProviderError::Decode("no 'distances' array in OSRM response".to_string())
    })?;
    if distances.len() != expected_rows {
        return Err(ProviderError::Incomplete {
            expected_rows,
            expected_cols,
            rows: distances.len(),
        });
    }

    Ok(distances
        .into_iter()
        .map(|row| {
            let mut elements: Vec<Element> = row
                .into_iter()
                .map(|value| match value {
                    Some(meters) if meters.is_finite() && meters >= 0.0 => {
                        Element::Meters(meters.round() as u64)
                    }
                    Some(_) => Element::Missing,
                    None => Element::NoRoute,
                })
                .collect();
            elements.resize(expected_cols, Element::Missing);
            elements
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct TableResponse {
    code: String,
    message: Option<String>,
    distances: Option<Vec<Vec<Option<f64>>>>,
}
