use std::env;
use std::time::Duration;

use dotenv::dotenv;
use tracing::{info, warn};

use crate::error::ConfigError;

pub mod constant {
    /// Earth radius used by the haversine fallback, in meters.
    pub const EARTH_RADIUS_M: f64 = 6_371_000.0;
    /// Matrix entry used when a provider reports that no route exists.
    pub const UNREACHABLE_PENALTY: u64 = 10_000_000;
    pub const GOOGLE_MAX_ELEMENTS: usize = 100;
    /// Google also caps origins and destinations per request.
    pub const GOOGLE_MAX_DIMENSION: usize = 25;
    pub const OSRM_MAX_ELEMENTS: usize = 10_000;
    pub const LOOKUP_TIMEOUT_SECS: u64 = 10;
    pub const MAX_SWEEPS: usize = 10_000;
    pub const MAX_SEGMENT_LEN: usize = 3;
    pub const MAX_FILL_LEVEL: i64 = 100;
    /// Largest demand or vehicle capacity accepted, so load sums cannot overflow.
    pub const MAX_QUANTITY: u64 = u32::MAX as u64;
    pub const OSRM_DEFAULT_URL: &str = "https://router.project-osrm.org/table/v1/driving";
    pub const GOOGLE_DISTANCE_MATRIX_URL: &str =
        "https://maps.googleapis.com/maps/api/distancematrix/json";
}

/// Which external service answers distance lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderKind {
    Google { api_key: String },
    Osrm { base_url: String, max_elements: usize },
    Haversine,
}

impl ProviderKind {
    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::Google { .. } => "google",
            ProviderKind::Osrm { .. } => "osrm",
            ProviderKind::Haversine => "haversine",
        }
    }
}

/// Search budget for the improvement phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverBudget {
    pub max_sweeps: usize,
    pub time_limit: Option<Duration>,
}

impl Default for SolverBudget {
    fn default() -> Self {
        Self {
            max_sweeps: constant::MAX_SWEEPS,
            time_limit: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub provider: ProviderKind,
    pub lookup_timeout: Duration,
    pub budget: SolverBudget,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Haversine,
            lookup_timeout: Duration::from_secs(constant::LOOKUP_TIMEOUT_SECS),
            budget: SolverBudget::default(),
        }
    }
}

impl PlannerConfig {
    /// Load configuration from the process environment (and `.env`, if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider = match lookup("DISTANCE_PROVIDER").as_deref().map(str::trim) {
            None | Some("") | Some("haversine") => ProviderKind::Haversine,
            Some("google") => match lookup("GOOGLE_API_KEY") {
                Some(api_key) if !api_key.trim().is_empty() => {
                    info!("Loaded Google Maps API key from environment");
                    ProviderKind::Google {
                        api_key: api_key.trim().to_string(),
                    }
                }
                _ => return Err(ConfigError::MissingVar("GOOGLE_API_KEY")),
            },
            Some("osrm") => ProviderKind::Osrm {
                base_url: lookup("OSRM_BASE_URL")
                    .unwrap_or_else(|| constant::OSRM_DEFAULT_URL.to_string()),
                max_elements: parse_var(&lookup, "OSRM_MAX_ELEMENTS")?
                    .unwrap_or(constant::OSRM_MAX_ELEMENTS),
            },
            Some(other) => return Err(ConfigError::UnknownProvider(other.to_string())),
        };

        let lookup_timeout = Duration::from_secs(
            parse_var(&lookup, "LOOKUP_TIMEOUT_SECS")?.unwrap_or(constant::LOOKUP_TIMEOUT_SECS),
        );

        let max_sweeps = parse_var(&lookup, "SOLVER_MAX_SWEEPS")?.unwrap_or(constant::MAX_SWEEPS);
        let time_limit = parse_var::<u64, _>(&lookup, "SOLVER_TIME_LIMIT_MS")?
            .map(Duration::from_millis);

        if max_sweeps == 0 {
            warn!("SOLVER_MAX_SWEEPS is 0, local search is disabled");
        }

        Ok(Self {
            provider,
            lookup_timeout,
            budget: SolverBudget {
                max_sweeps,
                time_limit,
            },
        })
    }
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_to_haversine() {
        let config = PlannerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.provider, ProviderKind::Haversine);
        assert_eq!(config.budget, SolverBudget::default());
        assert_eq!(config.lookup_timeout, Duration::from_secs(10));
    }

    #[test]
    fn google_requires_api_key() {
        let err = PlannerConfig::from_lookup(lookup_from(&[("DISTANCE_PROVIDER", "google")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("GOOGLE_API_KEY")));
    }

    #[test]
    fn reads_osrm_and_budget() {
        let config = PlannerConfig::from_lookup(lookup_from(&[
            ("DISTANCE_PROVIDER", "osrm"),
            ("OSRM_BASE_URL", "http://localhost:5000/table/v1/driving"),
            ("OSRM_MAX_ELEMENTS", "250000"),
            ("SOLVER_MAX_SWEEPS", "25"),
            ("SOLVER_TIME_LIMIT_MS", "1500"),
        ]))
        .unwrap();
        assert_eq!(
            config.provider,
            ProviderKind::Osrm {
                base_url: "http://localhost:5000/table/v1/driving".to_string(),
                max_elements: 250_000,
            }
        );
        assert_eq!(config.budget.max_sweeps, 25);
        assert_eq!(config.budget.time_limit, Some(Duration::from_millis(1500)));
    }

    #[test]
    fn rejects_garbage_numbers() {
        let err = PlannerConfig::from_lookup(lookup_from(&[("LOOKUP_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "LOOKUP_TIMEOUT_SECS",
                ..
            }
        ));
    }

    #[test]
    fn osrm_table_size_defaults_and_validates() {
        let config =
            PlannerConfig::from_lookup(lookup_from(&[("DISTANCE_PROVIDER", "osrm")])).unwrap();
        assert!(matches!(
            config.provider,
            ProviderKind::Osrm { max_elements, .. } if max_elements == constant::OSRM_MAX_ELEMENTS
        ));

        let err = PlannerConfig::from_lookup(lookup_from(&[
            ("DISTANCE_PROVIDER", "osrm"),
            ("OSRM_MAX_ELEMENTS", "-1"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "OSRM_MAX_ELEMENTS",
                ..
            }
        ));
    }

    #[test]
    fn rejects_unknown_provider() {
        let err = PlannerConfig::from_lookup(lookup_from(&[("DISTANCE_PROVIDER", "bing")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProvider(p) if p == "bing"));
    }
}
