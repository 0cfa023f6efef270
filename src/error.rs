use thiserror::Error;

/// Input rejected before it reaches the solver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("fleet must contain at least one vehicle")]
    EmptyFleet,

    #[error("vehicle {vehicle} has non-positive capacity")]
    ZeroCapacity { vehicle: usize },

    #[error("vehicle {vehicle} capacity {capacity} exceeds the supported maximum")]
    CapacityTooLarge { vehicle: usize, capacity: u64 },

    #[error("location list is empty, the depot must be at index 0")]
    MissingDepot,

    #[error("depot '{id}' must have zero demand, found {demand}")]
    DepotDemand { id: String, demand: u64 },

    #[error("bin id '{0}' is reserved for the depot")]
    ReservedId(String),

    #[error("location '{id}' demand {demand} exceeds the supported maximum")]
    DemandTooLarge { id: String, demand: u64 },

    #[error("location '{id}' has negative demand {demand}")]
    NegativeDemand { id: String, demand: i64 },

    #[error("location '{id}' has fill level {fill_level}, expected 0..=100")]
    FillLevelOutOfRange { id: String, fill_level: i64 },

    #[error("duplicate location id '{0}'")]
    DuplicateId(String),

    #[error("distance matrix is {rows}x{cols} but there are {locations} locations")]
    MatrixDimension {
        rows: usize,
        cols: usize,
        locations: usize,
    },

    #[error("distance matrix diagonal entry {index} is {value}, expected 0")]
    NonZeroDiagonal { index: usize, value: u64 },
}

/// Why an external distance lookup did not produce an answer.
///
/// Never surfaced to callers of the provider; it is logged and replaced by the
/// geometric fallback.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service answered with status {0}")]
    Status(String),

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("request URL too long ({0} chars)")]
    RequestTooLarge(usize),

    #[error("lookup timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("expected {expected_rows}x{expected_cols} elements, got {rows} rows")]
    Incomplete {
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is required")]
    MissingVar(&'static str),

    #[error("environment variable {key} has invalid value '{value}'")]
    InvalidValue { key: &'static str, value: String },

    #[error("unknown distance provider '{0}'")]
    UnknownProvider(String),
}

/// Failure of a whole planning request.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("invalid routing input: {0}")]
    Validation(#[from] ValidationError),
}
