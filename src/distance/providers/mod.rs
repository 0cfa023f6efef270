pub mod google;
pub mod haversine;
pub mod osrm;

use std::sync::Arc;

pub use google::GoogleLookup;
pub use haversine::HaversineLookup;
pub use osrm::OsrmLookup;

use crate::config::ProviderKind;
use crate::distance::lookup::DistanceLookup;

/// Instantiate the lookup selected by configuration.
pub fn lookup_for(kind: &ProviderKind) -> Arc<dyn DistanceLookup> {
    match kind {
        ProviderKind::Google { api_key } => Arc::new(GoogleLookup::new(api_key.clone())),
        ProviderKind::Osrm {
            base_url,
            max_elements,
        } => Arc::new(OsrmLookup::new(base_url.clone()).with_max_elements(*max_elements)),
        ProviderKind::Haversine => Arc::new(HaversineLookup),
    }
}
