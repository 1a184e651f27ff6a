/// Region registry for the coral bleaching risk service.
///
/// Defines the canonical list of reef regions the service accepts, along
/// with their metadata. This is the single source of truth for region
/// codes — the validator and the feature builder both reference regions
/// from here rather than hardcoding code strings.

// ---------------------------------------------------------------------------
// Region metadata
// ---------------------------------------------------------------------------

/// Metadata for a single monitored reef region.
#[derive(Debug)]
pub struct Region {
    /// Stable lowercase code used on the wire and in station files.
    pub code: &'static str,
    /// Human-readable region name.
    pub name: &'static str,
    /// Short description of the reef system.
    pub description: &'static str,
    /// Representative WGS84 latitude of the region's virtual station.
    pub latitude: f64,
    /// Representative WGS84 longitude of the region's virtual station.
    pub longitude: f64,
}

/// All reef regions accepted by the prediction endpoint, ordered as they
/// appear in the front-end region selector.
///
/// Coordinates follow the NOAA Coral Reef Watch regional virtual stations
/// the training data was pulled from.
pub static REGION_REGISTRY: &[Region] = &[
    Region {
        code: "caribbean",
        name: "Southwestern Cuba / Caribbean",
        description: "Fringing and patch reefs of the northwestern Caribbean. \
                      Reference region for the bundled NOAA station file.",
        latitude: 21.25,
        longitude: -82.75,
    },
    Region {
        code: "florida_keys",
        name: "Florida Keys",
        description: "Barrier reef tract along the Straits of Florida. \
                      Shallow and strongly coupled to summer heat waves.",
        latitude: 24.55,
        longitude: -81.45,
    },
    Region {
        code: "great_barrier_reef",
        name: "Great Barrier Reef (central)",
        description: "Central GBR sector. Southern-hemisphere seasonality; \
                      peak thermal stress arrives in austral summer.",
        latitude: -18.15,
        longitude: 147.05,
    },
    Region {
        code: "coral_triangle",
        name: "Coral Triangle (Sulawesi)",
        description: "Equatorial reef complex with weak seasonal cycle but \
                      high sensitivity to anomaly-driven stress.",
        latitude: -1.85,
        longitude: 124.55,
    },
];

/// Returns the codes of all accepted regions, suitable for error payloads
/// and the front-end selector.
pub fn all_region_codes() -> Vec<&'static str> {
    REGION_REGISTRY.iter().map(|r| r.code).collect()
}

/// Looks up a region by code. Returns `None` if not found.
pub fn find_region(code: &str) -> Option<&'static Region> {
    REGION_REGISTRY.iter().find(|r| r.code == code)
}

/// Position of a region within the registry, used by the feature builder
/// for one-hot encoding. The registry order is part of the trained model's
/// column contract and must not be reordered.
pub fn region_index(region: &Region) -> Option<usize> {
    REGION_REGISTRY.iter().position(|r| r.code == region.code)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
