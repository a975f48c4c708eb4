//! Service configuration.
//!
//! Live-versus-simulated mode is an explicit constructor parameter rather
//! than ambient process state; [`ServiceConfig::from_env`] exists as a
//! convenience that reads the environment exactly once, at construction.

/// Environment variable selecting simulation mode.
const SIMULATED_DATA_VAR: &str = "USE_SIMULATED_DATA";

/// Environment variable supplying the Polygon API credential.
const POLYGON_API_KEY_VAR: &str = "POLYGON_API_KEY";

/// Where the service sources its data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DataMode {
    /// Fetch from live providers, falling back to synthetic data on failure.
    #[default]
    Live,
    /// Serve synthetic data exclusively; no live provider is contacted.
    Simulated,
}

impl DataMode {
    /// Interprets an environment-style flag value.
    ///
    /// `"1"`, `"true"`, and `"yes"` (case-insensitive) select
    /// [`Self::Simulated`]; anything else, including an unset flag, selects
    /// [`Self::Live`].
    #[must_use]
    pub fn from_flag(value: Option<&str>) -> Self {
        match value {
            Some(v) if matches!(v.to_lowercase().as_str(), "1" | "true" | "yes") => {
                Self::Simulated
            }
            _ => Self::Live,
        }
    }
}

/// Configuration for constructing a [`StockService`](crate::StockService).
#[derive(Clone, Debug, Default)]
pub struct ServiceConfig {
    /// Live or simulated data mode, decided once at startup.
    pub mode: DataMode,
    /// Polygon API credential. `None` leaves the Polygon provider
    /// registered but failing each request with a configuration error.
    pub polygon_api_key: Option<String>,
}

impl ServiceConfig {
    /// Reads configuration from the process environment.
    ///
    /// Consults `USE_SIMULATED_DATA` for the mode and `POLYGON_API_KEY` for
    /// the Polygon credential. Called once at startup; the result is an
    /// explicit value from then on.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            mode: DataMode::from_flag(std::env::var(SIMULATED_DATA_VAR).ok().as_deref()),
            polygon_api_key: std::env::var(POLYGON_API_KEY_VAR).ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthy_flags_select_simulation() {
        assert_eq!(DataMode::from_flag(Some("1")), DataMode::Simulated);
        assert_eq!(DataMode::from_flag(Some("true")), DataMode::Simulated);
        assert_eq!(DataMode::from_flag(Some("TRUE")), DataMode::Simulated);
        assert_eq!(DataMode::from_flag(Some("yes")), DataMode::Simulated);
    }

    #[test]
    fn everything_else_selects_live() {
        assert_eq!(DataMode::from_flag(None), DataMode::Live);
        assert_eq!(DataMode::from_flag(Some("0")), DataMode::Live);
        assert_eq!(DataMode::from_flag(Some("false")), DataMode::Live);
        assert_eq!(DataMode::from_flag(Some("")), DataMode::Live);
    }
}
