use std::env;
use std::path::PathBuf;

use crate::data::aggregate::DEFAULT_TOP_N;
use crate::data::loader::DEFAULT_ENCODING;

/// File opened at start-up when it exists in the working directory.
pub const DEFAULT_DATA_PATH: &str = "pl-tables-1993-2024.csv";

const MAX_TOP_N: usize = 50;

/// Runtime settings, read from the environment (and `.env`, loaded by `main`).
///
/// | variable               | default                   |
/// |------------------------|---------------------------|
/// | `LEAGUE_DASH_DATA`     | `pl-tables-1993-2024.csv` |
/// | `LEAGUE_DASH_ENCODING` | `utf-8`                   |
/// | `LEAGUE_DASH_TOP_N`    | `10` (clamped to 1..=50)  |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub encoding: String,
    pub top_n: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            encoding: DEFAULT_ENCODING.to_string(),
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Blank or unparsable values fall back to
    /// the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let opt = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        Self {
            data_path: opt("LEAGUE_DASH_DATA")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            encoding: opt("LEAGUE_DASH_ENCODING").unwrap_or(defaults.encoding),
            top_n: opt("LEAGUE_DASH_TOP_N")
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(defaults.top_n)
                .clamp(1, MAX_TOP_N),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> AppConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(from_pairs(&[]), AppConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let cfg = from_pairs(&[
            ("LEAGUE_DASH_DATA", "/tmp/laliga.xlsx"),
            ("LEAGUE_DASH_ENCODING", "latin1"),
            ("LEAGUE_DASH_TOP_N", "5"),
        ]);
        assert_eq!(cfg.data_path, PathBuf::from("/tmp/laliga.xlsx"));
        assert_eq!(cfg.encoding, "latin1");
        assert_eq!(cfg.top_n, 5);
    }

    #[test]
    fn blank_and_bad_values_fall_back() {
        let cfg = from_pairs(&[
            ("LEAGUE_DASH_DATA", "   "),
            ("LEAGUE_DASH_TOP_N", "lots"),
        ]);
        assert_eq!(cfg.data_path, PathBuf::from(DEFAULT_DATA_PATH));
        assert_eq!(cfg.top_n, DEFAULT_TOP_N);
    }

    #[test]
    fn top_n_is_clamped() {
        assert_eq!(from_pairs(&[("LEAGUE_DASH_TOP_N", "0")]).top_n, 1);
        assert_eq!(from_pairs(&[("LEAGUE_DASH_TOP_N", "500")]).top_n, MAX_TOP_N);
    }
}
