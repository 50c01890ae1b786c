use std::collections::HashMap;
use std::sync::Arc;

use encoding_rs::Encoding;
use sha2::{Digest, Sha256};

use super::error::LoadError;
use super::loader::{self, SourceFormat};
use super::model::Dataset;

/// SHA-256 of the source bytes plus the format and encoding they were read with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Memoizes [`loader::load`] by content. Owned by whoever drives the loads;
/// there is no process-global instance.
#[derive(Debug, Default)]
pub struct LoadCache {
    entries: HashMap<CacheKey, Arc<Dataset>>,
}

impl LoadCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_for(bytes: &[u8], format: SourceFormat, encoding: &str) -> CacheKey {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        hasher.update([0u8]);
        hasher.update(format.tag().as_bytes());
        hasher.update([0u8]);
        // Text formats only; a workbook decodes the same under any label.
        // Aliases of one encoding share a key.
        if format != SourceFormat::Excel {
            let label = encoding.trim();
            match Encoding::for_label(label.as_bytes()) {
                Some(resolved) => hasher.update(resolved.name().as_bytes()),
                None => hasher.update(label.to_ascii_lowercase().as_bytes()),
            }
        }
        CacheKey(format!("{:x}", hasher.finalize()))
    }

    /// Return the cached dataset for these bytes, parsing them on a miss.
    /// Errors are not cached.
    pub fn load(
        &mut self,
        bytes: &[u8],
        format: SourceFormat,
        encoding: &str,
    ) -> Result<Arc<Dataset>, LoadError> {
        let key = Self::key_for(bytes, format, encoding);
        if let Some(ds) = self.entries.get(&key) {
            log::debug!("load cache hit {}", &key.as_str()[..12]);
            return Ok(Arc::clone(ds));
        }

        log::debug!("load cache miss {}", &key.as_str()[..12]);
        let ds = Arc::new(loader::load(bytes, format, encoding)?);
        self.entries.insert(key, Arc::clone(&ds));
        Ok(ds)
    }

    /// Drop one entry. Returns whether it was present.
    pub fn invalidate(&mut self, key: &CacheKey) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::DEFAULT_ENCODING;

    const GOOD: &[u8] = b"season_end_year,team,position,played,won,drawn,lost,gf,ga,gd,points\n\
                          2023,A,1,2,2,0,0,5,1,4,6\n";

    #[test]
    fn same_bytes_hit_the_cache() {
        let mut cache = LoadCache::new();
        let a = cache.load(GOOD, SourceFormat::Csv, DEFAULT_ENCODING).unwrap();
        let b = cache.load(GOOD, SourceFormat::Csv, DEFAULT_ENCODING).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn different_bytes_miss() {
        let mut cache = LoadCache::new();
        let other = [GOOD, b"2023,B,2,2,0,0,2,1,5,-4,0\n"].concat();
        let a = cache.load(GOOD, SourceFormat::Csv, DEFAULT_ENCODING).unwrap();
        let b = cache.load(&other, SourceFormat::Csv, DEFAULT_ENCODING).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(b.len(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn encoding_is_part_of_the_key() {
        let utf8 = LoadCache::key_for(GOOD, SourceFormat::Csv, "utf-8");
        let latin = LoadCache::key_for(GOOD, SourceFormat::Csv, "latin1");
        assert_ne!(utf8, latin);
        assert_eq!(utf8, LoadCache::key_for(GOOD, SourceFormat::Csv, " UTF-8"));
    }

    #[test]
    fn encoding_aliases_share_an_entry() {
        assert_eq!(
            LoadCache::key_for(GOOD, SourceFormat::Csv, "utf8"),
            LoadCache::key_for(GOOD, SourceFormat::Csv, "utf-8")
        );
        assert_eq!(
            LoadCache::key_for(GOOD, SourceFormat::Csv, "latin1"),
            LoadCache::key_for(GOOD, SourceFormat::Csv, "iso-8859-1")
        );

        let mut cache = LoadCache::new();
        let a = cache.load(GOOD, SourceFormat::Csv, "utf8").unwrap();
        let b = cache.load(GOOD, SourceFormat::Csv, "UTF-8").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn invalidate_forces_reload() {
        let mut cache = LoadCache::new();
        let a = cache.load(GOOD, SourceFormat::Csv, DEFAULT_ENCODING).unwrap();
        let key = LoadCache::key_for(GOOD, SourceFormat::Csv, DEFAULT_ENCODING);
        assert!(cache.invalidate(&key));
        assert!(!cache.invalidate(&key));
        let b = cache.load(GOOD, SourceFormat::Csv, DEFAULT_ENCODING).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(*a, *b);
    }

    #[test]
    fn failures_are_not_cached() {
        let mut cache = LoadCache::new();
        assert!(cache
            .load(b"team,points\nA,3\n", SourceFormat::Csv, DEFAULT_ENCODING)
            .is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn clear_empties_everything() {
        let mut cache = LoadCache::new();
        cache.load(GOOD, SourceFormat::Csv, DEFAULT_ENCODING).unwrap();
        cache.clear();
        assert!(cache.is_empty());
    }
}
