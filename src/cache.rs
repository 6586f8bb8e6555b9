use anyhow::Result;
use std::path::Path;

/// Content-addressed store for archive documents, keyed by
/// `{accession}/{filename}`. Filings are immutable once published, so an
/// entry never needs invalidation.
pub struct DocumentCache {
    db: sled::Db,
}

impl DocumentCache {
    pub fn open(path: &Path) -> Result<Self> {
        let db = sled::open(path)?;
        Ok(DocumentCache { db })
    }

    /// A cache error degrades to a miss; the caller falls through to the
    /// network.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        match self.db.get(key) {
            Ok(value) => value.map(|v| v.to_vec()),
            Err(e) => {
                log::warn!("cache read failed for {}: {}", key, e);
                None
            }
        }
    }

    pub fn put(&self, key: &str, bytes: &[u8]) {
        if let Err(e) = self.db.insert(key, bytes) {
            log::warn!("cache write failed for {}: {}", key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trips_document_bytes() {
        let dir = tempdir().unwrap();
        let cache = DocumentCache::open(dir.path()).unwrap();

        assert_eq!(cache.get("000123456724000012/abc_10k_htm.xml"), None);

        cache.put("000123456724000012/abc_10k_htm.xml", b"<xbrl/>");
        assert_eq!(
            cache.get("000123456724000012/abc_10k_htm.xml").as_deref(),
            Some(b"<xbrl/>".as_ref())
        );
    }
}
