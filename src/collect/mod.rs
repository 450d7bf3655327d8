// src/collect/mod.rs
pub mod rss;
pub mod types;

use crate::collect::types::ReviewSource;

/// Fixed page budget for one collection run.
pub const DEFAULT_PAGE_BUDGET: u32 = 10;

/// The set of collection sources known to the service. Today that is the RSS
/// feed alone; multi-source fan-out is an extension point, so preference
/// resolution already goes through a registry.
pub struct SourceRegistry {
    sources: Vec<Box<dyn ReviewSource>>,
}

impl SourceRegistry {
    pub fn new(sources: Vec<Box<dyn ReviewSource>>) -> Self {
        Self { sources }
    }

    pub fn with_rss() -> Self {
        Self::new(vec![Box::new(rss::RssCollector::new())])
    }

    /// Resolve a source preference ("auto" or a source name) to a collector.
    /// Unknown names fall back to the first registered source; the mismatch
    /// is best-effort and only surfaces in logs.
    pub fn resolve(&self, preference: &str) -> Option<&dyn ReviewSource> {
        if !preference.eq_ignore_ascii_case("auto") {
            if let Some(src) = self
                .sources
                .iter()
                .find(|s| s.name().eq_ignore_ascii_case(preference))
            {
                return Some(src.as_ref());
            }
            tracing::warn!(preference, "unknown source preference, falling back");
        }
        self.sources.first().map(|s| s.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::types::ReviewRecord;

    struct NamedSource(&'static str);

    #[async_trait::async_trait]
    impl ReviewSource for NamedSource {
        async fn fetch(&self, _app_id: &str, _country: &str, _max_pages: u32) -> Vec<ReviewRecord> {
            Vec::new()
        }
        fn name(&self) -> &'static str {
            self.0
        }
    }

    #[test]
    fn auto_resolves_to_first_source() {
        let reg = SourceRegistry::new(vec![Box::new(NamedSource("rss")), Box::new(NamedSource("scraper"))]);
        assert_eq!(reg.resolve("auto").unwrap().name(), "rss");
    }

    #[test]
    fn named_preference_matches_case_insensitively() {
        let reg = SourceRegistry::new(vec![Box::new(NamedSource("rss")), Box::new(NamedSource("scraper"))]);
        assert_eq!(reg.resolve("SCRAPER").unwrap().name(), "scraper");
    }

    #[test]
    fn unknown_preference_falls_back_to_first() {
        let reg = SourceRegistry::new(vec![Box::new(NamedSource("rss"))]);
        assert_eq!(reg.resolve("connect").unwrap().name(), "rss");
    }

    #[test]
    fn empty_registry_resolves_to_none() {
        let reg = SourceRegistry::new(Vec::new());
        assert!(reg.resolve("auto").is_none());
    }
}
