pub mod enrichment;
pub mod refresh;
pub mod similarity;
pub mod stats;
pub mod translations;

pub use enrichment::EnrichmentService;
pub use refresh::RefreshService;
pub use translations::TranslationService;
