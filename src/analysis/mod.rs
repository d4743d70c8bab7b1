pub mod fallback;
pub mod log;
pub mod normalizer;
pub mod router;

pub use log::{AnalysisLogger, LogError, MemoryAnalysisLog};
pub use normalizer::{ParseOutcome, ResponseNormalizer};
pub use router::ProviderRouter;
