pub mod classifier;
pub mod lexicon;
pub mod logo_store;
pub mod matcher;
pub mod persistence;
pub mod regions;

pub use classifier::{ProvenanceClassifier, ProvenanceResult, ProvenanceType, TextHint};
pub use logo_store::{LogoStore, ReferenceLogo};
pub use matcher::{LogoMatch, LogoMatcher, MethodScores};
pub use persistence::{PersistenceSummary, PersistenceTracker};
pub use regions::{RegionCandidate, RegionGenerator, RegionSource};
