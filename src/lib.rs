pub mod api;
pub mod core;

pub use crate::api::VideoAnalyzer;
pub use crate::core::analysis::{AnalysisOutcome, AnalysisRequest, AnalysisStats, Analyzer, CancellationToken};
pub use crate::core::config::DetectorConfig;
pub use crate::core::error::{AnalysisError, ConfigError, FrameError, LogoStoreError};
pub use crate::core::fusion::{Axis, AxisReport, Label, Verdict};
pub use crate::core::provenance::{LogoStore, ProvenanceType, TextHint};
pub use crate::core::video::{BoundingBox, SampledFrame};
