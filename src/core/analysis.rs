//! 单次视频分析：并行逐帧匹配 logo，汇总后进入决策
//!
//! Frames are matched in chunks on a rayon pool (scatter), then reduced per
//! provider on the calling thread in frame order (gather). The wall-clock
//! budget and the cancellation token are checked between chunks.

use crate::core::config::DetectorConfig;
use crate::core::error::AnalysisError;
use crate::core::fusion::{AxisAggregator, AxisReport, DecisionEngine, DecisionInputs, Verdict};
use crate::core::provenance::{
    LogoMatch, LogoMatcher, LogoStore, PersistenceSummary, PersistenceTracker, ProvenanceClassifier,
    RegionGenerator, TextHint,
};
use crate::core::video::SampledFrame;
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// 可跨线程共享的取消标志
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub frames: Vec<SampledFrame>,
    pub axis_reports: Vec<AxisReport>,
    pub text_hint: TextHint,
    /// Identity reported by an external subject recogniser, if any.
    pub subject: Option<String>,
}

impl AnalysisRequest {
    pub fn new(frames: Vec<SampledFrame>) -> Self {
        Self {
            frames,
            axis_reports: Vec::new(),
            text_hint: TextHint::Absent,
            subject: None,
        }
    }

    pub fn with_axis_reports(mut self, reports: Vec<AxisReport>) -> Self {
        self.axis_reports = reports;
        self
    }

    pub fn with_text_hint(mut self, hint: TextHint) -> Self {
        self.text_hint = hint;
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Complete { verdict: Verdict },
    /// Cancelled by the caller; no verdict is built from partial data.
    Incomplete { reason: String, frames_processed: usize },
}

impl AnalysisOutcome {
    pub fn verdict(&self) -> Option<&Verdict> {
        match self {
            AnalysisOutcome::Complete { verdict } => Some(verdict),
            AnalysisOutcome::Incomplete { .. } => None,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// 分析统计
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisStats {
    pub analyses: u64,
    pub incomplete: u64,
    pub frames_decoded: u64,
    pub frames_skipped: u64,
}

enum FrameOutcome {
    Matched(BTreeMap<String, LogoMatch>),
    Skipped(String),
    Abandoned,
}

pub struct Analyzer {
    config: Arc<DetectorConfig>,
    logos: Arc<LogoStore>,
    pool: rayon::ThreadPool,
    workers: usize,
    stats: Arc<Mutex<AnalysisStats>>,
}

impl Analyzer {
    pub fn new(config: DetectorConfig, logos: LogoStore) -> Result<Self, AnalysisError> {
        Self::with_shared(Arc::new(config), Arc::new(logos))
    }

    /// Validates the config once; an invalid config never reaches a video.
    pub fn with_shared(config: Arc<DetectorConfig>, logos: Arc<LogoStore>) -> Result<Self, AnalysisError> {
        config.validate()?;

        let workers = match config.limits.worker_threads {
            0 => num_cpus::get().max(1),
            n => n,
        };
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("deepcheck-match-{i}"))
            .build()
            .map_err(|e| AnalysisError::WorkerPool(e.to_string()))?;

        info!("🔧 Analyzer ready: {} worker(s), {} logo provider(s)", workers, logos.providers().count());
        Ok(Self {
            config,
            logos,
            pool,
            workers,
            stats: Arc::new(Mutex::new(AnalysisStats::default())),
        })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn stats(&self) -> AnalysisStats {
        self.stats.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn analyze(&self, request: &AnalysisRequest, cancel: &CancellationToken) -> AnalysisOutcome {
        info!("🎬 Analysis started: {} frame(s)", request.frames.len());
        let started = Instant::now();
        let budget = Duration::from_millis(self.config.limits.time_budget_ms);
        let mut notes = Vec::new();

        let mut frames: Vec<&SampledFrame> = request.frames.iter().collect();
        frames.sort_by(|a, b| {
            a.timestamp_ms
                .cmp(&b.timestamp_ms)
                .then(a.frame_number.cmp(&b.frame_number))
        });
        let max_frames = self.config.limits.max_frames;
        if frames.len() > max_frames {
            notes.push(format!(
                "{} frames supplied, {} evenly spaced frames were analysed",
                frames.len(),
                max_frames
            ));
            frames = spread_indices(frames.len(), max_frames)
                .into_iter()
                .map(|i| frames[i])
                .collect();
        }

        let regions = RegionGenerator::new(self.config.regions.clone());
        let matcher = LogoMatcher::new(self.config.matcher.clone());
        let chunk_size = (self.workers * 2).max(1);

        let mut per_frame: Vec<BTreeMap<String, LogoMatch>> = Vec::with_capacity(frames.len());
        let mut skipped = 0usize;
        let mut visited = 0usize;

        for (chunk_index, chunk) in frames.chunks(chunk_size).enumerate() {
            if cancel.is_cancelled() {
                return self.incomplete(per_frame.len(), skipped);
            }
            if started.elapsed() >= budget {
                warn!(
                    "⏱️ Time budget {} ms exceeded after {} of {} frames, truncating",
                    budget.as_millis(),
                    visited,
                    frames.len()
                );
                notes.push(format!(
                    "Time budget of {} ms exceeded; timeline truncated to {} of {} frames",
                    budget.as_millis(),
                    visited,
                    frames.len()
                ));
                break;
            }

            let base_index = chunk_index * chunk_size;
            let outcomes: Vec<FrameOutcome> = self.pool.install(|| {
                chunk
                    .par_iter()
                    .enumerate()
                    .map(|(i, sampled)| self.process_frame(sampled, base_index + i, &regions, &matcher, cancel))
                    .collect()
            });

            for outcome in outcomes {
                visited += 1;
                match outcome {
                    FrameOutcome::Matched(matches) => per_frame.push(matches),
                    FrameOutcome::Skipped(reason) => {
                        skipped += 1;
                        notes.push(reason);
                    }
                    FrameOutcome::Abandoned => {}
                }
            }
        }

        if cancel.is_cancelled() {
            return self.incomplete(per_frame.len(), skipped);
        }

        let frames_analyzed = per_frame.len();
        let summaries = self.summarize(per_frame, frames_analyzed);
        let provenance = ProvenanceClassifier::new(&self.config.provenance, &self.config.lexicon).classify(
            &summaries,
            &request.text_hint,
            self.logos.missing_providers(),
        );
        let axes = AxisAggregator::new(&self.config.axis_rules).aggregate(&request.axis_reports);

        let verdict = DecisionEngine::new(Arc::clone(&self.config)).decide(&DecisionInputs {
            axes: &axes,
            provenance: &provenance,
            subject: request.subject.as_deref(),
            frames_analyzed,
            notes: &notes,
        });

        if let Ok(mut stats) = self.stats.lock() {
            stats.analyses += 1;
            stats.frames_decoded += frames_analyzed as u64;
            stats.frames_skipped += skipped as u64;
        }
        info!(
            "🎬 Analysis finished in {} ms: {} ({:.3})",
            started.elapsed().as_millis(),
            verdict.label.as_str(),
            verdict.final_score
        );
        AnalysisOutcome::Complete { verdict }
    }

    fn process_frame(
        &self,
        sampled: &SampledFrame,
        frame_index: usize,
        regions: &RegionGenerator,
        matcher: &LogoMatcher,
        cancel: &CancellationToken,
    ) -> FrameOutcome {
        if cancel.is_cancelled() {
            return FrameOutcome::Abandoned;
        }
        let frame = match sampled.decode() {
            Ok(frame) => frame,
            Err(e) => {
                warn!("⚠️ {}", e);
                return FrameOutcome::Skipped(format!("Skipped unreadable frame: {e}"));
            }
        };
        let candidates = regions.propose(&frame, frame_index, &sampled.text_boxes);
        let matches = matcher.best_matches(&frame, &candidates, &self.logos);
        debug!(
            "🔎 Frame {} ({} ms): {} region(s), {} provider match(es)",
            sampled.frame_number,
            sampled.timestamp_ms,
            candidates.len(),
            matches.len()
        );
        FrameOutcome::Matched(matches)
    }

    /// Gather step: every provider sees the complete set of analysed frames.
    fn summarize(
        &self,
        per_frame: Vec<BTreeMap<String, LogoMatch>>,
        frames_analyzed: usize,
    ) -> BTreeMap<String, PersistenceSummary> {
        let mut by_provider: BTreeMap<String, Vec<LogoMatch>> = BTreeMap::new();
        for matches in per_frame {
            for (provider, m) in matches {
                by_provider.entry(provider).or_default().push(m);
            }
        }

        by_provider
            .into_iter()
            .map(|(provider, matches)| {
                let tracker = PersistenceTracker::new(self.config.provenance.floor_for(&provider));
                let summary = tracker.summarize(&provider, frames_analyzed, &matches);
                debug!(
                    "📈 {}: persistence {:.2}, max similarity {:.2}, corner {:.2}",
                    provider, summary.persistence_fraction, summary.max_similarity, summary.corner_fraction
                );
                (provider, summary)
            })
            .collect()
    }

    fn incomplete(&self, frames_processed: usize, skipped: usize) -> AnalysisOutcome {
        warn!("🛑 Analysis cancelled after {} frame(s)", frames_processed);
        if let Ok(mut stats) = self.stats.lock() {
            stats.incomplete += 1;
            stats.frames_decoded += frames_processed as u64;
            stats.frames_skipped += skipped as u64;
        }
        AnalysisOutcome::Incomplete {
            reason: "cancelled by caller".to_string(),
            frames_processed,
        }
    }
}

/// `count` indices spread evenly over `0..len`, first and last included.
fn spread_indices(len: usize, count: usize) -> Vec<usize> {
    match count {
        0 => Vec::new(),
        1 => vec![0],
        _ if count >= len => (0..len).collect(),
        _ => (0..count).map(|i| i * (len - 1) / (count - 1)).collect(),
    }
}
