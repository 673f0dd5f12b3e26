use crate::core::provenance::matcher::LogoMatch;
use serde::Serialize;

/// 单个 provider 在整个采样时间线上的汇总
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersistenceSummary {
    pub provider: String,
    pub frames_sampled: usize,
    pub frames_detected: usize,
    pub persistence_fraction: f64,
    /// 1 for a fixed position, falling toward 0 as the detected centroids wander.
    pub region_stability: f64,
    pub max_similarity: f64,
    /// Share of detected frames whose best region was a corner.
    pub corner_fraction: f64,
    /// Longest run of consecutive detected frames in timestamp order.
    pub longest_run: usize,
}

pub struct PersistenceTracker {
    detection_floor: f64,
}

impl PersistenceTracker {
    pub fn new(detection_floor: f64) -> Self {
        Self { detection_floor }
    }

    /// `frames_sampled` counts every decoded frame of the run, including those
    /// where this provider produced no match at all. Input order does not matter.
    pub fn summarize(&self, provider: &str, frames_sampled: usize, matches: &[LogoMatch]) -> PersistenceSummary {
        let mut ordered: Vec<&LogoMatch> = matches.iter().collect();
        ordered.sort_by(|a, b| {
            a.timestamp_ms
                .cmp(&b.timestamp_ms)
                .then(a.frame_index.cmp(&b.frame_index))
        });

        let detected: Vec<&LogoMatch> = ordered
            .iter()
            .copied()
            .filter(|m| m.similarity >= self.detection_floor)
            .collect();

        let persistence_fraction = if frames_sampled == 0 {
            0.0
        } else {
            (detected.len() as f64 / frames_sampled as f64).min(1.0)
        };

        let max_similarity = ordered.iter().map(|m| m.similarity).fold(0.0_f64, f64::max);

        let corner_fraction = if detected.is_empty() {
            0.0
        } else {
            detected.iter().filter(|m| m.region.source.is_corner()).count() as f64 / detected.len() as f64
        };

        let mut longest_run = 0usize;
        let mut run = 0usize;
        for m in &ordered {
            if m.similarity >= self.detection_floor {
                run += 1;
                longest_run = longest_run.max(run);
            } else {
                run = 0;
            }
        }

        PersistenceSummary {
            provider: provider.to_string(),
            frames_sampled,
            frames_detected: detected.len(),
            persistence_fraction,
            region_stability: region_stability(&detected),
            max_similarity,
            corner_fraction,
            longest_run,
        }
    }
}

fn region_stability(detected: &[&LogoMatch]) -> f64 {
    if detected.is_empty() {
        return 0.0;
    }
    let n = detected.len() as f64;
    let centroids: Vec<(f64, f64)> = detected.iter().map(|m| m.region.bbox.centroid()).collect();
    let mean_x = centroids.iter().map(|c| c.0).sum::<f64>() / n;
    let mean_y = centroids.iter().map(|c| c.1).sum::<f64>() / n;
    let variance = centroids
        .iter()
        .map(|(x, y)| (x - mean_x).powi(2) + (y - mean_y).powi(2))
        .sum::<f64>()
        / n;
    let mean_diagonal = detected
        .iter()
        .map(|m| (m.region.bbox.width as f64).hypot(m.region.bbox.height as f64))
        .sum::<f64>()
        / n;
    if mean_diagonal <= 0.0 {
        return 0.0;
    }
    1.0 / (1.0 + variance.sqrt() / mean_diagonal)
}
