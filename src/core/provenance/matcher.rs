//! Multi-method logo similarity.
//!
//! A region crop is compared against a reference logo with four independent
//! methods, combined by weighted mean over the methods that produced a score:
//! 1. **Template** - alpha-weighted normalized cross-correlation, peak over
//!    logo sizes and offsets inside the crop
//! 2. **Feature** - Harris corners with BRIEF descriptors, Hamming matching
//!    with a distance-ratio test
//! 3. **Histogram** - RGB histogram correlation
//! 4. **Structural** - windowed SSIM on luma
//!
//! The template search also fixes where the logo sits in the crop. The other
//! three methods then compare only that window with the logo, both resampled
//! to a common working resolution, so a small corner watermark is not diluted
//! by the background around it.

use crate::core::config::MatcherConfig;
use crate::core::provenance::logo_store::{LogoStore, ReferenceLogo};
use crate::core::provenance::regions::RegionCandidate;
use crate::core::video::Frame;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::BTreeMap;

const TEMPLATE_STEP: usize = 2;
/// Smallest logo side, in search pixels, worth sliding over a crop.
const MIN_TEMPLATE_SIDE: usize = 6;

const SSIM_WINDOW: usize = 8;
const SSIM_C1: f64 = (0.01 * 255.0) * (0.01 * 255.0);
const SSIM_C2: f64 = (0.03 * 255.0) * (0.03 * 255.0);

const HARRIS_K: f64 = 0.04;
/// Corner responses below this share of the strongest response are dropped.
const HARRIS_RELATIVE_FLOOR: f64 = 0.01;
/// Below this many logo keypoints the feature method abstains.
const MIN_LOGO_KEYPOINTS: usize = 4;
const BRIEF_RADIUS: i32 = 4;
const BRIEF_BITS: usize = 128;
const KEYPOINT_MARGIN: usize = BRIEF_RADIUS as usize + 1;

/// Fixed-seed sampling pattern, identical across runs.
static BRIEF_PATTERN: Lazy<Vec<[i32; 4]>> = Lazy::new(|| {
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    let span = (2 * BRIEF_RADIUS + 1) as u64;
    let mut next = move || {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        ((state >> 33) % span) as i32 - BRIEF_RADIUS
    };
    (0..BRIEF_BITS).map(|_| [next(), next(), next(), next()]).collect()
});

/// 四种方法的分项得分
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MethodScores {
    pub template: f64,
    /// `None` when the logo has too few keypoints for the method to say anything.
    pub feature: Option<f64>,
    pub histogram: f64,
    pub structural: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogoMatch {
    pub provider: String,
    pub frame_index: usize,
    pub timestamp_ms: u64,
    #[serde(skip)]
    pub region: RegionCandidate,
    pub logo_label: String,
    pub scores: MethodScores,
    pub similarity: f64,
}

pub struct LogoMatcher {
    config: MatcherConfig,
}

impl LogoMatcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    /// Combined similarity in [0, 1]; 0 for crops under the minimum side.
    pub fn similarity(&self, crop: &RgbaImage, logo: &RgbaImage) -> f64 {
        self.combine(&self.compare(crop, logo))
    }

    /// Scores the logo against the best-matching window inside the crop, so a
    /// watermark smaller than its region is compared at its own size.
    pub fn compare(&self, crop: &RgbaImage, logo: &RgbaImage) -> MethodScores {
        let (cw, ch) = crop.dimensions();
        if cw.min(ch) < self.config.min_crop_side || logo.width() == 0 || logo.height() == 0 {
            return MethodScores::default();
        }

        let placement = self.locate(crop, logo);
        let window = imageops::crop_imm(crop, placement.x, placement.y, placement.width, placement.height).to_image();

        let (w, h) = working_dims(window.width(), window.height(), self.config.working_size);
        let window_patch = Patch::from_image(&imageops::resize(&window, w, h, FilterType::Triangle));
        let logo_patch = Patch::from_image(&imageops::resize(logo, w, h, FilterType::Triangle));

        MethodScores {
            template: placement.score.clamp(0.0, 1.0),
            feature: self.feature_score(&window_patch, &logo_patch),
            histogram: histogram_correlation(&window_patch, &logo_patch, self.config.histogram_bins),
            structural: structural_similarity(&window_patch, &logo_patch),
        }
    }

    pub fn combine(&self, scores: &MethodScores) -> f64 {
        let c = &self.config;
        let mut parts = vec![
            (c.template_weight, scores.template),
            (c.histogram_weight, scores.histogram),
            (c.structural_weight, scores.structural),
        ];
        if let Some(feature) = scores.feature {
            parts.push((c.feature_weight, feature));
        }
        let total: f64 = parts.iter().map(|(w, _)| w).sum();
        if total <= 0.0 {
            return 0.0;
        }
        (parts.iter().map(|(w, s)| w * s).sum::<f64>() / total).clamp(0.0, 1.0)
    }

    /// Best match per matchable provider over all regions of one frame.
    /// Regions are visited in order and ties keep the earlier region.
    pub fn best_matches(
        &self,
        frame: &Frame,
        regions: &[RegionCandidate],
        store: &LogoStore,
    ) -> BTreeMap<String, LogoMatch> {
        let mut best: BTreeMap<String, LogoMatch> = BTreeMap::new();
        let timestamp_ms = frame.timestamp.as_millis() as u64;

        for region in regions {
            let Some(crop) = frame.crop(&region.bbox) else {
                continue;
            };
            for provider in store.providers() {
                let Some(candidate) =
                    self.match_variants(&crop, region, provider, store.variants(provider), timestamp_ms)
                else {
                    continue;
                };
                let replace = best
                    .get(provider)
                    .map_or(true, |current| candidate.similarity > current.similarity);
                if replace {
                    best.insert(provider.to_string(), candidate);
                }
            }
        }
        best
    }

    fn match_variants(
        &self,
        crop: &RgbaImage,
        region: &RegionCandidate,
        provider: &str,
        variants: &[ReferenceLogo],
        timestamp_ms: u64,
    ) -> Option<LogoMatch> {
        let mut best: Option<LogoMatch> = None;
        for logo in variants {
            let scores = self.compare(crop, &logo.image);
            let similarity = self.combine(&scores);
            if best.as_ref().map_or(true, |b| similarity > b.similarity) {
                best = Some(LogoMatch {
                    provider: provider.to_string(),
                    frame_index: region.frame_index,
                    timestamp_ms,
                    region: *region,
                    logo_label: logo.label.clone(),
                    scores,
                    similarity,
                });
            }
        }
        best
    }

    /// Where the logo sits inside the crop. A coarse pass slides every logo
    /// size from `min_logo_scale` up to the largest fit over a downscaled
    /// copy of the crop; a promising hit is then re-aligned at full resolution.
    fn locate(&self, crop: &RgbaImage, logo: &RgbaImage) -> Placement {
        let (cw, ch) = crop.dimensions();
        let scale = (self.config.search_size as f64 / cw.max(ch) as f64).min(1.0);
        let search = if scale < 1.0 {
            let (sw, sh) = working_dims(cw, ch, self.config.search_size);
            Patch::from_image(&imageops::resize(crop, sw, sh, FilterType::Triangle))
        } else {
            Patch::from_image(crop)
        };
        let sx = search.width as f64 / cw as f64;
        let sy = search.height as f64 / ch as f64;

        let Some(coarse) = self.coarse_search(&search, logo) else {
            // 裁剪区放不下任何尺寸的 logo，按整块对齐打分
            let template = Patch::from_image(&imageops::resize(
                logo,
                search.width as u32,
                search.height as u32,
                FilterType::Triangle,
            ));
            return Placement {
                x: 0,
                y: 0,
                width: cw,
                height: ch,
                score: weighted_ncc(&search, 0, 0, &template),
            };
        };

        let width = ((coarse.width as f64 / sx).round() as u32).clamp(1, cw);
        let height = ((coarse.height as f64 / sy).round() as u32).clamp(1, ch);
        let mapped = Placement {
            x: ((coarse.x as f64 / sx).round() as u32).min(cw - width),
            y: ((coarse.y as f64 / sy).round() as u32).min(ch - height),
            width,
            height,
            score: coarse.score,
        };

        if scale >= 1.0 || coarse.score < self.config.refine_floor {
            return mapped;
        }
        self.refine(crop, logo, mapped, 1.0 / sx.min(sy))
    }

    /// Heights are tried on a stride first, then the two heights next to the
    /// best one.
    fn coarse_search(&self, search: &Patch, logo: &RgbaImage) -> Option<Placement> {
        let aspect = logo.width() as f64 / logo.height() as f64;
        let max_h = (search.height as f64).min(search.width as f64 / aspect).floor() as usize;
        let min_h = ((max_h as f64 * self.config.min_logo_scale).ceil() as usize).max(MIN_TEMPLATE_SIDE);
        if min_h > max_h {
            return None;
        }

        let mut best: Option<Placement> = None;
        for th in (min_h..=max_h).step_by(TEMPLATE_STEP) {
            try_height(search, logo, aspect, th, &mut best);
        }
        if let Some(coarse) = best {
            let th = coarse.height as usize;
            for neighbour in [th.saturating_sub(1), th + 1] {
                if (min_h..=max_h).contains(&neighbour) {
                    try_height(search, logo, aspect, neighbour, &mut best);
                }
            }
        }
        best
    }

    /// Full-resolution alignment around a coarse hit: positions and heights
    /// within about one coarse pixel.
    fn refine(&self, crop: &RgbaImage, logo: &RgbaImage, coarse: Placement, step: f64) -> Placement {
        let (cw, ch) = crop.dimensions();
        let aspect = logo.width() as f64 / logo.height() as f64;
        let shift = step.ceil() as i64 + 1;
        let grow = step.ceil() as i64;
        let full = Patch::from_image(crop);

        let mut best = coarse;
        let mut best_score = f64::NEG_INFINITY;
        for dh in -grow..=grow {
            let th = coarse.height as i64 + dh;
            if th < MIN_TEMPLATE_SIDE as i64 || th > ch as i64 {
                continue;
            }
            let tw = (th as f64 * aspect).round() as i64;
            if tw < MIN_TEMPLATE_SIDE as i64 || tw > cw as i64 {
                continue;
            }
            let template = Patch::from_image(&imageops::resize(logo, tw as u32, th as u32, FilterType::Triangle));
            for dy in -shift..=shift {
                for dx in -shift..=shift {
                    let x = coarse.x as i64 + dx;
                    let y = coarse.y as i64 + dy;
                    if x < 0 || y < 0 || x + tw > cw as i64 || y + th > ch as i64 {
                        continue;
                    }
                    let score = weighted_ncc(&full, x as usize, y as usize, &template);
                    if score > best_score {
                        best_score = score;
                        best = Placement {
                            x: x as u32,
                            y: y as u32,
                            width: tw as u32,
                            height: th as u32,
                            score,
                        };
                    }
                }
            }
        }
        best
    }

    fn feature_score(&self, crop: &Patch, logo: &Patch) -> Option<f64> {
        let logo_keypoints = detect_keypoints(logo, self.config.max_keypoints);
        if logo_keypoints.len() < MIN_LOGO_KEYPOINTS {
            return None;
        }
        let crop_keypoints = detect_keypoints(crop, self.config.max_keypoints);
        if crop_keypoints.is_empty() {
            return Some(0.0);
        }

        let logo_smooth = box_blur(&logo.gray, logo.width, logo.height);
        let crop_smooth = box_blur(&crop.gray, crop.width, crop.height);
        let logo_desc: Vec<[u64; 2]> = logo_keypoints
            .iter()
            .map(|k| brief_descriptor(&logo_smooth, logo.width, k))
            .collect();
        let crop_desc: Vec<[u64; 2]> = crop_keypoints
            .iter()
            .map(|k| brief_descriptor(&crop_smooth, crop.width, k))
            .collect();

        let mut matches = 0usize;
        for d in &logo_desc {
            let mut best = u32::MAX;
            let mut second = u32::MAX;
            for c in &crop_desc {
                let dist = hamming(d, c);
                if dist < best {
                    second = best;
                    best = dist;
                } else if dist < second {
                    second = dist;
                }
            }
            let passes_ratio = second == u32::MAX || best as f64 <= self.config.ratio_test * second as f64;
            if best <= self.config.max_descriptor_distance && passes_ratio {
                matches += 1;
            }
        }

        let expected = (self.config.expected_match_fraction * logo_keypoints.len() as f64).max(1.0);
        Some((matches as f64 / expected).min(1.0))
    }
}

fn working_dims(width: u32, height: u32, working_size: u32) -> (u32, u32) {
    let scale = working_size as f64 / width.max(height) as f64;
    (
        ((width as f64 * scale).round() as u32).max(1),
        ((height as f64 * scale).round() as u32).max(1),
    )
}

/// 模板在裁剪区内的位置（裁剪区像素坐标）
#[derive(Debug, Clone, Copy, PartialEq)]
struct Placement {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    score: f64,
}

fn try_height(search: &Patch, logo: &RgbaImage, aspect: f64, th: usize, best: &mut Option<Placement>) {
    let tw = ((th as f64 * aspect).round() as usize).min(search.width);
    if tw < MIN_TEMPLATE_SIDE {
        return;
    }
    let template = Patch::from_image(&imageops::resize(logo, tw as u32, th as u32, FilterType::Triangle));
    let (x, y, score) = best_offset(search, &template);
    if best.map_or(true, |b| score > b.score) {
        *best = Some(Placement {
            x: x as u32,
            y: y as u32,
            width: tw as u32,
            height: th as u32,
            score,
        });
    }
}

/// Peak NCC offset: a strided scan, then every offset around the best one.
fn best_offset(crop: &Patch, template: &Patch) -> (usize, usize, f64) {
    let max_x = crop.width - template.width;
    let max_y = crop.height - template.height;
    let mut best = (0, 0, f64::NEG_INFINITY);
    for oy in (0..=max_y).step_by(TEMPLATE_STEP) {
        for ox in (0..=max_x).step_by(TEMPLATE_STEP) {
            let score = weighted_ncc(crop, ox, oy, template);
            if score > best.2 {
                best = (ox, oy, score);
            }
        }
    }

    let (bx, by, _) = best;
    let reach = TEMPLATE_STEP - 1;
    for oy in by.saturating_sub(reach)..=(by + reach).min(max_y) {
        for ox in bx.saturating_sub(reach)..=(bx + reach).min(max_x) {
            let score = weighted_ncc(crop, ox, oy, template);
            if score > best.2 {
                best = (ox, oy, score);
            }
        }
    }
    best
}

/// 工作分辨率下的像素网格
struct Patch {
    width: usize,
    height: usize,
    rgb: Vec<[u8; 3]>,
    gray: Vec<f64>,
    /// 0..=1; 1 everywhere for frame crops.
    alpha: Vec<f64>,
}

impl Patch {
    fn from_image(img: &RgbaImage) -> Self {
        let (width, height) = (img.width() as usize, img.height() as usize);
        let mut rgb = Vec::with_capacity(width * height);
        let mut gray = Vec::with_capacity(width * height);
        let mut alpha = Vec::with_capacity(width * height);
        for px in img.pixels() {
            let [r, g, b, a] = px.0;
            rgb.push([r, g, b]);
            gray.push(0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64);
            alpha.push(a as f64 / 255.0);
        }
        Self {
            width,
            height,
            rgb,
            gray,
            alpha,
        }
    }
}

/// NCC between the template and the crop window at (ox, oy), weighted by the
/// template's alpha.
fn weighted_ncc(crop: &Patch, ox: usize, oy: usize, template: &Patch) -> f64 {
    let mut sum_w = 0.0;
    let mut sum_c = 0.0;
    let mut sum_t = 0.0;
    for ty in 0..template.height {
        for tx in 0..template.width {
            let t_idx = ty * template.width + tx;
            let c_idx = (oy + ty) * crop.width + ox + tx;
            let w = template.alpha[t_idx];
            sum_w += w;
            sum_c += w * crop.gray[c_idx];
            sum_t += w * template.gray[t_idx];
        }
    }
    if sum_w < 1e-9 {
        return 0.0;
    }
    let mean_c = sum_c / sum_w;
    let mean_t = sum_t / sum_w;

    let mut numerator = 0.0;
    let mut denom_c = 0.0;
    let mut denom_t = 0.0;
    for ty in 0..template.height {
        for tx in 0..template.width {
            let t_idx = ty * template.width + tx;
            let c_idx = (oy + ty) * crop.width + ox + tx;
            let w = template.alpha[t_idx];
            let dc = crop.gray[c_idx] - mean_c;
            let dt = template.gray[t_idx] - mean_t;
            numerator += w * dc * dt;
            denom_c += w * dc * dc;
            denom_t += w * dt * dt;
        }
    }

    let denom = (denom_c * denom_t).sqrt();
    if denom < 1e-10 {
        0.0
    } else {
        numerator / denom
    }
}

fn histogram(patch: &Patch, weights: Option<&[f64]>, bins: usize) -> Vec<f64> {
    let mut hist = vec![0.0; bins * bins * bins];
    for (i, [r, g, b]) in patch.rgb.iter().enumerate() {
        let w = weights.map_or(1.0, |ws| ws[i]);
        let bin = |v: u8| v as usize * bins / 256;
        hist[(bin(*r) * bins + bin(*g)) * bins + bin(*b)] += w;
    }
    let total: f64 = hist.iter().sum();
    if total > 0.0 {
        hist.iter_mut().for_each(|v| *v /= total);
    }
    hist
}

/// Pearson correlation of the two colour histograms; the logo's transparent
/// pixels are left out of its histogram.
fn histogram_correlation(crop: &Patch, logo: &Patch, bins: usize) -> f64 {
    let hc = histogram(crop, None, bins);
    let hl = histogram(logo, Some(&logo.alpha), bins);
    let n = hc.len() as f64;
    let mean_c = hc.iter().sum::<f64>() / n;
    let mean_l = hl.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_c = 0.0;
    let mut var_l = 0.0;
    for (c, l) in hc.iter().zip(&hl) {
        cov += (c - mean_c) * (l - mean_l);
        var_c += (c - mean_c).powi(2);
        var_l += (l - mean_l).powi(2);
    }
    let denom = (var_c * var_l).sqrt();
    if denom < 1e-12 {
        return 0.0;
    }
    (cov / denom).clamp(0.0, 1.0)
}

/// Mean SSIM over sliding windows, each window weighted by the logo's mean alpha.
fn structural_similarity(crop: &Patch, logo: &Patch) -> f64 {
    let win = SSIM_WINDOW.min(crop.width).min(crop.height);
    let stride = (win / 2).max(1);
    let n = (win * win) as f64;

    let mut total = 0.0;
    let mut total_weight = 0.0;
    for oy in (0..=crop.height - win).step_by(stride) {
        for ox in (0..=crop.width - win).step_by(stride) {
            let (mut sx, mut sy, mut sa) = (0.0, 0.0, 0.0);
            for y in oy..oy + win {
                for x in ox..ox + win {
                    let idx = y * crop.width + x;
                    sx += crop.gray[idx];
                    sy += logo.gray[idx];
                    sa += logo.alpha[idx];
                }
            }
            let weight = sa / n;
            if weight <= 0.0 {
                continue;
            }
            let (mx, my) = (sx / n, sy / n);
            let (mut vx, mut vy, mut cxy) = (0.0, 0.0, 0.0);
            for y in oy..oy + win {
                for x in ox..ox + win {
                    let idx = y * crop.width + x;
                    let dx = crop.gray[idx] - mx;
                    let dy = logo.gray[idx] - my;
                    vx += dx * dx;
                    vy += dy * dy;
                    cxy += dx * dy;
                }
            }
            let (vx, vy, cxy) = (vx / n, vy / n, cxy / n);
            let ssim = ((2.0 * mx * my + SSIM_C1) * (2.0 * cxy + SSIM_C2))
                / ((mx * mx + my * my + SSIM_C1) * (vx + vy + SSIM_C2));
            total += weight * ssim;
            total_weight += weight;
        }
    }

    if total_weight <= 0.0 {
        return 0.0;
    }
    (total / total_weight).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy)]
struct Keypoint {
    x: usize,
    y: usize,
    response: f64,
}

/// Harris corners with 3x3 non-maximum suppression, strongest first.
fn detect_keypoints(patch: &Patch, max_keypoints: usize) -> Vec<Keypoint> {
    let (w, h) = (patch.width, patch.height);
    if w <= 2 * KEYPOINT_MARGIN || h <= 2 * KEYPOINT_MARGIN {
        return Vec::new();
    }

    let g = &patch.gray;
    let mut ixx = vec![0.0; w * h];
    let mut iyy = vec![0.0; w * h];
    let mut ixy = vec![0.0; w * h];
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let at = |dy: isize, dx: isize| g[(y as isize + dy) as usize * w + (x as isize + dx) as usize];
            let gx = -at(-1, -1) + at(-1, 1) - 2.0 * at(0, -1) + 2.0 * at(0, 1) - at(1, -1) + at(1, 1);
            let gy = -at(-1, -1) - 2.0 * at(-1, 0) - at(-1, 1) + at(1, -1) + 2.0 * at(1, 0) + at(1, 1);
            let idx = y * w + x;
            ixx[idx] = gx * gx;
            iyy[idx] = gy * gy;
            ixy[idx] = gx * gy;
        }
    }

    let mut response = vec![0.0; w * h];
    let mut strongest = 0.0_f64;
    for y in 2..h - 2 {
        for x in 2..w - 2 {
            let (mut a, mut b, mut c) = (0.0, 0.0, 0.0);
            for yy in y - 1..=y + 1 {
                for xx in x - 1..=x + 1 {
                    let idx = yy * w + xx;
                    a += ixx[idx];
                    b += iyy[idx];
                    c += ixy[idx];
                }
            }
            let r = a * b - c * c - HARRIS_K * (a + b) * (a + b);
            response[y * w + x] = r;
            strongest = strongest.max(r);
        }
    }
    if strongest <= 0.0 {
        return Vec::new();
    }

    let floor = strongest * HARRIS_RELATIVE_FLOOR;
    let mut keypoints = Vec::new();
    for y in KEYPOINT_MARGIN..h - KEYPOINT_MARGIN {
        for x in KEYPOINT_MARGIN..w - KEYPOINT_MARGIN {
            let idx = y * w + x;
            let r = response[idx];
            if r <= floor {
                continue;
            }
            // 平台区域只保留扫描顺序上的第一个点
            let is_peak = (y - 1..=y + 1).all(|yy| {
                (x - 1..=x + 1).all(|xx| {
                    let n = yy * w + xx;
                    n == idx || (n < idx && response[n] < r) || (n > idx && response[n] <= r)
                })
            });
            if is_peak {
                keypoints.push(Keypoint { x, y, response: r });
            }
        }
    }

    keypoints.sort_by(|a, b| {
        b.response
            .total_cmp(&a.response)
            .then(a.y.cmp(&b.y))
            .then(a.x.cmp(&b.x))
    });
    keypoints.truncate(max_keypoints);
    keypoints
}

fn box_blur(gray: &[f64], w: usize, h: usize) -> Vec<f64> {
    let mut out = vec![0.0; w * h];
    for y in 0..h {
        for x in 0..w {
            let mut sum = 0.0;
            let mut count = 0.0;
            for yy in y.saturating_sub(1)..=(y + 1).min(h - 1) {
                for xx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
                    sum += gray[yy * w + xx];
                    count += 1.0;
                }
            }
            out[y * w + x] = sum / count;
        }
    }
    out
}

fn brief_descriptor(smooth: &[f64], width: usize, k: &Keypoint) -> [u64; 2] {
    let mut bits = [0u64; 2];
    let at = |dx: i32, dy: i32| smooth[(k.y as i32 + dy) as usize * width + (k.x as i32 + dx) as usize];
    for (i, [x1, y1, x2, y2]) in BRIEF_PATTERN.iter().enumerate() {
        if at(*x1, *y1) < at(*x2, *y2) {
            bits[i / 64] |= 1 << (i % 64);
        }
    }
    bits
}

fn hamming(a: &[u64; 2], b: &[u64; 2]) -> u32 {
    (a[0] ^ b[0]).count_ones() + (a[1] ^ b[1]).count_ones()
}
