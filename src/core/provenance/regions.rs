use crate::core::config::RegionConfig;
use crate::core::video::{BoundingBox, Frame};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    TopCenter,
    BottomCenter,
}

/// 候选区域的来源启发式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionSource {
    Corner(Corner),
    Edge(Edge),
    /// Box handed over by the external OCR stage.
    TextBox,
    /// Bright caption band found in the lower part of the frame.
    TextBand,
}

impl RegionSource {
    pub fn is_corner(&self) -> bool {
        matches!(self, RegionSource::Corner(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionCandidate {
    pub frame_index: usize,
    pub bbox: BoundingBox,
    pub source: RegionSource,
}

pub struct RegionGenerator {
    config: RegionConfig,
}

impl RegionGenerator {
    pub fn new(config: RegionConfig) -> Self {
        Self { config }
    }

    /// Corners first, then edges, then text boxes and the caption band.
    pub fn propose(&self, frame: &Frame, frame_index: usize, text_boxes: &[BoundingBox]) -> Vec<RegionCandidate> {
        let (w, h) = (frame.width(), frame.height());
        let cw = ((w as f64 * self.config.corner_width_frac).round() as u32).clamp(1, w);
        let ch = ((h as f64 * self.config.corner_height_frac).round() as u32).clamp(1, h);

        let fixed = [
            (RegionSource::Corner(Corner::TopLeft), 0, 0),
            (RegionSource::Corner(Corner::TopRight), w - cw, 0),
            (RegionSource::Corner(Corner::BottomLeft), 0, h - ch),
            (RegionSource::Corner(Corner::BottomRight), w - cw, h - ch),
            (RegionSource::Edge(Edge::TopCenter), (w - cw) / 2, 0),
            (RegionSource::Edge(Edge::BottomCenter), (w - cw) / 2, h - ch),
        ];

        let mut candidates: Vec<RegionCandidate> = fixed
            .iter()
            .map(|(source, x, y)| RegionCandidate {
                frame_index,
                bbox: BoundingBox::new(*x, *y, cw, ch),
                source: *source,
            })
            .collect();

        candidates.extend(text_boxes.iter().filter_map(|b| {
            b.clip_to(w, h).map(|bbox| RegionCandidate {
                frame_index,
                bbox,
                source: RegionSource::TextBox,
            })
        }));

        if let Some((band_y, band_height)) = self.detect_caption_band(&frame.luma(), w, h) {
            candidates.push(RegionCandidate {
                frame_index,
                bbox: BoundingBox::new(0, band_y, w, band_height),
                source: RegionSource::TextBand,
            });
        }

        candidates
    }

    /// Tallest run of rows whose bright-pixel share exceeds the row ratio,
    /// searched from `band_scan_start` down. Returns `(y, height)`.
    fn detect_caption_band(&self, gray: &[u8], width: u32, height: u32) -> Option<(u32, u32)> {
        let w = width as usize;
        let h = height as usize;
        if w == 0 || h == 0 || gray.len() < w * h {
            return None;
        }

        let start_y = ((h as f64 * self.config.band_scan_start) as usize).min(h);

        // 找连续的高亮度行
        let mut best = (0usize, 0usize);
        let mut current_y = 0usize;
        let mut current_height = 0usize;

        for y in start_y..h {
            let row = &gray[y * w..(y + 1) * w];
            let bright = row.iter().filter(|&&v| v > self.config.band_brightness).count();
            if bright as f64 / w as f64 > self.config.band_row_ratio {
                if current_height == 0 {
                    current_y = y;
                }
                current_height += 1;
            } else {
                if current_height > best.1 {
                    best = (current_y, current_height);
                }
                current_height = 0;
            }
        }
        if current_height > best.1 {
            best = (current_y, current_height);
        }

        let min_height = ((h as f64 * self.config.min_band_frac) as usize).max(1);
        let max_height = (h as f64 * self.config.max_band_frac) as usize;
        let (band_y, band_height) = best;

        (band_height >= min_height && band_height <= max_height)
            .then_some((band_y as u32, band_height as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::video::SampledFrame;
    use image::{Rgba, RgbaImage};

    fn frame_from(img: RgbaImage) -> Frame {
        SampledFrame::from_image(0, 0, img).decode().unwrap()
    }

    #[test]
    fn test_corner_and_edge_geometry() {
        let frame = frame_from(RgbaImage::from_pixel(160, 120, Rgba([0, 0, 0, 255])));
        let generator = RegionGenerator::new(RegionConfig::default());
        let regions = generator.propose(&frame, 3, &[]);

        assert_eq!(regions.len(), 6);
        assert!(regions.iter().all(|r| r.frame_index == 3));
        let top_right = regions
            .iter()
            .find(|r| r.source == RegionSource::Corner(Corner::TopRight))
            .unwrap();
        assert_eq!(top_right.bbox, BoundingBox::new(120, 0, 40, 20));
        let bottom_center = regions
            .iter()
            .find(|r| r.source == RegionSource::Edge(Edge::BottomCenter))
            .unwrap();
        assert_eq!(bottom_center.bbox, BoundingBox::new(60, 100, 40, 20));
    }

    #[test]
    fn test_text_boxes_clipped_and_empty_dropped() {
        let frame = frame_from(RgbaImage::from_pixel(100, 100, Rgba([0, 0, 0, 255])));
        let generator = RegionGenerator::new(RegionConfig::default());
        let regions = generator.propose(
            &frame,
            0,
            &[BoundingBox::new(90, 90, 30, 30), BoundingBox::new(200, 0, 10, 10)],
        );
        let text: Vec<_> = regions.iter().filter(|r| r.source == RegionSource::TextBox).collect();
        assert_eq!(text.len(), 1);
        assert_eq!(text[0].bbox, BoundingBox::new(90, 90, 10, 10));
    }

    #[test]
    fn test_caption_band_detected() {
        let mut img = RgbaImage::from_pixel(200, 200, Rgba([20, 20, 20, 255]));
        for y in 160..172 {
            for x in 40..160 {
                img.put_pixel(x, y, Rgba([250, 250, 250, 255]));
            }
        }
        let frame = frame_from(img);
        let generator = RegionGenerator::new(RegionConfig::default());
        let band = generator
            .propose(&frame, 0, &[])
            .into_iter()
            .find(|r| r.source == RegionSource::TextBand)
            .unwrap();
        assert_eq!(band.bbox, BoundingBox::new(0, 160, 200, 12));
    }

    #[test]
    fn test_no_band_on_uniform_frame() {
        let frame = frame_from(RgbaImage::from_pixel(200, 200, Rgba([250, 250, 250, 255])));
        let generator = RegionGenerator::new(RegionConfig::default());
        assert!(generator
            .propose(&frame, 0, &[])
            .iter()
            .all(|r| r.source != RegionSource::TextBand));
    }
}
