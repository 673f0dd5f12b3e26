use crate::core::error::FrameError;
use image::RgbaImage;
use std::time::Duration;

/// 轴对齐矩形（像素坐标）
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn centroid(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }

    /// Intersection with a `width` x `height` frame; `None` when nothing is left.
    pub fn clip_to(&self, width: u32, height: u32) -> Option<BoundingBox> {
        if self.x >= width || self.y >= height {
            return None;
        }
        let w = self.width.min(width - self.x);
        let h = self.height.min(height - self.y);
        if w == 0 || h == 0 {
            return None;
        }
        Some(BoundingBox::new(self.x, self.y, w, h))
    }
}

/// 解码后的帧（RGBA）
#[derive(Debug, Clone)]
pub struct Frame {
    pub pixels: RgbaImage,
    pub timestamp: Duration,
    pub frame_number: u64,
}

impl Frame {
    pub fn new(pixels: RgbaImage, timestamp_ms: u64, frame_number: u64) -> Self {
        Self {
            pixels,
            timestamp: Duration::from_millis(timestamp_ms),
            frame_number,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixel_count(&self) -> usize {
        (self.width() as usize) * (self.height() as usize)
    }

    /// BT.601 luma, row-major.
    pub fn luma(&self) -> Vec<u8> {
        self.pixels
            .as_raw()
            .chunks_exact(4)
            .map(|px| {
                (0.299 * px[0] as f32 + 0.587 * px[1] as f32 + 0.114 * px[2] as f32).round() as u8
            })
            .collect()
    }

    /// Copies out a region; the box is clipped to the frame first.
    pub fn crop(&self, region: &BoundingBox) -> Option<RgbaImage> {
        let clipped = region.clip_to(self.width(), self.height())?;
        Some(
            image::imageops::crop_imm(
                &self.pixels,
                clipped.x,
                clipped.y,
                clipped.width,
                clipped.height,
            )
            .to_image(),
        )
    }
}

/// 原生层传入的 YUV420 平面数据
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    pub y_plane: Vec<u8>,
    pub u_plane: Vec<u8>,
    pub v_plane: Vec<u8>,
}

impl RawFrame {
    fn chroma_len(&self) -> usize {
        (self.width.div_ceil(2) as usize) * (self.height.div_ceil(2) as usize)
    }

    pub fn to_rgba(&self, frame_number: u64) -> Result<RgbaImage, FrameError> {
        let luma_len = (self.width as usize) * (self.height as usize);
        let chroma_len = self.chroma_len();
        if self.y_plane.len() < luma_len {
            return Err(FrameError::BufferSize {
                frame_number,
                expected: luma_len,
                actual: self.y_plane.len(),
            });
        }
        for plane in [&self.u_plane, &self.v_plane] {
            if plane.len() < chroma_len {
                return Err(FrameError::BufferSize {
                    frame_number,
                    expected: chroma_len,
                    actual: plane.len(),
                });
            }
        }

        let chroma_width = self.width.div_ceil(2);
        let mut rgba_data = vec![0u8; luma_len * 4];

        for y in 0..self.height {
            for x in 0..self.width {
                let y_idx = (y * self.width + x) as usize;
                let uv_idx = ((y / 2) * chroma_width + x / 2) as usize;

                let y_val = self.y_plane[y_idx] as f32;
                let u_val = self.u_plane[uv_idx] as f32 - 128.0;
                let v_val = self.v_plane[uv_idx] as f32 - 128.0;

                let r = (y_val + 1.402 * v_val).clamp(0.0, 255.0) as u8;
                let g = (y_val - 0.344136 * u_val - 0.714136 * v_val).clamp(0.0, 255.0) as u8;
                let b = (y_val + 1.772 * u_val).clamp(0.0, 255.0) as u8;

                let rgba_idx = y_idx * 4;
                rgba_data[rgba_idx] = r;
                rgba_data[rgba_idx + 1] = g;
                rgba_data[rgba_idx + 2] = b;
                rgba_data[rgba_idx + 3] = 255;
            }
        }

        RgbaImage::from_raw(self.width, self.height, rgba_data).ok_or(FrameError::BufferSize {
            frame_number,
            expected: luma_len * 4,
            actual: 0,
        })
    }
}

/// 帧的像素来源
#[derive(Debug, Clone)]
pub enum FramePayload {
    Rgba {
        width: u32,
        height: u32,
        data: Vec<u8>,
    },
    Yuv420(RawFrame),
    /// PNG / JPEG / BMP bytes
    Encoded(Vec<u8>),
}

/// 调用方采样得到的一帧，附带可选的 OCR 文字框
#[derive(Debug, Clone)]
pub struct SampledFrame {
    pub timestamp_ms: u64,
    pub frame_number: u64,
    pub payload: FramePayload,
    pub text_boxes: Vec<BoundingBox>,
}

impl SampledFrame {
    pub fn rgba(timestamp_ms: u64, frame_number: u64, width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            timestamp_ms,
            frame_number,
            payload: FramePayload::Rgba {
                width,
                height,
                data,
            },
            text_boxes: Vec::new(),
        }
    }

    pub fn from_image(timestamp_ms: u64, frame_number: u64, image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self::rgba(timestamp_ms, frame_number, width, height, image.into_raw())
    }

    pub fn with_text_boxes(mut self, boxes: Vec<BoundingBox>) -> Self {
        self.text_boxes = boxes;
        self
    }

    pub fn decode(&self) -> Result<Frame, FrameError> {
        let frame_number = self.frame_number;
        let pixels = match &self.payload {
            FramePayload::Rgba {
                width,
                height,
                data,
            } => {
                check_dimensions(frame_number, *width, *height)?;
                let expected = (*width as usize) * (*height as usize) * 4;
                if data.len() != expected {
                    return Err(FrameError::BufferSize {
                        frame_number,
                        expected,
                        actual: data.len(),
                    });
                }
                RgbaImage::from_raw(*width, *height, data.clone()).ok_or(FrameError::BufferSize {
                    frame_number,
                    expected,
                    actual: data.len(),
                })?
            }
            FramePayload::Yuv420(raw) => {
                check_dimensions(frame_number, raw.width, raw.height)?;
                raw.to_rgba(frame_number)?
            }
            FramePayload::Encoded(bytes) => {
                let decoded = image::load_from_memory(bytes)
                    .map_err(|source| FrameError::Decode {
                        frame_number,
                        source,
                    })?
                    .to_rgba8();
                check_dimensions(frame_number, decoded.width(), decoded.height())?;
                decoded
            }
        };

        Ok(Frame::new(pixels, self.timestamp_ms, frame_number))
    }
}

fn check_dimensions(frame_number: u64, width: u32, height: u32) -> Result<(), FrameError> {
    if width == 0 || height == 0 {
        return Err(FrameError::EmptyDimensions {
            frame_number,
            width,
            height,
        });
    }
    Ok(())
}
