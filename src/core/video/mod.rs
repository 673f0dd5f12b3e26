pub mod frame;

pub use frame::{BoundingBox, Frame, FramePayload, RawFrame, SampledFrame};
