//! Recycling NV12 (`420f`) to interleaved ARGB/RGB conversion for camera frames.
//!
//! [`FrameConverter`] owns a reusable output buffer and converts full range
//! BT.709 bi-planar 4:2:0 frames into it. [`ConverterGate`] puts a converter
//! behind a drop-while-busy section for capture callbacks.
#![forbid(unsafe_code)]

mod built_coefficients;
mod conversion_matrix;
mod converter;
mod gate;
mod images;
mod numerics;
mod scratch;
mod transform;
mod yuv_error;
mod yuv_nv_to_rgba;
mod yuv_support;

pub use yuv_support::CbCrInverseTransform;
pub use yuv_support::OutputLayout;
pub use yuv_support::YuvBias;
pub use yuv_support::YuvChromaRange;
pub use yuv_support::YuvRange;
pub use yuv_support::YuvStandardMatrix;

pub use conversion_matrix::ConversionMatrix;
pub use conversion_matrix::PRECISION;

pub use images::OutputImage;
pub use images::PixelFormat;
pub use images::PlanarImage;
pub use images::PlaneDescriptor;

pub use yuv_error::ConversionError;
pub use yuv_error::MismatchedSize;
pub use yuv_error::YuvError;

pub use yuv_nv_to_rgba::yuv_nv12_to_argb;
pub use yuv_nv_to_rgba::yuv_nv12_to_bgra;
pub use yuv_nv_to_rgba::yuv_nv12_to_rgb;
pub use yuv_nv_to_rgba::yuv_nv12_to_rgba;

pub use transform::ColorTransform;
pub use transform::Nv12Transform;

pub use scratch::ScratchBuffer;

pub use converter::ConverterOptions;
pub use converter::FrameConverter;

pub use gate::ConverterGate;
pub use gate::GateOutcome;
pub use gate::GateStats;
