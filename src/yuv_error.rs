/*
 * Copyright (c) Radzivon Bartoshyk, 11/2024. All rights reserved.
 *
 * Redistribution and use in source and binary forms, with or without modification,
 * are permitted provided that the following conditions are met:
 *
 * 1.  Redistributions of source code must retain the above copyright notice, this
 * list of conditions and the following disclaimer.
 *
 * 2.  Redistributions in binary form must reproduce the above copyright notice,
 * this list of conditions and the following disclaimer in the documentation
 * and/or other materials provided with the distribution.
 *
 * 3.  Neither the name of the copyright holder nor the names of its
 * contributors may be used to endorse or promote products derived from
 * this software without specific prior written permission.
 *
 * THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
 * AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
 * IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
 * DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
 * FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
 * DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
 * SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
 * CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
 * OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
 * OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.
 */
use crate::images::{PixelFormat, PlaneDescriptor};
use std::fmt::{Display, Formatter};
use thiserror::Error;

#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq)]
pub struct MismatchedSize {
    pub expected: usize,
    pub received: usize,
}

impl Display for MismatchedSize {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "expected={}, received={}", self.expected, self.received)
    }
}

/// Failures reported by the color transform layer.
///
/// Each variant carries a stable [`YuvError::code`], which the converter
/// surfaces without interpretation.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Error)]
pub enum YuvError {
    #[error("Destination size mismatch: {0}")]
    DestinationSizeMismatch(MismatchedSize),
    #[error("Destination is smaller than the image: {0}")]
    MinimumDestinationSizeMismatch(MismatchedSize),
    #[error("Image size overflow pointer capabilities")]
    PointerOverflow,
    #[error("Zero sized images is not supported")]
    ZeroBaseSize,
    #[error("Luma plane is too short: {0}")]
    LumaPlaneSizeMismatch(MismatchedSize),
    #[error("Luma plane stride is shorter than a row: {0}")]
    LumaPlaneMinimumSizeMismatch(MismatchedSize),
    #[error("Chroma plane is too short: {0}")]
    ChromaPlaneSizeMismatch(MismatchedSize),
    #[error("Chroma plane stride is shorter than a row: {0}")]
    ChromaPlaneMinimumSizeMismatch(MismatchedSize),
    #[error("Chroma plane must be {expected:?} for 4:2:0 subsampling, but it was {received:?}")]
    ChromaDimensionsMismatch {
        expected: (u32, u32),
        received: (u32, u32),
    },
}

impl YuvError {
    /// Opaque diagnostic identifier, stable across releases.
    pub const fn code(&self) -> u32 {
        match self {
            YuvError::DestinationSizeMismatch(_) => 1,
            YuvError::MinimumDestinationSizeMismatch(_) => 2,
            YuvError::PointerOverflow => 3,
            YuvError::ZeroBaseSize => 4,
            YuvError::LumaPlaneSizeMismatch(_) => 5,
            YuvError::LumaPlaneMinimumSizeMismatch(_) => 6,
            YuvError::ChromaPlaneSizeMismatch(_) => 7,
            YuvError::ChromaPlaneMinimumSizeMismatch(_) => 8,
            YuvError::ChromaDimensionsMismatch { .. } => 9,
        }
    }
}

/// Failure of a single [`FrameConverter::convert`](crate::FrameConverter::convert) call.
///
/// Every failure is terminal for that frame only, the converter stays usable.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ConversionError {
    #[error("unsupported pixel format {0:?}")]
    UnsupportedFormat(PixelFormat),
    #[error("plane {0} is missing or not accessible")]
    MissingPlane(usize),
    #[error("invalid plane layout: {0}")]
    InvalidLayout(#[source] YuvError),
    #[error("unable to allocate {requested} bytes for the scratch buffer")]
    AllocationFailure { requested: usize },
    #[error("color transform failed with status {0}")]
    ConversionFailure(u32),
}

impl ConversionError {
    /// Only allocation pressure may clear up by itself on a later frame.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ConversionError::AllocationFailure { .. })
    }
}

#[inline]
pub(crate) fn check_overflow_v2(v0: usize, v1: usize) -> Result<usize, YuvError> {
    v0.checked_mul(v1).ok_or(YuvError::PointerOverflow)
}

#[inline]
pub(crate) fn check_overflow_v3(v0: usize, v1: usize, v2: usize) -> Result<usize, YuvError> {
    check_overflow_v2(v0, v1)?
        .checked_mul(v2)
        .ok_or(YuvError::PointerOverflow)
}

#[inline]
pub(crate) fn check_rgba_destination(
    arr: &[u8],
    rgba_stride: u32,
    width: u32,
    height: u32,
    channels: usize,
) -> Result<(), YuvError> {
    let minimum = check_overflow_v3(width as usize, height as usize, channels)?;
    let declared = check_overflow_v2(rgba_stride as usize, height as usize)?;
    if arr.len() != declared {
        return Err(YuvError::DestinationSizeMismatch(MismatchedSize {
            expected: declared,
            received: arr.len(),
        }));
    }
    if declared < minimum {
        return Err(YuvError::MinimumDestinationSizeMismatch(MismatchedSize {
            expected: minimum,
            received: declared,
        }));
    }
    Ok(())
}

/// Bytes a strided plane must hold: every row but the last is padded to `stride`.
#[inline]
fn required_plane_len(stride: usize, row_bytes: usize, height: usize) -> Result<usize, YuvError> {
    check_overflow_v2(stride, height - 1)?
        .checked_add(row_bytes)
        .ok_or(YuvError::PointerOverflow)
}

#[inline]
pub(crate) fn check_y8_channel(data: &[u8], stride: u32, width: u32, height: u32) -> Result<(), YuvError> {
    if width == 0 || height == 0 {
        return Err(YuvError::ZeroBaseSize);
    }
    check_overflow_v2(stride as usize, height as usize)?;
    if (stride as usize) < width as usize {
        return Err(YuvError::LumaPlaneMinimumSizeMismatch(MismatchedSize {
            expected: width as usize,
            received: stride as usize,
        }));
    }
    let required = required_plane_len(stride as usize, width as usize, height as usize)?;
    if data.len() < required {
        return Err(YuvError::LumaPlaneSizeMismatch(MismatchedSize {
            expected: required,
            received: data.len(),
        }));
    }
    Ok(())
}

#[inline]
pub(crate) fn check_interleaved_chroma_channel(
    data: &[u8],
    stride: u32,
    chroma_width: u32,
    chroma_height: u32,
) -> Result<(), YuvError> {
    if chroma_width == 0 || chroma_height == 0 {
        return Err(YuvError::ZeroBaseSize);
    }
    let row_bytes = check_overflow_v2(chroma_width as usize, 2)?;
    check_overflow_v2(stride as usize, chroma_height as usize)?;
    if (stride as usize) < row_bytes {
        return Err(YuvError::ChromaPlaneMinimumSizeMismatch(MismatchedSize {
            expected: row_bytes,
            received: stride as usize,
        }));
    }
    let required = required_plane_len(stride as usize, row_bytes, chroma_height as usize)?;
    if data.len() < required {
        return Err(YuvError::ChromaPlaneSizeMismatch(MismatchedSize {
            expected: required,
            received: data.len(),
        }));
    }
    Ok(())
}

/// Validates a luma + interleaved chroma pair against the 4:2:0 contract.
///
/// Both planes must carry data, the caller checks presence first.
pub(crate) fn check_nv12_planes(
    luma: &PlaneDescriptor,
    chroma: &PlaneDescriptor,
) -> Result<(), YuvError> {
    let (Some(y_plane), Some(uv_plane)) = (luma.data, chroma.data) else {
        return Err(YuvError::ZeroBaseSize);
    };
    check_y8_channel(y_plane, luma.row_stride, luma.width, luma.height)?;
    let expected = (luma.width.div_ceil(2), luma.height.div_ceil(2));
    let received = (chroma.width, chroma.height);
    if expected != received {
        return Err(YuvError::ChromaDimensionsMismatch { expected, received });
    }
    check_interleaved_chroma_channel(uv_plane, chroma.row_stride, chroma.width, chroma.height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_luma_accepts_unpadded_last_row() {
        let data = vec![0u8; 16 * 3 + 10];
        assert_eq!(check_y8_channel(&data, 16, 10, 4), Ok(()));
        assert_eq!(
            check_y8_channel(&data[..data.len() - 1], 16, 10, 4),
            Err(YuvError::LumaPlaneSizeMismatch(MismatchedSize {
                expected: 58,
                received: 57,
            }))
        );
    }

    #[test]
    fn luma_stride_shorter_than_row_is_rejected() {
        let data = vec![0u8; 64];
        assert_eq!(
            check_y8_channel(&data, 7, 8, 8),
            Err(YuvError::LumaPlaneMinimumSizeMismatch(MismatchedSize {
                expected: 8,
                received: 7,
            }))
        );
    }

    #[test]
    fn zero_sized_planes_are_rejected() {
        assert_eq!(check_y8_channel(&[], 0, 0, 4), Err(YuvError::ZeroBaseSize));
        assert_eq!(
            check_interleaved_chroma_channel(&[], 4, 2, 0),
            Err(YuvError::ZeroBaseSize)
        );
    }

    #[test]
    fn chroma_rows_count_two_bytes_per_pixel() {
        let data = vec![0u8; 8 * 2];
        assert_eq!(check_interleaved_chroma_channel(&data, 8, 4, 2), Ok(()));
        assert_eq!(
            check_interleaved_chroma_channel(&data, 6, 4, 2),
            Err(YuvError::ChromaPlaneMinimumSizeMismatch(MismatchedSize {
                expected: 8,
                received: 6,
            }))
        );
    }

    #[test]
    fn destination_must_match_stride_exactly() {
        let dst = vec![0u8; 4 * 4 * 2];
        assert_eq!(check_rgba_destination(&dst, 16, 4, 2, 4), Ok(()));
        assert!(matches!(
            check_rgba_destination(&dst, 12, 4, 2, 4),
            Err(YuvError::DestinationSizeMismatch(_))
        ));
        assert!(matches!(
            check_rgba_destination(&dst[..24], 12, 4, 2, 4),
            Err(YuvError::MinimumDestinationSizeMismatch(_))
        ));
    }

    #[test]
    fn overflow_is_reported_instead_of_wrapping() {
        assert_eq!(
            check_overflow_v3(usize::MAX, 2, 1),
            Err(YuvError::PointerOverflow)
        );
    }

    #[test]
    fn codes_are_distinct() {
        let size = MismatchedSize {
            expected: 0,
            received: 0,
        };
        let errors = [
            YuvError::DestinationSizeMismatch(size),
            YuvError::MinimumDestinationSizeMismatch(size),
            YuvError::PointerOverflow,
            YuvError::ZeroBaseSize,
            YuvError::LumaPlaneSizeMismatch(size),
            YuvError::LumaPlaneMinimumSizeMismatch(size),
            YuvError::ChromaPlaneSizeMismatch(size),
            YuvError::ChromaPlaneMinimumSizeMismatch(size),
            YuvError::ChromaDimensionsMismatch {
                expected: (0, 0),
                received: (0, 0),
            },
        ];
        let mut codes: Vec<u32> = errors.iter().map(|e| e.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn only_allocation_failures_are_retryable() {
        assert!(ConversionError::AllocationFailure { requested: 16 }.is_retryable());
        assert!(!ConversionError::MissingPlane(1).is_retryable());
        assert!(!ConversionError::ConversionFailure(3).is_retryable());
    }
}
