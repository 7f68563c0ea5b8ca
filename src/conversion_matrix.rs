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
use crate::built_coefficients::{get_built_inverse_transform, INVERSE_BT709_FULL_8_PREC13};
use crate::yuv_support::{
    get_inverse_transform, get_yuv_range, CbCrInverseTransform, YuvChromaRange, YuvRange,
    YuvStandardMatrix,
};
use std::sync::OnceLock;

/// Fixed-point precision of every [`ConversionMatrix`].
pub const PRECISION: i32 = 13;

/// YCbCr to RGB coefficients together with the input ranges they expect.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ConversionMatrix {
    pub matrix: YuvStandardMatrix,
    pub range: YuvChromaRange,
    /// Coefficients scaled by `1 << PRECISION`.
    pub transform: CbCrInverseTransform<i32>,
    /// Luma samples are clamped to `luma_min..=luma_max` before the transform.
    pub luma_min: u8,
    pub luma_max: u8,
}

impl ConversionMatrix {
    /// Builds an 8-bit matrix, preferring the prebuilt tables.
    ///
    /// Returns `None` for a custom matrix with `1 - kr - kb == 0`.
    pub fn new(matrix: YuvStandardMatrix, range: YuvRange) -> Option<Self> {
        let chroma_range = get_yuv_range(8, range);
        let transform = match get_built_inverse_transform(PRECISION as u32, 8, range, matrix) {
            Some(stored) => stored,
            None => {
                let kr_kb = matrix.get_kr_kb();
                get_inverse_transform(
                    255,
                    chroma_range.range_y,
                    chroma_range.range_uv,
                    kr_kb.kr,
                    kr_kb.kb,
                )?
                .to_integers(PRECISION as u32)
            }
        };
        Some(ConversionMatrix {
            matrix,
            range: chroma_range,
            transform,
            luma_min: 0,
            luma_max: u8::MAX,
        })
    }

    /// Process-wide ITU-R BT.709 full range matrix, built on first access.
    ///
    /// Camera luma is floored at 1, so black input decodes to `1, 1, 1`.
    pub fn bt709_full() -> &'static ConversionMatrix {
        static INSTANCE: OnceLock<ConversionMatrix> = OnceLock::new();
        INSTANCE.get_or_init(|| ConversionMatrix {
            matrix: YuvStandardMatrix::Bt709,
            range: get_yuv_range(8, YuvRange::Full),
            transform: INVERSE_BT709_FULL_8_PREC13,
            luma_min: 1,
            luma_max: u8::MAX,
        })
    }
}
