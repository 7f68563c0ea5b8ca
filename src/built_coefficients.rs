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
use crate::yuv_support::CbCrInverseTransform;
use crate::{YuvRange, YuvStandardMatrix};

static INVERSE_BT601_LIMITED_8_PREC13: CbCrInverseTransform<i32> =
    CbCrInverseTransform::new(9538, 13074, 16525, 6659, 3209);

static INVERSE_BT601_FULL_8_PREC13: CbCrInverseTransform<i32> =
    CbCrInverseTransform::new(8192, 11485, 14516, 5850, 2819);

static INVERSE_BT709_LIMITED_8_PREC13: CbCrInverseTransform<i32> =
    CbCrInverseTransform::new(9538, 14686, 17304, 4365, 1746);

pub(crate) static INVERSE_BT709_FULL_8_PREC13: CbCrInverseTransform<i32> =
    CbCrInverseTransform::new(8192, 12900, 15201, 3834, 1534);

static INVERSE_BT2020_LIMITED_8_PREC13: CbCrInverseTransform<i32> =
    CbCrInverseTransform::new(9538, 13751, 17545, 5328, 1534);

static INVERSE_BT2020_FULL_8_PREC13: CbCrInverseTransform<i32> =
    CbCrInverseTransform::new(8192, 12079, 15412, 4680, 1348);

/// Looks up a prebuilt fixed-point inverse transform, `None` for custom matrices,
/// other bit depths or other precisions.
pub(crate) fn get_built_inverse_transform(
    prec: u32,
    bit_depth: u32,
    range: YuvRange,
    matrix: YuvStandardMatrix,
) -> Option<CbCrInverseTransform<i32>> {
    if prec != 13 || bit_depth != 8 {
        return None;
    }
    match (matrix, range) {
        (YuvStandardMatrix::Bt601, YuvRange::Limited) => Some(INVERSE_BT601_LIMITED_8_PREC13),
        (YuvStandardMatrix::Bt601, YuvRange::Full) => Some(INVERSE_BT601_FULL_8_PREC13),
        (YuvStandardMatrix::Bt709, YuvRange::Limited) => Some(INVERSE_BT709_LIMITED_8_PREC13),
        (YuvStandardMatrix::Bt709, YuvRange::Full) => Some(INVERSE_BT709_FULL_8_PREC13),
        (YuvStandardMatrix::Bt2020, YuvRange::Limited) => Some(INVERSE_BT2020_LIMITED_8_PREC13),
        (YuvStandardMatrix::Bt2020, YuvRange::Full) => Some(INVERSE_BT2020_FULL_8_PREC13),
        (YuvStandardMatrix::Custom(_, _), _) => None,
    }
}
