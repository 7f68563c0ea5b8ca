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
use crate::conversion_matrix::ConversionMatrix;
use crate::images::PlaneDescriptor;
use crate::yuv_nv_to_rgba::yuv_nv12_to_layout;
use crate::yuv_support::OutputLayout;
use crate::YuvError;

/// Plane to interleaved color conversion primitive used by [`FrameConverter`](crate::FrameConverter).
///
/// Implementations read a full resolution luma plane and a half resolution
/// interleaved CbCr plane, reconstruct 4:4:4 and write `output` in `layout`
/// order with `alpha` in every alpha byte. A failure is reported as a
/// [`YuvError`] whose code the converter surfaces unchanged.
pub trait ColorTransform: Send + Sync {
    #[allow(clippy::too_many_arguments)]
    fn convert(
        &self,
        luma: &PlaneDescriptor,
        chroma: &PlaneDescriptor,
        output: &mut [u8],
        output_stride: u32,
        layout: OutputLayout,
        matrix: &ConversionMatrix,
        alpha: u8,
    ) -> Result<(), YuvError>;
}

/// Default fixed-point NV12 kernel.
///
/// Rows are processed in parallel when the `rayon` feature is enabled.
#[derive(Debug, Default, Copy, Clone)]
pub struct Nv12Transform;

impl ColorTransform for Nv12Transform {
    fn convert(
        &self,
        luma: &PlaneDescriptor,
        chroma: &PlaneDescriptor,
        output: &mut [u8],
        output_stride: u32,
        layout: OutputLayout,
        matrix: &ConversionMatrix,
        alpha: u8,
    ) -> Result<(), YuvError> {
        yuv_nv12_to_layout(luma, chroma, output, output_stride, layout, matrix, alpha)
    }
}

impl<T: ColorTransform + ?Sized> ColorTransform for Box<T> {
    fn convert(
        &self,
        luma: &PlaneDescriptor,
        chroma: &PlaneDescriptor,
        output: &mut [u8],
        output_stride: u32,
        layout: OutputLayout,
        matrix: &ConversionMatrix,
        alpha: u8,
    ) -> Result<(), YuvError> {
        (**self).convert(luma, chroma, output, output_stride, layout, matrix, alpha)
    }
}
