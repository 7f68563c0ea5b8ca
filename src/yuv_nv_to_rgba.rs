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
use crate::conversion_matrix::{ConversionMatrix, PRECISION};
use crate::images::PlaneDescriptor;
use crate::numerics::qrshr;
use crate::yuv_error::{check_nv12_planes, check_rgba_destination};
use crate::yuv_support::OutputLayout;
use crate::YuvError;
#[cfg(feature = "rayon")]
use rayon::iter::{IndexedParallelIterator, ParallelIterator};
#[cfg(feature = "rayon")]
use rayon::prelude::ParallelSliceMut;

/// Kernel instantiations are only ever made with `OutputLayout as u8`.
#[inline(always)]
const fn layout_from_channels(value: u8) -> OutputLayout {
    match value {
        0 => OutputLayout::Argb,
        1 => OutputLayout::Rgba,
        2 => OutputLayout::Bgra,
        3 => OutputLayout::Rgb,
        _ => {
            panic!("Unknown value")
        }
    }
}

#[derive(Copy, Clone)]
struct KernelCoefficients {
    bias_y: i32,
    y_coef: i32,
    cr_coef: i32,
    cb_coef: i32,
    g_coef_1: i32,
    g_coef_2: i32,
    luma_min: u8,
    luma_max: u8,
    alpha: u8,
}

#[inline(always)]
fn store_pixel<const DESTINATION_CHANNELS: u8>(
    dst: &mut [u8],
    y_value: u8,
    cb_value: i32,
    cr_value: i32,
    k: &KernelCoefficients,
) {
    let dst_chans = layout_from_channels(DESTINATION_CHANNELS);

    let y_value = (y_value.max(k.luma_min).min(k.luma_max) as i32 - k.bias_y) * k.y_coef;

    let r = qrshr::<PRECISION, 8>(y_value + k.cr_coef * cr_value);
    let b = qrshr::<PRECISION, 8>(y_value + k.cb_coef * cb_value);
    let g = qrshr::<PRECISION, 8>(y_value - k.g_coef_1 * cr_value - k.g_coef_2 * cb_value);

    dst[dst_chans.r_offset()] = r as u8;
    dst[dst_chans.g_offset()] = g as u8;
    dst[dst_chans.b_offset()] = b as u8;

    if let Some(a_offset) = dst_chans.a_offset() {
        dst[a_offset] = k.alpha;
    }
}

fn yuv_nv12_to_rgbx<const DESTINATION_CHANNELS: u8>(
    luma: &PlaneDescriptor,
    chroma: &PlaneDescriptor,
    rgba: &mut [u8],
    rgba_stride: u32,
    matrix: &ConversionMatrix,
    alpha: u8,
) -> Result<(), YuvError> {
    let dst_chans = layout_from_channels(DESTINATION_CHANNELS);
    let channels = dst_chans.channels();

    check_nv12_planes(luma, chroma)?;
    check_rgba_destination(rgba, rgba_stride, luma.width, luma.height, channels)?;

    let (Some(y_plane), Some(uv_plane)) = (luma.data, chroma.data) else {
        return Err(YuvError::ZeroBaseSize);
    };

    let k = KernelCoefficients {
        bias_y: matrix.range.bias_y as i32,
        y_coef: matrix.transform.y_coef,
        cr_coef: matrix.transform.cr_coef,
        cb_coef: matrix.transform.cb_coef,
        g_coef_1: matrix.transform.g_coeff_1,
        g_coef_2: matrix.transform.g_coeff_2,
        luma_min: matrix.luma_min,
        luma_max: matrix.luma_max,
        alpha,
    };
    let bias_uv = matrix.range.bias_uv as i32;

    let width = luma.width as usize;
    let height = luma.height as usize;
    let y_stride = luma.row_stride as usize;
    let uv_stride = chroma.row_stride as usize;
    let rgba_stride = rgba_stride as usize;
    let uv_row_bytes = chroma.width as usize * 2;
    let rgba_row_bytes = width * channels;

    // One CbCr sample covers a 2x2 luma block.
    let process_double_chroma_row =
        |y_src0: &[u8], y_src1: &[u8], uv_src: &[u8], rgba0: &mut [u8], rgba1: &mut [u8]| {
            for ((((rgba0, rgba1), y_src0), y_src1), uv_src) in rgba0
                .chunks_exact_mut(channels * 2)
                .zip(rgba1.chunks_exact_mut(channels * 2))
                .zip(y_src0.chunks_exact(2))
                .zip(y_src1.chunks_exact(2))
                .zip(uv_src.chunks_exact(2))
            {
                let cb_value = uv_src[0] as i32 - bias_uv;
                let cr_value = uv_src[1] as i32 - bias_uv;

                let (rgba00, rgba01) = rgba0.split_at_mut(channels);
                store_pixel::<DESTINATION_CHANNELS>(rgba00, y_src0[0], cb_value, cr_value, &k);
                store_pixel::<DESTINATION_CHANNELS>(rgba01, y_src0[1], cb_value, cr_value, &k);

                let (rgba10, rgba11) = rgba1.split_at_mut(channels);
                store_pixel::<DESTINATION_CHANNELS>(rgba10, y_src1[0], cb_value, cr_value, &k);
                store_pixel::<DESTINATION_CHANNELS>(rgba11, y_src1[1], cb_value, cr_value, &k);
            }

            if width & 1 != 0 {
                let rgba0 = rgba0.chunks_exact_mut(channels * 2).into_remainder();
                let rgba1 = rgba1.chunks_exact_mut(channels * 2).into_remainder();
                let uv_src = &uv_src[uv_src.len() - 2..];
                let cb_value = uv_src[0] as i32 - bias_uv;
                let cr_value = uv_src[1] as i32 - bias_uv;
                store_pixel::<DESTINATION_CHANNELS>(
                    &mut rgba0[0..channels],
                    y_src0[width - 1],
                    cb_value,
                    cr_value,
                    &k,
                );
                store_pixel::<DESTINATION_CHANNELS>(
                    &mut rgba1[0..channels],
                    y_src1[width - 1],
                    cb_value,
                    cr_value,
                    &k,
                );
            }
        };

    let process_halved_chroma_row = |y_src: &[u8], uv_src: &[u8], rgba: &mut [u8]| {
        for ((rgba, y_src), uv_src) in rgba
            .chunks_exact_mut(channels * 2)
            .zip(y_src.chunks_exact(2))
            .zip(uv_src.chunks_exact(2))
        {
            let cb_value = uv_src[0] as i32 - bias_uv;
            let cr_value = uv_src[1] as i32 - bias_uv;
            let (rgba0, rgba1) = rgba.split_at_mut(channels);
            store_pixel::<DESTINATION_CHANNELS>(rgba0, y_src[0], cb_value, cr_value, &k);
            store_pixel::<DESTINATION_CHANNELS>(rgba1, y_src[1], cb_value, cr_value, &k);
        }

        if width & 1 != 0 {
            let rgba = rgba.chunks_exact_mut(channels * 2).into_remainder();
            let uv_src = &uv_src[uv_src.len() - 2..];
            store_pixel::<DESTINATION_CHANNELS>(
                &mut rgba[0..channels],
                y_src[width - 1],
                uv_src[0] as i32 - bias_uv,
                uv_src[1] as i32 - bias_uv,
                &k,
            );
        }
    };

    let iter;
    #[cfg(feature = "rayon")]
    {
        iter = rgba.par_chunks_exact_mut(rgba_stride * 2).enumerate();
    }
    #[cfg(not(feature = "rayon"))]
    {
        iter = rgba.chunks_exact_mut(rgba_stride * 2).enumerate();
    }
    iter.for_each(|(pair, rgba)| {
        let (rgba0, rgba1) = rgba.split_at_mut(rgba_stride);
        let y_offset0 = pair * 2 * y_stride;
        let y_offset1 = y_offset0 + y_stride;
        let uv_offset = pair * uv_stride;
        process_double_chroma_row(
            &y_plane[y_offset0..y_offset0 + width],
            &y_plane[y_offset1..y_offset1 + width],
            &uv_plane[uv_offset..uv_offset + uv_row_bytes],
            &mut rgba0[0..rgba_row_bytes],
            &mut rgba1[0..rgba_row_bytes],
        );
    });

    if height & 1 != 0 {
        let y_offset = (height - 1) * y_stride;
        let uv_offset = (height / 2) * uv_stride;
        let rgba = rgba.chunks_exact_mut(rgba_stride * 2).into_remainder();
        process_halved_chroma_row(
            &y_plane[y_offset..y_offset + width],
            &uv_plane[uv_offset..uv_offset + uv_row_bytes],
            &mut rgba[0..rgba_row_bytes],
        );
    }

    Ok(())
}

/// Dispatches to the monomorphized kernel for `layout`.
pub(crate) fn yuv_nv12_to_layout(
    luma: &PlaneDescriptor,
    chroma: &PlaneDescriptor,
    dst: &mut [u8],
    dst_stride: u32,
    layout: OutputLayout,
    matrix: &ConversionMatrix,
    alpha: u8,
) -> Result<(), YuvError> {
    match layout {
        OutputLayout::Argb => yuv_nv12_to_rgbx::<{ OutputLayout::Argb as u8 }>(
            luma, chroma, dst, dst_stride, matrix, alpha,
        ),
        OutputLayout::Rgba => yuv_nv12_to_rgbx::<{ OutputLayout::Rgba as u8 }>(
            luma, chroma, dst, dst_stride, matrix, alpha,
        ),
        OutputLayout::Bgra => yuv_nv12_to_rgbx::<{ OutputLayout::Bgra as u8 }>(
            luma, chroma, dst, dst_stride, matrix, alpha,
        ),
        OutputLayout::Rgb => yuv_nv12_to_rgbx::<{ OutputLayout::Rgb as u8 }>(
            luma, chroma, dst, dst_stride, matrix, alpha,
        ),
    }
}

/// Convert YUV NV12 format to ARGB format.
///
/// This function takes YUV NV12 data with 8-bit precision,
/// and converts it to ARGB format with 8-bit per channel precision.
///
/// # Arguments
///
/// * `luma` - Full resolution Y plane.
/// * `chroma` - Half resolution interleaved CbCr plane.
/// * `argb` - A mutable slice to store the converted ARGB data.
/// * `argb_stride` - The stride (bytes per row) for the ARGB image data.
/// * `matrix` - Coefficients and ranges to decode with.
/// * `alpha` - Value written to every alpha byte.
///
/// # Errors
///
/// Fails if the planes or the destination do not match the declared dimensions and strides.
///
pub fn yuv_nv12_to_argb(
    luma: &PlaneDescriptor,
    chroma: &PlaneDescriptor,
    argb: &mut [u8],
    argb_stride: u32,
    matrix: &ConversionMatrix,
    alpha: u8,
) -> Result<(), YuvError> {
    yuv_nv12_to_rgbx::<{ OutputLayout::Argb as u8 }>(luma, chroma, argb, argb_stride, matrix, alpha)
}

/// Convert YUV NV12 format to RGBA format.
///
/// Same as [`yuv_nv12_to_argb`] with alpha stored last.
pub fn yuv_nv12_to_rgba(
    luma: &PlaneDescriptor,
    chroma: &PlaneDescriptor,
    rgba: &mut [u8],
    rgba_stride: u32,
    matrix: &ConversionMatrix,
    alpha: u8,
) -> Result<(), YuvError> {
    yuv_nv12_to_rgbx::<{ OutputLayout::Rgba as u8 }>(luma, chroma, rgba, rgba_stride, matrix, alpha)
}

/// Convert YUV NV12 format to BGRA format.
pub fn yuv_nv12_to_bgra(
    luma: &PlaneDescriptor,
    chroma: &PlaneDescriptor,
    bgra: &mut [u8],
    bgra_stride: u32,
    matrix: &ConversionMatrix,
    alpha: u8,
) -> Result<(), YuvError> {
    yuv_nv12_to_rgbx::<{ OutputLayout::Bgra as u8 }>(luma, chroma, bgra, bgra_stride, matrix, alpha)
}

/// Convert YUV NV12 format to RGB format, no alpha channel is written.
pub fn yuv_nv12_to_rgb(
    luma: &PlaneDescriptor,
    chroma: &PlaneDescriptor,
    rgb: &mut [u8],
    rgb_stride: u32,
    matrix: &ConversionMatrix,
) -> Result<(), YuvError> {
    yuv_nv12_to_rgbx::<{ OutputLayout::Rgb as u8 }>(luma, chroma, rgb, rgb_stride, matrix, 255)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn reference_rgb(y: u8, cb: u8, cr: u8) -> [i32; 3] {
        let y = y.max(1) as f32;
        let cb = cb as f32 - 128.;
        let cr = cr as f32 - 128.;
        let r = y + 1.5748 * cr;
        let g = y - 0.187324 * cb - 0.468124 * cr;
        let b = y + 1.8556 * cb;
        [r, g, b].map(|v| v.round().clamp(0., 255.) as i32)
    }

    struct Nv12 {
        y: Vec<u8>,
        uv: Vec<u8>,
        width: u32,
        height: u32,
        y_stride: u32,
        uv_stride: u32,
    }

    impl Nv12 {
        fn random(width: u32, height: u32, padding: u32) -> Nv12 {
            let mut rng = rand::rng();
            let y_stride = width + padding;
            let uv_stride = width.div_ceil(2) * 2 + padding;
            let y = (0..y_stride as usize * height as usize)
                .map(|_| rng.random::<u8>())
                .collect();
            let uv = (0..uv_stride as usize * height.div_ceil(2) as usize)
                .map(|_| rng.random::<u8>())
                .collect();
            Nv12 {
                y,
                uv,
                width,
                height,
                y_stride,
                uv_stride,
            }
        }

        fn planes(&self) -> (PlaneDescriptor<'_>, PlaneDescriptor<'_>) {
            (
                PlaneDescriptor::new(&self.y, self.width, self.height, self.y_stride),
                PlaneDescriptor::new(
                    &self.uv,
                    self.width.div_ceil(2),
                    self.height.div_ceil(2),
                    self.uv_stride,
                ),
            )
        }
    }

    fn assert_matches_reference(image: &Nv12, dst: &[u8], stride: usize, layout: OutputLayout) {
        let channels = layout.channels();
        for y in 0..image.height as usize {
            for x in 0..image.width as usize {
                let luma = image.y[y * image.y_stride as usize + x];
                let uv_index = (y / 2) * image.uv_stride as usize + (x / 2) * 2;
                let expected = reference_rgb(luma, image.uv[uv_index], image.uv[uv_index + 1]);
                let px = &dst[y * stride + x * channels..][..channels];
                let received = [
                    px[layout.r_offset()] as i32,
                    px[layout.g_offset()] as i32,
                    px[layout.b_offset()] as i32,
                ];
                for (e, r) in expected.iter().zip(received.iter()) {
                    assert!(
                        (e - r).abs() <= 2,
                        "pixel ({}, {}) expected {:?}, received {:?}",
                        x,
                        y,
                        expected,
                        received
                    );
                }
            }
        }
    }

    #[test]
    fn random_frames_match_float_reference() {
        for (width, height, padding) in [(64, 48, 0), (37, 21, 11), (1, 1, 0), (2, 3, 5), (5, 2, 0)] {
            let image = Nv12::random(width, height, padding);
            let (luma, chroma) = image.planes();
            for layout in [
                OutputLayout::Argb,
                OutputLayout::Rgba,
                OutputLayout::Bgra,
                OutputLayout::Rgb,
            ] {
                let stride = width as usize * layout.channels();
                let mut dst = vec![0u8; stride * height as usize];
                yuv_nv12_to_layout(
                    &luma,
                    &chroma,
                    &mut dst,
                    stride as u32,
                    layout,
                    ConversionMatrix::bt709_full(),
                    255,
                )
                .unwrap();
                assert_matches_reference(&image, &dst, stride, layout);
            }
        }
    }

    #[test]
    fn alpha_is_written_to_every_pixel() {
        let image = Nv12::random(33, 17, 3);
        let (luma, chroma) = image.planes();
        let stride = 33 * 4;
        let mut dst = vec![0u8; stride * 17];
        yuv_nv12_to_argb(&luma, &chroma, &mut dst, stride as u32, ConversionMatrix::bt709_full(), 200)
            .unwrap();
        assert!(dst.chunks_exact(4).all(|px| px[0] == 200));
    }

    #[test]
    fn padded_destination_rows_are_left_untouched() {
        let image = Nv12::random(6, 4, 2);
        let (luma, chroma) = image.planes();
        let stride = 6 * 4 + 8;
        let mut dst = vec![7u8; stride * 4];
        yuv_nv12_to_rgba(&luma, &chroma, &mut dst, stride as u32, ConversionMatrix::bt709_full(), 255)
            .unwrap();
        for row in dst.chunks_exact(stride) {
            assert!(row[24..].iter().all(|&v| v == 7));
        }
        assert_matches_reference(&image, &dst, stride, OutputLayout::Rgba);
    }

    #[test]
    fn neutral_chroma_produces_gray() {
        let y = vec![235u8; 8 * 8];
        let uv = vec![128u8; 8 * 4];
        let luma = PlaneDescriptor::new(&y, 8, 8, 8);
        let chroma = PlaneDescriptor::new(&uv, 4, 4, 8);
        let mut dst = vec![0u8; 8 * 8 * 3];
        yuv_nv12_to_rgb(&luma, &chroma, &mut dst, 24, ConversionMatrix::bt709_full()).unwrap();
        assert!(dst.iter().all(|&v| v == 235));
    }

    #[test]
    fn black_luma_is_floored_only_by_camera_matrix() {
        use crate::{YuvRange, YuvStandardMatrix};
        let y = vec![0u8; 4 * 4];
        let uv = vec![128u8; 4 * 2];
        let luma = PlaneDescriptor::new(&y, 4, 4, 4);
        let chroma = PlaneDescriptor::new(&uv, 2, 2, 4);

        let mut dst = vec![0u8; 4 * 4 * 4];
        yuv_nv12_to_argb(&luma, &chroma, &mut dst, 16, ConversionMatrix::bt709_full(), 255).unwrap();
        assert!(dst.chunks_exact(4).all(|px| px == [255, 1, 1, 1]));

        let unclamped = ConversionMatrix::new(YuvStandardMatrix::Bt709, YuvRange::Full).unwrap();
        yuv_nv12_to_argb(&luma, &chroma, &mut dst, 16, &unclamped, 255).unwrap();
        assert!(dst.chunks_exact(4).all(|px| px == [255, 0, 0, 0]));
    }

    #[test]
    fn kernel_dispatch_matches_layout_discriminants() {
        for layout in [
            OutputLayout::Argb,
            OutputLayout::Rgba,
            OutputLayout::Bgra,
            OutputLayout::Rgb,
        ] {
            assert_eq!(layout_from_channels(layout as u8), layout);
        }
    }

    #[test]
    fn undersized_destination_is_reported() {
        let image = Nv12::random(8, 8, 0);
        let (luma, chroma) = image.planes();
        let mut dst = vec![0u8; 8 * 8 * 4 - 4];
        let result = yuv_nv12_to_bgra(&luma, &chroma, &mut dst, 32, ConversionMatrix::bt709_full(), 255);
        assert!(matches!(result, Err(YuvError::DestinationSizeMismatch(_))));
    }

    #[test]
    fn mismatched_chroma_dimensions_are_reported() {
        let y = vec![0u8; 8 * 8];
        let uv = vec![0u8; 8 * 8];
        let luma = PlaneDescriptor::new(&y, 8, 8, 8);
        let chroma = PlaneDescriptor::new(&uv, 4, 8, 8);
        let mut dst = vec![0u8; 8 * 8 * 4];
        let result = yuv_nv12_to_argb(&luma, &chroma, &mut dst, 32, ConversionMatrix::bt709_full(), 255);
        assert_eq!(
            result,
            Err(YuvError::ChromaDimensionsMismatch {
                expected: (4, 4),
                received: (4, 8),
            })
        );
    }

    #[test]
    fn limited_range_matrix_expands_black_and_white() {
        use crate::{YuvRange, YuvStandardMatrix};
        let matrix = ConversionMatrix::new(YuvStandardMatrix::Bt709, YuvRange::Limited).unwrap();
        let y = [16u8, 235, 16, 235];
        let uv = [128u8, 128];
        let luma = PlaneDescriptor::new(&y, 2, 2, 2);
        let chroma = PlaneDescriptor::new(&uv, 1, 1, 2);
        let mut dst = [0u8; 2 * 2 * 3];
        yuv_nv12_to_rgb(&luma, &chroma, &mut dst, 6, &matrix).unwrap();
        assert_eq!(&dst[0..3], &[0, 0, 0]);
        assert_eq!(&dst[3..6], &[255, 255, 255]);
    }

    #[test]
    fn random_dimensions_match_float_reference() {
        let mut rng = rand::rng();
        let width = rng.random_range(1..40u32);
        let height = rng.random_range(1..40u32);
        let image = Nv12::random(width, height, rng.random_range(0..4u32));
        let (luma, chroma) = image.planes();
        let stride = width as usize * 4;
        let mut dst = vec![0u8; stride * height as usize];
        yuv_nv12_to_argb(&luma, &chroma, &mut dst, stride as u32, ConversionMatrix::bt709_full(), 255)
            .unwrap();
        assert_matches_reference(&image, &dst, stride, OutputLayout::Argb);
    }
}
