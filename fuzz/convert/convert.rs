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

#![no_main]

use libfuzzer_sys::fuzz_target;
use yuv_frame::{
    ConverterOptions, FrameConverter, OutputLayout, PixelFormat, PlanarImage, PlaneDescriptor,
};

fuzz_target!(|data: (u8, u8, u8, u8, u8, u8, u8, Vec<u8>)| {
    let (i_width, i_height, y_padding, uv_padding, trim, selector, fill, content) = data;
    fuzz_convert(
        i_width as u32,
        i_height as u32,
        y_padding as u32,
        uv_padding as u32,
        trim as usize,
        selector,
        fill,
        &content,
    );
});

fn pixel_format(selector: u8) -> PixelFormat {
    match selector % 8 {
        0 => PixelFormat::Yuv420BiPlanarVideoRange,
        1 => PixelFormat::Yuv420Planar,
        2 => PixelFormat::Yuyv,
        3 => PixelFormat::Bgra32,
        _ => PixelFormat::Yuv420BiPlanarFullRange,
    }
}

#[allow(clippy::too_many_arguments)]
fn fuzz_convert(
    width: u32,
    height: u32,
    y_padding: u32,
    uv_padding: u32,
    trim: usize,
    selector: u8,
    fill: u8,
    content: &[u8],
) {
    let y_stride = width + y_padding;
    let uv_stride = width.div_ceil(2) * 2 + uv_padding;
    let mut y_plane = vec![fill; y_stride as usize * height as usize];
    let mut uv_plane = vec![fill; uv_stride as usize * height.div_ceil(2) as usize];
    for (dst, src) in y_plane.iter_mut().chain(uv_plane.iter_mut()).zip(content) {
        *dst = *src;
    }

    // Trimming either plane must be rejected, never read out of bounds.
    let y_len = if selector & 0x10 != 0 {
        y_plane.len().saturating_sub(trim)
    } else {
        y_plane.len()
    };
    let uv_len = if selector & 0x20 != 0 {
        uv_plane.len().saturating_sub(trim)
    } else {
        uv_plane.len()
    };

    let luma = if selector & 0x40 != 0 {
        PlaneDescriptor::missing(width, height, y_stride)
    } else {
        PlaneDescriptor::new(&y_plane[..y_len], width, height, y_stride)
    };
    let chroma = PlaneDescriptor::new(
        &uv_plane[..uv_len],
        width.div_ceil(2),
        height.div_ceil(2),
        uv_stride,
    );
    let image = PlanarImage {
        pixel_format: pixel_format(selector),
        luma,
        chroma,
    };

    let layout = [
        OutputLayout::Argb,
        OutputLayout::Rgba,
        OutputLayout::Bgra,
        OutputLayout::Rgb,
    ][(selector >> 6) as usize];
    let mut converter =
        FrameConverter::with_options(ConverterOptions::default().with_layout(layout));
    if let Ok(output) = converter.convert(&image) {
        assert_eq!(output.width, width);
        assert_eq!(output.height, height);
        if let Some(a_offset) = layout.a_offset() {
            assert!(output.pixels().all(|px| px[a_offset] == 255));
        }
    }
}
