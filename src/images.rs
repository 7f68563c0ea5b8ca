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
use crate::yuv_support::OutputLayout;

/// Declared pixel layout of an incoming camera frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 8-bit 4:2:0 bi-planar, full range (`420f`). The only layout the converter accepts.
    Yuv420BiPlanarFullRange,
    /// 8-bit 4:2:0 bi-planar, video range (`420v`).
    Yuv420BiPlanarVideoRange,
    /// 8-bit 4:2:0 three-plane (`y420`).
    Yuv420Planar,
    /// Packed 4:2:2 (`yuvs`).
    Yuyv,
    /// Packed BGRA (`BGRA`).
    Bgra32,
    /// Any other FourCC.
    Other(u32),
}

impl PixelFormat {
    const FOURCC_420F: u32 = u32::from_be_bytes(*b"420f");
    const FOURCC_420V: u32 = u32::from_be_bytes(*b"420v");
    const FOURCC_Y420: u32 = u32::from_be_bytes(*b"y420");
    const FOURCC_YUVS: u32 = u32::from_be_bytes(*b"yuvs");
    const FOURCC_BGRA: u32 = u32::from_be_bytes(*b"BGRA");

    pub const fn fourcc(&self) -> u32 {
        match self {
            PixelFormat::Yuv420BiPlanarFullRange => Self::FOURCC_420F,
            PixelFormat::Yuv420BiPlanarVideoRange => Self::FOURCC_420V,
            PixelFormat::Yuv420Planar => Self::FOURCC_Y420,
            PixelFormat::Yuyv => Self::FOURCC_YUVS,
            PixelFormat::Bgra32 => Self::FOURCC_BGRA,
            PixelFormat::Other(code) => *code,
        }
    }

    pub const fn from_fourcc(code: u32) -> Self {
        match code {
            Self::FOURCC_420F => PixelFormat::Yuv420BiPlanarFullRange,
            Self::FOURCC_420V => PixelFormat::Yuv420BiPlanarVideoRange,
            Self::FOURCC_Y420 => PixelFormat::Yuv420Planar,
            Self::FOURCC_YUVS => PixelFormat::Yuyv,
            Self::FOURCC_BGRA => PixelFormat::Bgra32,
            other => PixelFormat::Other(other),
        }
    }
}

#[derive(Debug, Copy, Clone)]
/// One memory plane of a multi-plane image.
///
/// The bytes are borrowed from the frame source, which keeps them locked and
/// unchanged for as long as the descriptor lives. `data` is `None` when the
/// source could not locate the plane.
pub struct PlaneDescriptor<'a> {
    pub data: Option<&'a [u8]>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Stride here always means bytes per row, padding included.
    pub row_stride: u32,
}

impl<'a> PlaneDescriptor<'a> {
    pub fn new(data: &'a [u8], width: u32, height: u32, row_stride: u32) -> Self {
        PlaneDescriptor {
            data: Some(data),
            width,
            height,
            row_stride,
        }
    }

    /// Descriptor for a plane the frame source failed to map.
    pub fn missing(width: u32, height: u32, row_stride: u32) -> Self {
        PlaneDescriptor {
            data: None,
            width,
            height,
            row_stride,
        }
    }

    #[inline]
    pub fn is_present(&self) -> bool {
        self.data.is_some()
    }
}

#[derive(Debug, Copy, Clone)]
/// Bi-planar 4:2:0 camera frame: full resolution luma and half resolution interleaved CbCr.
pub struct PlanarImage<'a> {
    pub pixel_format: PixelFormat,
    /// Plane 0, one byte per pixel.
    pub luma: PlaneDescriptor<'a>,
    /// Plane 1, two bytes per pixel in Cb, Cr order.
    pub chroma: PlaneDescriptor<'a>,
}

impl<'a> PlanarImage<'a> {
    /// Wraps NV12 planes of a `width` x `height` frame, deriving the chroma plane
    /// dimensions from the 4:2:0 contract.
    pub fn nv12(
        y_plane: &'a [u8],
        y_stride: u32,
        uv_plane: &'a [u8],
        uv_stride: u32,
        width: u32,
        height: u32,
    ) -> Self {
        PlanarImage {
            pixel_format: PixelFormat::Yuv420BiPlanarFullRange,
            luma: PlaneDescriptor::new(y_plane, width, height, y_stride),
            chroma: PlaneDescriptor::new(uv_plane, width.div_ceil(2), height.div_ceil(2), uv_stride),
        }
    }

    pub fn with_pixel_format(mut self, pixel_format: PixelFormat) -> Self {
        self.pixel_format = pixel_format;
        self
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.luma.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.luma.height
    }
}

#[derive(Debug, Copy, Clone)]
/// Interleaved frame borrowed from a converter's scratch buffer.
///
/// Valid until the next conversion, copy it out to keep it longer.
pub struct OutputImage<'a> {
    pub data: &'a [u8],
    pub width: u32,
    pub height: u32,
    /// Stride here always means bytes per row.
    pub stride: u32,
    pub layout: OutputLayout,
}

impl<'a> OutputImage<'a> {
    #[inline]
    pub fn channels(&self) -> usize {
        self.layout.channels()
    }

    /// Row `y` without padding.
    pub fn row(&self, y: u32) -> &'a [u8] {
        let start = y as usize * self.stride as usize;
        &self.data[start..start + self.width as usize * self.channels()]
    }

    /// Bytes of the pixel at (`x`, `y`) in layout order.
    pub fn pixel(&self, x: u32, y: u32) -> &'a [u8] {
        let channels = self.channels();
        let start = y as usize * self.stride as usize + x as usize * channels;
        &self.data[start..start + channels]
    }

    /// Iterates all pixels row by row.
    pub fn pixels(&self) -> impl Iterator<Item = &'a [u8]> + 'a {
        let channels = self.channels();
        let row_bytes = self.width as usize * channels;
        self.data
            .chunks_exact(self.stride as usize)
            .flat_map(move |row| row[..row_bytes].chunks_exact(channels))
    }
}
