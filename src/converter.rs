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
use crate::images::{OutputImage, PixelFormat, PlanarImage};
use crate::scratch::ScratchBuffer;
use crate::transform::{ColorTransform, Nv12Transform};
use crate::yuv_error::{check_nv12_planes, ConversionError};
use crate::yuv_support::OutputLayout;
use crate::YuvError;

/// Alpha written to every output pixel, the source carries no alpha.
const OPAQUE: u8 = 255;

/// Runtime configuration of a [`FrameConverter`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct ConverterOptions {
    /// Interleaved byte order of the output, ARGB by default.
    pub layout: OutputLayout,
    /// Upper bound for the scratch allocation, unbounded by default.
    pub max_scratch_bytes: Option<usize>,
}

impl ConverterOptions {
    pub fn with_layout(mut self, layout: OutputLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_max_scratch_bytes(mut self, max_scratch_bytes: usize) -> Self {
        self.max_scratch_bytes = Some(max_scratch_bytes);
        self
    }
}

/// Converts full range NV12 camera frames into interleaved ARGB/RGB.
///
/// Each converter owns one [`ScratchBuffer`] that is reused while frame
/// dimensions stay the same, so steady-state conversion does not allocate.
/// The returned [`OutputImage`] borrows that buffer and is invalidated by the
/// next call. Independent converters can run on separate threads.
///
/// # Example
/// ```rust
/// use yuv_frame::{FrameConverter, PlanarImage};
///
/// let y_plane = vec![255u8; 4 * 2];
/// let uv_plane = vec![128u8; 4 * 1];
/// let image = PlanarImage::nv12(&y_plane, 4, &uv_plane, 4, 4, 2);
///
/// let mut converter = FrameConverter::new();
/// let output = converter.convert(&image).unwrap();
/// assert_eq!((output.width, output.height, output.stride), (4, 2, 16));
/// assert_eq!(output.pixel(0, 0), &[255, 255, 255, 255]);
/// ```
#[derive(Debug)]
pub struct FrameConverter<T: ColorTransform = Nv12Transform> {
    options: ConverterOptions,
    scratch: ScratchBuffer,
    transform: T,
    holds_frame: bool,
}

impl FrameConverter<Nv12Transform> {
    pub fn new() -> Self {
        Self::with_options(ConverterOptions::default())
    }

    pub fn with_options(options: ConverterOptions) -> Self {
        Self::with_transform(options, Nv12Transform)
    }
}

impl Default for FrameConverter<Nv12Transform> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ColorTransform> FrameConverter<T> {
    /// Converter running a custom kernel.
    pub fn with_transform(options: ConverterOptions, transform: T) -> Self {
        let scratch = match options.max_scratch_bytes {
            Some(max_bytes) => ScratchBuffer::with_limit(max_bytes),
            None => ScratchBuffer::new(),
        };
        FrameConverter {
            options,
            scratch,
            transform,
            holds_frame: false,
        }
    }

    pub fn options(&self) -> &ConverterOptions {
        &self.options
    }

    pub fn scratch(&self) -> &ScratchBuffer {
        &self.scratch
    }

    /// Converts one frame into the scratch buffer.
    ///
    /// Checks run in order: pixel format, plane presence, plane layout. Nothing
    /// is allocated until all of them pass. The input is only read.
    pub fn convert(&mut self, image: &PlanarImage) -> Result<OutputImage<'_>, ConversionError> {
        if image.pixel_format != PixelFormat::Yuv420BiPlanarFullRange {
            return Err(ConversionError::UnsupportedFormat(image.pixel_format));
        }
        if !image.luma.is_present() {
            return Err(ConversionError::MissingPlane(0));
        }
        if !image.chroma.is_present() {
            return Err(ConversionError::MissingPlane(1));
        }
        check_nv12_planes(&image.luma, &image.chroma).map_err(ConversionError::InvalidLayout)?;

        let width = image.luma.width;
        let height = image.luma.height;
        let layout = self.options.layout;
        let stride = u32::try_from(width as usize * layout.channels())
            .map_err(|_| ConversionError::InvalidLayout(YuvError::PointerOverflow))?;

        if self.scratch.ensure(width, height, layout.channels())? {
            self.holds_frame = false;
        }

        let matrix = ConversionMatrix::bt709_full();
        if let Err(err) = self.transform.convert(
            &image.luma,
            &image.chroma,
            self.scratch.as_mut_slice(),
            stride,
            layout,
            matrix,
            OPAQUE,
        ) {
            log::warn!("dropping {}x{} frame: {}", width, height, err);
            self.holds_frame = false;
            return Err(ConversionError::ConversionFailure(err.code()));
        }

        self.holds_frame = true;
        Ok(self.output_view(width, height, stride))
    }

    /// The most recent successfully converted frame, if the scratch buffer still holds it.
    ///
    /// Format, plane and allocation failures leave the previous frame readable,
    /// a failed transform does not.
    pub fn last_output(&self) -> Option<OutputImage<'_>> {
        if !self.holds_frame {
            return None;
        }
        let (width, height) = self.scratch.dimensions()?;
        let stride = width * self.options.layout.channels() as u32;
        Some(self.output_view(width, height, stride))
    }

    /// Frees the scratch buffer.
    pub fn release(&mut self) {
        self.scratch.release();
        self.holds_frame = false;
    }

    fn output_view(&self, width: u32, height: u32, stride: u32) -> OutputImage<'_> {
        OutputImage {
            data: self.scratch.as_slice(),
            width,
            height,
            stride,
            layout: self.options.layout,
        }
    }
}
