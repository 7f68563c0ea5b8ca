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
use crate::yuv_error::check_overflow_v3;
use crate::ConversionError;

/// Recycled interleaved output storage.
///
/// Holds exactly `width * height * channels` bytes while non-empty. A request
/// for other dimensions obtains the new allocation first and only then drops
/// the old one, so a failed request leaves the buffer as it was.
#[derive(Debug, Default)]
pub struct ScratchBuffer {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: usize,
    max_bytes: Option<usize>,
    reallocations: u64,
}

impl ScratchBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer that refuses to grow beyond `max_bytes`.
    pub fn with_limit(max_bytes: usize) -> Self {
        ScratchBuffer {
            max_bytes: Some(max_bytes),
            ..Self::default()
        }
    }

    /// Cached (width, height), `None` while nothing is allocated.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        if self.data.is_empty() {
            None
        } else {
            Some((self.width, self.height))
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Address of the current allocation, changes only on reallocation.
    pub fn as_ptr(&self) -> *const u8 {
        self.data.as_ptr()
    }

    /// Number of allocations performed so far.
    pub fn reallocations(&self) -> u64 {
        self.reallocations
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Makes the buffer hold a `width` x `height` image of `channels` bytes per pixel.
    ///
    /// Returns `true` when a new allocation was made.
    pub(crate) fn ensure(
        &mut self,
        width: u32,
        height: u32,
        channels: usize,
    ) -> Result<bool, ConversionError> {
        if !self.data.is_empty()
            && self.width == width
            && self.height == height
            && self.channels == channels
        {
            return Ok(false);
        }

        let requested = check_overflow_v3(width as usize, height as usize, channels)
            .map_err(ConversionError::InvalidLayout)?;
        if self.max_bytes.is_some_and(|max_bytes| requested > max_bytes) {
            log::warn!(
                "scratch buffer of {} bytes exceeds the {:?} byte limit",
                requested,
                self.max_bytes
            );
            return Err(ConversionError::AllocationFailure { requested });
        }

        let mut fresh = Vec::new();
        if fresh.try_reserve_exact(requested).is_err() {
            log::warn!("unable to allocate {} bytes for scratch buffer", requested);
            return Err(ConversionError::AllocationFailure { requested });
        }
        fresh.resize(requested, 0);

        log::debug!(
            "scratch buffer {:?} -> {}x{}x{} ({} bytes)",
            self.dimensions(),
            width,
            height,
            channels,
            requested
        );
        self.data = fresh;
        self.width = width;
        self.height = height;
        self.channels = channels;
        self.reallocations += 1;
        Ok(true)
    }

    /// Frees the storage, the next request allocates again.
    pub fn release(&mut self) {
        if !self.data.is_empty() {
            log::debug!("releasing scratch buffer of {} bytes", self.data.len());
        }
        self.data = Vec::new();
        self.width = 0;
        self.height = 0;
        self.channels = 0;
    }
}
