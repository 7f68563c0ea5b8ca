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
use crate::converter::FrameConverter;
use crate::images::{OutputImage, PlanarImage};
use crate::transform::{ColorTransform, Nv12Transform};
use crate::yuv_error::ConversionError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, TryLockError};

/// Result of offering a frame to a [`ConverterGate`].
#[derive(Debug)]
pub enum GateOutcome<R> {
    /// The frame was converted and handed to the consumer.
    Converted(R),
    /// Another conversion was in flight, the frame was discarded.
    Dropped,
    /// The frame was rejected, the consumer was not called.
    Failed(ConversionError),
}

impl<R> GateOutcome<R> {
    pub fn is_dropped(&self) -> bool {
        matches!(self, GateOutcome::Dropped)
    }
}

/// Counters snapshot of a [`ConverterGate`].
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct GateStats {
    pub converted: u64,
    pub dropped: u64,
    pub failed: u64,
}

/// Serializes conversions from a capture callback onto one [`FrameConverter`].
///
/// A frame arriving while a previous one is still being converted or consumed
/// is dropped instead of queued, so a slow consumer never builds a backlog of
/// stale frames. The converted image is only reachable inside the `consume`
/// closure, it cannot outlive the exclusive section.
#[derive(Debug)]
pub struct ConverterGate<T: ColorTransform = Nv12Transform> {
    converter: Mutex<FrameConverter<T>>,
    converted: AtomicU64,
    dropped: AtomicU64,
    failed: AtomicU64,
}

impl Default for ConverterGate<Nv12Transform> {
    fn default() -> Self {
        Self::new(FrameConverter::new())
    }
}

impl<T: ColorTransform> ConverterGate<T> {
    pub fn new(converter: FrameConverter<T>) -> Self {
        ConverterGate {
            converter: Mutex::new(converter),
            converted: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    /// Converts `image` and passes the result to `consume`, or drops the frame when busy.
    pub fn try_convert<R>(
        &self,
        image: &PlanarImage,
        consume: impl FnOnce(OutputImage<'_>) -> R,
    ) -> GateOutcome<R> {
        let mut converter = match self.converter.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                log::trace!(
                    "converter busy, dropped {}x{} frame ({} total)",
                    image.width(),
                    image.height(),
                    dropped
                );
                return GateOutcome::Dropped;
            }
            // A panicking consumer cannot leave the scratch buffer half-sized.
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
        };

        match converter.convert(image) {
            Ok(output) => {
                self.converted.fetch_add(1, Ordering::Relaxed);
                GateOutcome::Converted(consume(output))
            }
            Err(err) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                GateOutcome::Failed(err)
            }
        }
    }

    pub fn stats(&self) -> GateStats {
        GateStats {
            converted: self.converted.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }

    /// Frees the converter's scratch buffer, waiting for an in-flight conversion.
    pub fn release(&self) {
        let mut converter = self
            .converter
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        converter.release();
    }

    pub fn into_inner(self) -> FrameConverter<T> {
        self.converter
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::PixelFormat;
    use std::sync::mpsc;
    use std::sync::Arc;

    fn gray_frame(width: u32, height: u32) -> (Vec<u8>, Vec<u8>) {
        (
            vec![200u8; (width * height) as usize],
            vec![128u8; (width.div_ceil(2) * 2 * height.div_ceil(2)) as usize],
        )
    }

    #[test]
    fn converts_when_idle() {
        let gate = ConverterGate::default();
        let (y, uv) = gray_frame(8, 6);
        let image = PlanarImage::nv12(&y, 8, &uv, 8, 8, 6);
        match gate.try_convert(&image, |output| output.pixel(3, 3).to_vec()) {
            GateOutcome::Converted(px) => assert_eq!(px, vec![255, 200, 200, 200]),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(
            gate.stats(),
            GateStats {
                converted: 1,
                dropped: 0,
                failed: 0
            }
        );
    }

    #[test]
    fn drops_frames_while_busy() {
        let gate = Arc::new(ConverterGate::default());
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let worker = {
            let gate = Arc::clone(&gate);
            std::thread::spawn(move || {
                let (y, uv) = gray_frame(16, 16);
                let image = PlanarImage::nv12(&y, 16, &uv, 16, 16, 16);
                gate.try_convert(&image, |output| {
                    entered_tx.send(()).unwrap();
                    release_rx.recv().unwrap();
                    output.width
                })
            })
        };

        entered_rx.recv().unwrap();
        let (y, uv) = gray_frame(16, 16);
        let image = PlanarImage::nv12(&y, 16, &uv, 16, 16, 16);
        for _ in 0..3 {
            assert!(gate.try_convert(&image, |_| ()).is_dropped());
        }
        release_tx.send(()).unwrap();

        match worker.join().unwrap() {
            GateOutcome::Converted(width) => assert_eq!(width, 16),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(matches!(
            gate.try_convert(&image, |_| ()),
            GateOutcome::Converted(())
        ));
        assert_eq!(
            gate.stats(),
            GateStats {
                converted: 2,
                dropped: 3,
                failed: 0
            }
        );
    }

    #[test]
    fn failures_are_counted() {
        let gate = ConverterGate::default();
        let (y, uv) = gray_frame(8, 8);
        let image =
            PlanarImage::nv12(&y, 8, &uv, 8, 8, 8).with_pixel_format(PixelFormat::Yuyv);
        assert!(matches!(
            gate.try_convert(&image, |_| ()),
            GateOutcome::Failed(ConversionError::UnsupportedFormat(PixelFormat::Yuyv))
        ));
        assert_eq!(gate.stats().failed, 1);
    }

    #[test]
    fn recovers_after_consumer_panic() {
        let gate = Arc::new(ConverterGate::default());
        {
            let gate = Arc::clone(&gate);
            let result = std::thread::spawn(move || {
                let (y, uv) = gray_frame(4, 4);
                let image = PlanarImage::nv12(&y, 4, &uv, 4, 4, 4);
                gate.try_convert(&image, |_| panic!("consumer failed"))
            })
            .join();
            assert!(result.is_err());
        }
        let (y, uv) = gray_frame(4, 4);
        let image = PlanarImage::nv12(&y, 4, &uv, 4, 4, 4);
        assert!(matches!(
            gate.try_convert(&image, |output| output.height),
            GateOutcome::Converted(4)
        ));
        gate.release();
        let converter = Arc::try_unwrap(gate).unwrap().into_inner();
        assert!(converter.scratch().is_empty());
    }
}
