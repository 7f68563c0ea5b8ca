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
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use yuv_frame::{
    ConversionError, ConverterGate, ConverterOptions, FrameConverter, GateOutcome, OutputImage,
    OutputLayout, PlanarImage,
};

/// Pushes synthetic NV12 camera frames through a converter gate
#[derive(Parser, Debug)]
#[command(name = "yuv-frame-demo")]
#[command(version, about = "Synthetic NV12 capture through a recycling converter", long_about = None)]
struct Args {
    #[arg(long, default_value = "1280", value_parser = clap::value_parser!(u32).range(1..))]
    width: u32,

    #[arg(long, default_value = "720", value_parser = clap::value_parser!(u32).range(1..))]
    height: u32,

    /// Frames emitted by each capture thread
    #[arg(long, default_value = "120")]
    frames: u32,

    /// Target capture rate per thread
    #[arg(long, default_value = "30")]
    fps: u32,

    /// Number of capture threads sharing the converter
    #[arg(long, default_value = "2")]
    threads: u32,

    /// Extra time spent consuming each converted frame
    #[arg(long, default_value = "0")]
    consume_ms: u64,

    #[arg(long, default_value = "argb")]
    layout: LayoutArg,

    /// PNG file receiving the last converted frame
    #[arg(long, short, default_value = "frame.png")]
    output: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
enum LayoutArg {
    #[default]
    Argb,
    Rgba,
    Bgra,
    Rgb,
}

impl From<LayoutArg> for OutputLayout {
    fn from(value: LayoutArg) -> Self {
        match value {
            LayoutArg::Argb => OutputLayout::Argb,
            LayoutArg::Rgba => OutputLayout::Rgba,
            LayoutArg::Bgra => OutputLayout::Bgra,
            LayoutArg::Rgb => OutputLayout::Rgb,
        }
    }
}

#[derive(Debug, Error)]
enum DemoError {
    #[error("conversion failed: {0}")]
    Conversion(#[from] ConversionError),
    #[error("could not write image: {0}")]
    Image(#[from] image::ImageError),
    #[error("no frame was converted")]
    NoFrame,
}

/// Moving gradient with a padded luma stride, as camera drivers usually hand out.
struct SyntheticCamera {
    width: u32,
    height: u32,
    y_stride: u32,
    uv_stride: u32,
    y_plane: Vec<u8>,
    uv_plane: Vec<u8>,
}

impl SyntheticCamera {
    fn new(width: u32, height: u32) -> Self {
        let y_stride = (width + 63) & !63;
        let uv_stride = y_stride;
        SyntheticCamera {
            width,
            height,
            y_stride,
            uv_stride,
            y_plane: vec![0u8; y_stride as usize * height as usize],
            uv_plane: vec![128u8; uv_stride as usize * height.div_ceil(2) as usize],
        }
    }

    fn render(&mut self, frame: u32) {
        let shift = frame as usize * 4;
        for (y, row) in self
            .y_plane
            .chunks_exact_mut(self.y_stride as usize)
            .enumerate()
        {
            for (x, dst) in row[..self.width as usize].iter_mut().enumerate() {
                *dst = ((x + y + shift) & 0xff) as u8;
            }
        }
        let chroma_width = self.width.div_ceil(2) as usize;
        for (y, row) in self
            .uv_plane
            .chunks_exact_mut(self.uv_stride as usize)
            .enumerate()
        {
            for (x, pair) in row[..chroma_width * 2].chunks_exact_mut(2).enumerate() {
                pair[0] = (x * 255 / chroma_width.max(1)) as u8;
                pair[1] = ((y + shift) & 0xff) as u8;
            }
        }
    }

    fn image(&self) -> PlanarImage<'_> {
        PlanarImage::nv12(
            &self.y_plane,
            self.y_stride,
            &self.uv_plane,
            self.uv_stride,
            self.width,
            self.height,
        )
    }
}

struct CapturedFrame {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl CapturedFrame {
    fn from_output(output: &OutputImage) -> CapturedFrame {
        let layout = output.layout;
        let mut rgba = Vec::with_capacity(output.width as usize * output.height as usize * 4);
        for px in output.pixels() {
            rgba.push(px[layout.r_offset()]);
            rgba.push(px[layout.g_offset()]);
            rgba.push(px[layout.b_offset()]);
            rgba.push(layout.a_offset().map_or(255, |offset| px[offset]));
        }
        CapturedFrame {
            width: output.width,
            height: output.height,
            rgba,
        }
    }
}

fn run_capture(
    args: &Args,
    gate: &ConverterGate,
    latest: &Mutex<Option<CapturedFrame>>,
    fatal: &Mutex<Option<ConversionError>>,
) {
    let mut camera = SyntheticCamera::new(args.width, args.height);
    let interval = Duration::from_secs_f64(1. / args.fps.max(1) as f64);
    let consume_time = Duration::from_millis(args.consume_ms);
    let started = Instant::now();

    for frame in 0..args.frames {
        camera.render(frame);
        let outcome = gate.try_convert(&camera.image(), |output| {
            let captured = CapturedFrame::from_output(&output);
            thread::sleep(consume_time);
            captured
        });
        match outcome {
            GateOutcome::Converted(captured) => {
                if let Ok(mut latest) = latest.lock() {
                    *latest = Some(captured);
                }
            }
            GateOutcome::Dropped => {}
            GateOutcome::Failed(err) => {
                log::error!("frame {} failed: {}", frame, err);
                if !err.is_retryable() {
                    if let Ok(mut fatal) = fatal.lock() {
                        fatal.get_or_insert(err);
                    }
                    return;
                }
            }
        }

        let deadline = interval * (frame + 1);
        if let Some(wait) = deadline.checked_sub(started.elapsed()) {
            thread::sleep(wait);
        }
    }
}

fn run(args: Args) -> Result<(), DemoError> {
    let options = ConverterOptions::default().with_layout(args.layout.into());
    let gate = Arc::new(ConverterGate::new(FrameConverter::with_options(options)));
    let latest = Arc::new(Mutex::new(None));
    let fatal = Arc::new(Mutex::new(None));
    let args = Arc::new(args);

    let started = Instant::now();
    let workers: Vec<_> = (0..args.threads.max(1))
        .map(|_| {
            let args = Arc::clone(&args);
            let gate = Arc::clone(&gate);
            let latest = Arc::clone(&latest);
            let fatal = Arc::clone(&fatal);
            thread::spawn(move || run_capture(&args, &gate, &latest, &fatal))
        })
        .collect();
    for worker in workers {
        if worker.join().is_err() {
            log::error!("capture thread panicked");
        }
    }

    let stats = gate.stats();
    log::info!(
        "{}x{} {:?}: converted {}, dropped {}, failed {} in {:?}",
        args.width,
        args.height,
        args.layout,
        stats.converted,
        stats.dropped,
        stats.failed,
        started.elapsed()
    );

    if let Some(err) = fatal.lock().ok().and_then(|mut fatal| fatal.take()) {
        return Err(err.into());
    }

    let frame = latest
        .lock()
        .ok()
        .and_then(|mut latest| latest.take())
        .ok_or(DemoError::NoFrame)?;
    image::save_buffer(
        &args.output,
        &frame.rgba,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
    )?;
    log::info!("wrote {}", args.output.display());
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(err) = run(args) {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(Args::try_parse_from(["yuv-frame-demo", "--width", "0"]).is_err());
        assert!(Args::try_parse_from(["yuv-frame-demo", "--height", "0"]).is_err());
    }

    #[test]
    fn defaults_describe_a_720p_argb_capture() {
        let args = Args::try_parse_from(["yuv-frame-demo"]).unwrap();
        assert_eq!((args.width, args.height), (1280, 720));
        assert_eq!(OutputLayout::from(args.layout), OutputLayout::Argb);
    }

    #[test]
    fn odd_sized_camera_renders_inside_its_planes() {
        let mut camera = SyntheticCamera::new(3, 1);
        camera.render(7);
        let image = camera.image();
        let mut converter = FrameConverter::new();
        let output = converter.convert(&image).unwrap();
        assert_eq!((output.width, output.height), (3, 1));
    }
}
