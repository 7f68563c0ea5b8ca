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
use criterion::{criterion_group, criterion_main, Criterion};
use yuv_frame::{
    yuv_nv12_to_argb, ConversionMatrix, ConverterOptions, FrameConverter, OutputLayout,
    PlanarImage,
};

struct Planes {
    y_plane: Vec<u8>,
    uv_plane: Vec<u8>,
    width: u32,
    height: u32,
}

impl Planes {
    fn new(width: u32, height: u32) -> Planes {
        let y_plane = (0..width as usize * height as usize)
            .map(|i| (i * 7 % 251) as u8)
            .collect();
        let uv_plane = (0..width.div_ceil(2) as usize * 2 * height.div_ceil(2) as usize)
            .map(|i| (i * 13 % 241) as u8)
            .collect();
        Planes {
            y_plane,
            uv_plane,
            width,
            height,
        }
    }

    fn image(&self) -> PlanarImage<'_> {
        PlanarImage::nv12(
            &self.y_plane,
            self.width,
            &self.uv_plane,
            self.width.div_ceil(2) * 2,
            self.width,
            self.height,
        )
    }
}

pub fn criterion_benchmark(c: &mut Criterion) {
    for (width, height) in [(1280, 720), (640, 480)] {
        let planes = Planes::new(width, height);
        let image = planes.image();

        c.bench_function(&format!("FrameConverter NV12 -> ARGB {}x{}", width, height), |b| {
            let mut converter = FrameConverter::new();
            b.iter(|| {
                converter.convert(&image).unwrap();
            })
        });

        c.bench_function(&format!("FrameConverter NV12 -> RGB {}x{}", width, height), |b| {
            let options = ConverterOptions::default().with_layout(OutputLayout::Rgb);
            let mut converter = FrameConverter::with_options(options);
            b.iter(|| {
                converter.convert(&image).unwrap();
            })
        });

        c.bench_function(&format!("yuv_nv12_to_argb {}x{}", width, height), |b| {
            let mut argb = vec![0u8; width as usize * height as usize * 4];
            let matrix = ConversionMatrix::bt709_full();
            b.iter(|| {
                yuv_nv12_to_argb(&image.luma, &image.chroma, &mut argb, width * 4, matrix, 255)
                    .unwrap();
            })
        });
    }

    c.bench_function("FrameConverter alternating 1280x720 / 640x480", |b| {
        let large = Planes::new(1280, 720);
        let small = Planes::new(640, 480);
        let mut converter = FrameConverter::new();
        b.iter(|| {
            converter.convert(&large.image()).unwrap();
            converter.convert(&small.image()).unwrap();
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
