//! Live video frames and their GPU upload.
//!
//! [`VideoSource`] is the seam to the camera collaborator: a pollable
//! "ready" predicate plus a current-frame accessor. The production
//! implementation is [`CameraCapture`] (nokhwa); tests substitute doubles.
//! [`VideoFrameSource`] owns the GPU-side video texture and copies the most
//! recent frame into it each tick. The full-frame transfer is the single
//! highest-cost per-tick operation; that cost is accepted for simplicity.

use anyhow::{Context as _, Result};
use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    utils::{
        CameraFormat, CameraIndex, ControlValueSetter, FrameFormat, KnownCameraControl,
        RequestedFormat, RequestedFormatType, Resolution,
    },
};

use crate::data_structures::texture::Texture;

/// A decoded camera frame, tightly packed RGBA8.
#[derive(Clone, Debug, PartialEq)]
pub struct RgbaFrame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RgbaFrame {
    /// Expand tightly packed RGB bytes to RGBA with opaque alpha.
    pub fn from_rgb(width: u32, height: u32, rgb: &[u8]) -> Self {
        debug_assert_eq!(rgb.len(), (width * height * 3) as usize);
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for px in rgb.chunks_exact(3) {
            pixels.extend_from_slice(&[px[0], px[1], px[2], 255]);
        }
        Self {
            width,
            height,
            pixels,
        }
    }
}

/// The camera collaborator seam: asynchronously updated frames, polled by
/// the render loop once per tick.
pub trait VideoSource {
    /// Whether a decodable frame can currently be produced.
    fn ready(&self) -> bool;

    /// The current frame at native decode resolution.
    fn current_frame(&mut self) -> Result<RgbaFrame>;
}

/// Requested capture size; the stream may settle on something close.
pub const CAPTURE_WIDTH: u32 = 800;
pub const CAPTURE_HEIGHT: u32 = 800;

/// nokhwa-backed camera stream.
pub struct CameraCapture {
    cam: Camera,
}

impl CameraCapture {
    /// Open camera `index` and start streaming. Called once at startup; on
    /// failure the renderer degrades to a permanently absent video source.
    pub fn new(index: u32) -> Result<Self> {
        let idx = CameraIndex::Index(index);

        // YUYV is uncompressed and cheap to convert to RGB.
        let fmt = CameraFormat::new(
            Resolution::new(CAPTURE_WIDTH, CAPTURE_HEIGHT),
            FrameFormat::YUYV,
            30,
        );
        let req = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(fmt));

        let mut cam = Camera::new(idx, req).context("create camera")?;
        cam.open_stream().context("open camera stream")?;

        // Brightness is a hint only; not every backend exposes the control.
        if let Err(e) =
            cam.set_camera_control(KnownCameraControl::Brightness, ControlValueSetter::Integer(2))
        {
            log::debug!("brightness hint not applied: {e}");
        }

        Ok(Self { cam })
    }
}

impl VideoSource for CameraCapture {
    fn ready(&self) -> bool {
        self.cam.is_stream_open()
    }

    fn current_frame(&mut self) -> Result<RgbaFrame> {
        let frame = self.cam.frame().context("fetch camera frame")?;
        let rgb = frame
            .decode_image::<RgbFormat>()
            .context("decode camera frame")?;
        let (w, h) = rgb.dimensions();
        Ok(RgbaFrame::from_rgb(w, h, rgb.as_raw()))
    }
}

/// Poll the source for a frame. Absent source, not-ready source and decode
/// failures all come back as `None`: the texture keeps its previous
/// contents and the tick continues.
pub(crate) fn poll_frame(source: Option<&mut (dyn VideoSource + '_)>) -> Option<RgbaFrame> {
    let source = source?;
    if !source.ready() {
        return None;
    }
    match source.current_frame() {
        Ok(frame) => Some(frame),
        Err(e) => {
            log::warn!("video frame skipped: {e}");
            None
        }
    }
}

/// Owns the video texture and keeps it in sync with the camera.
pub struct VideoFrameSource {
    source: Option<Box<dyn VideoSource>>,
    pub texture: Texture,
    width: u32,
    height: u32,
    /// Bumped whenever the texture is reallocated so the compositor knows
    /// to rebuild its bind group.
    generation: u64,
}

impl VideoFrameSource {
    /// Initial logical texture size before the first frame arrives.
    pub const DEFAULT_WIDTH: u32 = 800;
    pub const DEFAULT_HEIGHT: u32 = 600;

    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        source: Option<Box<dyn VideoSource>>,
    ) -> Self {
        let texture = Texture::create_video_texture(
            device,
            queue,
            Self::DEFAULT_WIDTH,
            Self::DEFAULT_HEIGHT,
            "video texture",
        );
        Self {
            source,
            texture,
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
            generation: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Copy the most recent camera frame into the video texture. A no-op
    /// when no frame is available. The upload adopts the frame's native
    /// resolution: a size change reallocates the texture.
    pub fn upload_current_frame(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        let Some(frame) = poll_frame(self.source.as_deref_mut()) else {
            return;
        };

        if frame.width != self.width || frame.height != self.height {
            log::info!(
                "video stream settled on {}x{}, reallocating texture",
                frame.width,
                frame.height
            );
            self.texture =
                Texture::create_video_texture(device, queue, frame.width, frame.height, "video texture");
            self.width = frame.width;
            self.height = frame.height;
            self.generation += 1;
        }

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &self.texture.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            &frame.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(frame.width * 4),
                rows_per_image: Some(frame.height),
            },
            wgpu::Extent3d {
                width: frame.width,
                height: frame.height,
                depth_or_array_layers: 1,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    struct SolidSource {
        ready: bool,
        fail: bool,
    }

    impl VideoSource for SolidSource {
        fn ready(&self) -> bool {
            self.ready
        }

        fn current_frame(&mut self) -> Result<RgbaFrame> {
            if self.fail {
                bail!("decoder hiccup");
            }
            Ok(RgbaFrame::from_rgb(2, 1, &[10, 20, 30, 40, 50, 60]))
        }
    }

    #[test]
    fn rgb_expands_to_opaque_rgba() {
        let frame = RgbaFrame::from_rgb(2, 1, &[1, 2, 3, 4, 5, 6]);
        assert_eq!(frame.pixels, vec![1, 2, 3, 255, 4, 5, 6, 255]);
    }

    #[test]
    fn absent_source_yields_no_frame() {
        assert!(poll_frame(None).is_none());
    }

    #[test]
    fn unready_source_yields_no_frame() {
        let mut s = SolidSource {
            ready: false,
            fail: false,
        };
        assert!(poll_frame(Some(&mut s)).is_none());
    }

    #[test]
    fn failing_source_degrades_to_no_frame() {
        let mut s = SolidSource {
            ready: true,
            fail: true,
        };
        assert!(poll_frame(Some(&mut s)).is_none());
    }

    #[test]
    fn ready_source_yields_frame() {
        let mut s = SolidSource {
            ready: true,
            fail: false,
        };
        let frame = poll_frame(Some(&mut s)).unwrap();
        assert_eq!((frame.width, frame.height), (2, 1));
        assert_eq!(frame.pixels.len(), 8);
    }
}
