//! Local video backend: synthesizes the video frame by frame and writes
//! `duration * fps` frames into a new MP4 container.

use super::canvas::render_canvas;
use super::{ProviderError, VideoGenerator, VideoOptions};
use crate::services::render::Rasterizer;
use crate::services::video::{H264FrameEncoder, write_mp4};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// Upper bound on frames per video; requests beyond it are rejected rather
/// than encoded for minutes on end.
const MAX_FRAMES: u64 = 36_000;

/// Frame-synthesis video provider.
pub struct FrameSynthVideoProvider {
    rasterizer: Arc<Rasterizer>,
}

impl FrameSynthVideoProvider {
    pub fn new(rasterizer: Arc<Rasterizer>) -> Self {
        Self { rasterizer }
    }
}

#[async_trait]
impl VideoGenerator for FrameSynthVideoProvider {
    async fn generate(
        &self,
        text: &str,
        options: &VideoOptions,
        output: &Path,
    ) -> Result<(), ProviderError> {
        // YUV 4:2:0 requires even dimensions; odd values round down.
        let width = options.width.max(2) & !1;
        let height = options.height.max(2) & !1;
        let total_frames = u64::from(options.duration_secs) * u64::from(options.fps);
        if total_frames > MAX_FRAMES {
            return Err(ProviderError::InvalidRequest(format!(
                "duration * fps = {} frames exceeds the {} frame limit",
                total_frames, MAX_FRAMES
            )));
        }

        let frame = render_canvas(
            &self.rasterizer,
            text,
            width,
            height,
            &options.background_color,
            &options.text_color,
        )?;

        let mut encoder = H264FrameEncoder::new()?;
        let mut frames = Vec::with_capacity(total_frames as usize);
        for _ in 0..total_frames {
            frames.push(encoder.encode_rgb(frame.as_raw(), width, height)?);
        }

        let (sps, pps) = encoder.parameter_sets().ok_or_else(|| {
            ProviderError::Encode("encoder produced no parameter sets".to_string())
        })?;

        write_mp4(output, width, height, options.fps, sps, pps, &frames)?;

        tracing::info!(
            frames = total_frames,
            fps = options.fps,
            width,
            height,
            output = %output.display(),
            "Synthesized video"
        );

        Ok(())
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;

    fn options() -> VideoOptions {
        VideoOptions {
            width: 64,
            height: 64,
            fps: 10,
            duration_secs: 2,
            background_color: "black".to_string(),
            text_color: "white".to_string(),
        }
    }

    fn sample_count(path: &Path) -> u32 {
        let file = std::fs::File::open(path).expect("open");
        let size = file.metadata().expect("metadata").len();
        let reader = mp4::Mp4Reader::read_header(BufReader::new(file), size).expect("read mp4");
        let track = reader.tracks().values().next().expect("video track");
        track.sample_count()
    }

    #[tokio::test]
    async fn writes_duration_times_fps_frames() {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = dir.path().join("out.mp4");

        let provider = FrameSynthVideoProvider::new(Arc::new(Rasterizer::load(None, 40.0)));
        provider
            .generate("Hi", &options(), &output)
            .await
            .expect("generate");

        assert!(output.metadata().expect("metadata").len() > 0);
        assert_eq!(sample_count(&output), 20);
    }

    #[tokio::test]
    async fn oversized_frame_count_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = dir.path().join("huge.mp4");

        let provider = FrameSynthVideoProvider::new(Arc::new(Rasterizer::load(None, 40.0)));
        let mut opts = options();
        opts.duration_secs = 65_536;
        opts.fps = 65_536;

        let err = provider.generate("x", &opts, &output).await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidRequest(_)));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn odd_dimensions_round_down() {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = dir.path().join("odd.mp4");

        let provider = FrameSynthVideoProvider::new(Arc::new(Rasterizer::load(None, 40.0)));
        let mut opts = options();
        opts.width = 65;
        opts.height = 33;
        opts.duration_secs = 1;
        provider
            .generate("x", &opts, &output)
            .await
            .expect("generate");

        assert_eq!(sample_count(&output), 10);
    }
}
