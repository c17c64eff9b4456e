//! H.264 frame encoding and MP4 container writing for the local video
//! backend. Frames come in as raw RGB, go through the bundled openh264
//! encoder, and are written as one-tick samples into an avc1 track.

use super::providers::ProviderError;
use bytes::Bytes;
use mp4::{AvcConfig, MediaConfig, Mp4Config, Mp4Sample, Mp4Writer, TrackConfig, TrackType};
use openh264::encoder::Encoder;
use openh264::formats::{RgbSliceU8, YUVBuffer};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// One encoded frame, repackaged from annex-B to length-prefixed NAL units.
pub struct EncodedFrame {
    pub data: Vec<u8>,
    pub is_keyframe: bool,
}

/// Stateful per-video H.264 encoder. Harvests SPS/PPS from the stream for
/// the container's decoder configuration.
pub struct H264FrameEncoder {
    encoder: Encoder,
    sps: Option<Vec<u8>>,
    pps: Option<Vec<u8>>,
}

impl H264FrameEncoder {
    pub fn new() -> Result<Self, ProviderError> {
        let encoder = Encoder::new().map_err(|e| ProviderError::Encode(e.to_string()))?;
        Ok(Self {
            encoder,
            sps: None,
            pps: None,
        })
    }

    /// Encode one RGB frame. Width and height must be even (YUV 4:2:0).
    pub fn encode_rgb(
        &mut self,
        rgb: &[u8],
        width: u32,
        height: u32,
    ) -> Result<EncodedFrame, ProviderError> {
        let source = RgbSliceU8::new(rgb, (width as usize, height as usize));
        let yuv = YUVBuffer::from_rgb_source(source);
        let bitstream = self
            .encoder
            .encode(&yuv)
            .map_err(|e| ProviderError::Encode(e.to_string()))?;
        let annexb = bitstream.to_vec();

        let mut data = Vec::with_capacity(annexb.len());
        let mut is_keyframe = false;
        for nal in split_annexb(&annexb) {
            let Some(&header) = nal.first() else { continue };
            match header & 0x1f {
                7 => {
                    self.sps.get_or_insert_with(|| nal.to_vec());
                }
                8 => {
                    self.pps.get_or_insert_with(|| nal.to_vec());
                }
                1..=5 => {
                    if header & 0x1f == 5 {
                        is_keyframe = true;
                    }
                    data.extend_from_slice(&(nal.len() as u32).to_be_bytes());
                    data.extend_from_slice(nal);
                }
                // SEI, access unit delimiters and friends are not sample data.
                _ => {}
            }
        }

        Ok(EncodedFrame { data, is_keyframe })
    }

    /// SPS and PPS seen so far, if any.
    pub fn parameter_sets(&self) -> Option<(&[u8], &[u8])> {
        match (&self.sps, &self.pps) {
            (Some(sps), Some(pps)) => Some((sps.as_slice(), pps.as_slice())),
            _ => None,
        }
    }
}

/// Write the encoded frames into a new MP4 at `path`, one sample per frame,
/// track timescale = fps.
pub fn write_mp4(
    path: &Path,
    width: u32,
    height: u32,
    fps: u32,
    sps: &[u8],
    pps: &[u8],
    frames: &[EncodedFrame],
) -> Result<(), ProviderError> {
    // avc1 track dimensions are 16-bit in the container.
    if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
        return Err(ProviderError::InvalidRequest(format!(
            "frame dimensions {}x{} exceed the container limit",
            width, height
        )));
    }

    let file = File::create(path)?;

    let config = Mp4Config {
        major_brand: four_cc("isom")?,
        minor_version: 512,
        compatible_brands: vec![
            four_cc("isom")?,
            four_cc("iso2")?,
            four_cc("avc1")?,
            four_cc("mp41")?,
        ],
        timescale: 1000,
    };

    let mut writer = Mp4Writer::write_start(BufWriter::new(file), &config)
        .map_err(|e| ProviderError::Encode(format!("failed to open MP4 writer: {}", e)))?;

    let track = TrackConfig {
        track_type: TrackType::Video,
        timescale: fps,
        language: "und".to_string(),
        media_conf: MediaConfig::AvcConfig(AvcConfig {
            width: width as u16,
            height: height as u16,
            seq_param_set: sps.to_vec(),
            pic_param_set: pps.to_vec(),
        }),
    };
    writer
        .add_track(&track)
        .map_err(|e| ProviderError::Encode(format!("failed to add video track: {}", e)))?;

    for (index, frame) in frames.iter().enumerate() {
        let sample = Mp4Sample {
            start_time: index as u64,
            duration: 1,
            rendering_offset: 0,
            is_sync: frame.is_keyframe,
            bytes: Bytes::copy_from_slice(&frame.data),
        };
        writer
            .write_sample(1, &sample)
            .map_err(|e| ProviderError::Encode(format!("failed to write sample: {}", e)))?;
    }

    writer
        .write_end()
        .map_err(|e| ProviderError::Encode(format!("failed to finalize MP4: {}", e)))?;
    writer
        .into_writer()
        .flush()
        .map_err(ProviderError::Io)?;

    Ok(())
}

fn four_cc(code: &str) -> Result<mp4::FourCC, ProviderError> {
    code.parse()
        .map_err(|_| ProviderError::Encode(format!("invalid brand: {}", code)))
}

/// Split an annex-B byte stream into NAL units, handling both 3- and 4-byte
/// start codes.
fn split_annexb(data: &[u8]) -> Vec<&[u8]> {
    let mut starts = Vec::new();
    let mut i = 0;
    while i + 3 <= data.len() {
        if data[i] == 0 && data[i + 1] == 0 && data[i + 2] == 1 {
            starts.push(i);
            i += 3;
        } else {
            i += 1;
        }
    }

    let mut nals = Vec::with_capacity(starts.len());
    for (k, &start) in starts.iter().enumerate() {
        let begin = start + 3;
        let mut end = starts.get(k + 1).copied().unwrap_or(data.len());
        // A trailing zero before the next start code belongs to a 4-byte code.
        if k + 1 < starts.len() && end > begin && data[end - 1] == 0 {
            end -= 1;
        }
        if end > begin {
            nals.push(&data[begin..end]);
        }
    }
    nals
}
