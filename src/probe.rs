// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Audio file probing.
//!
//! Resolves the frame count and length of a sample when the catalog does not
//! already know them. Built on symphonia, so anything symphonia can demux
//! (WAV, AIFF, FLAC, MP3, ...) can be probed.

use std::fs::File;
use std::path::Path;

use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::get_probe;

/// Error types for audio probe operations.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("Audio file error: {0}")]
    AudioError(#[from] SymphoniaError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("No audio track found in {0}")]
    NoAudioTrack(String),

    #[error("No sample rate specified in {0}")]
    NoSampleRate(String),
}

/// The probed characteristics of a sample: the frame count and the length in
/// seconds.
pub struct Characteristics {
    pub frames: u64,
    pub length: f64,
}

/// Returns the frame count of the audio file at the given path.
pub fn frame_count<P: AsRef<Path>>(path: P) -> Result<u64, ProbeError> {
    Ok(characteristics(path)?.frames)
}

/// Probes the audio file at the given path for its frame count and length.
pub fn characteristics<P: AsRef<Path>>(path: P) -> Result<Characteristics, ProbeError> {
    let path_ref = path.as_ref();
    let file = File::open(path_ref)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    // A hint from the file extension helps the format registry guess the format.
    let mut hint = Hint::new();
    if let Some(extension) = path_ref.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(extension);
    }

    let meta_opts: MetadataOptions = Default::default();
    let fmt_opts: FormatOptions = Default::default();
    let probed = get_probe().format(&hint, mss, &fmt_opts, &meta_opts)?;
    let mut format_reader = probed.format;

    // Find the first audio track.
    let track = format_reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| ProbeError::NoAudioTrack(path_ref.display().to_string()))?;
    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| ProbeError::NoSampleRate(path_ref.display().to_string()))?;

    // Most containers report the frame count up front. When one doesn't, walk
    // the packets and sum their durations instead.
    let frames = match track.codec_params.n_frames {
        Some(n_frames) => n_frames,
        None => {
            let mut total: u64 = 0;
            loop {
                match format_reader.next_packet() {
                    Ok(packet) => {
                        if packet.track_id() == track_id {
                            total += packet.dur();
                        }
                    }
                    Err(SymphoniaError::IoError(e))
                        if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                    {
                        break;
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            total
        }
    };

    Ok(Characteristics {
        frames,
        length: frames as f64 / sample_rate as f64,
    })
}
