//! Minimal RIFF/WAVE decoding for enrollment and match payloads.
//!
//! Accepts 16-bit integer PCM, mono or stereo; stereo is mixed down to mono
//! by averaging. Anything else — compressed formats, float samples, other
//! bit depths, truncated files — is a decode error.

use crate::VoiceprintError;

/// Decoded PCM16 signed little-endian mono audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcmAudio {
    /// Sample rate in Hz as declared by the container.
    pub sample_rate: u32,
    /// Raw PCM16LE mono bytes.
    pub data: Vec<u8>,
}

impl PcmAudio {
    /// Returns the number of samples.
    pub fn len(&self) -> usize {
        self.data.len() / 2
    }

    /// Returns true if the audio holds no samples.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Parses a WAV payload into PCM16 mono audio.
pub fn decode(bytes: &[u8]) -> Result<PcmAudio, VoiceprintError> {
    if bytes.len() < 12 {
        return Err(err("truncated header"));
    }
    if &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err(err("not a RIFF/WAVE file"));
    }

    let mut fmt: Option<Format> = None;
    let mut data: Option<&[u8]> = None;

    let mut pos = 12;
    while pos + 8 <= bytes.len() {
        let id = &bytes[pos..pos + 4];
        let size = u32::from_le_bytes(bytes[pos + 4..pos + 8].try_into().unwrap()) as usize;
        let body_start = pos + 8;
        let body_end = body_start
            .checked_add(size)
            .ok_or_else(|| err("chunk size overflow"))?;
        if body_end > bytes.len() {
            return Err(err("truncated chunk"));
        }
        let body = &bytes[body_start..body_end];

        match id {
            b"fmt " => fmt = Some(parse_fmt(body)?),
            b"data" => data = Some(body),
            _ => {}
        }

        // Chunks are word-aligned.
        pos = body_end + (size & 1);
    }

    let fmt = fmt.ok_or_else(|| err("missing fmt chunk"))?;
    let data = data.ok_or_else(|| err("missing data chunk"))?;
    if data.is_empty() {
        return Err(err("empty data chunk"));
    }

    let frame = 2 * fmt.channels as usize;
    if data.len() % frame != 0 {
        return Err(err("data chunk not frame-aligned"));
    }

    let mono = match fmt.channels {
        1 => data.to_vec(),
        2 => downmix_stereo(data),
        _ => unreachable!("validated in parse_fmt"),
    };

    Ok(PcmAudio {
        sample_rate: fmt.sample_rate,
        data: mono,
    })
}

struct Format {
    channels: u16,
    sample_rate: u32,
}

const FORMAT_PCM: u16 = 1;

fn parse_fmt(body: &[u8]) -> Result<Format, VoiceprintError> {
    if body.len() < 16 {
        return Err(err("short fmt chunk"));
    }
    let audio_format = u16::from_le_bytes([body[0], body[1]]);
    let channels = u16::from_le_bytes([body[2], body[3]]);
    let sample_rate = u32::from_le_bytes(body[4..8].try_into().unwrap());
    let bits = u16::from_le_bytes([body[14], body[15]]);

    if audio_format != FORMAT_PCM {
        return Err(err(&format!("unsupported audio format {audio_format}")));
    }
    if bits != 16 {
        return Err(err(&format!("unsupported bit depth {bits}")));
    }
    if channels == 0 || channels > 2 {
        return Err(err(&format!("unsupported channel count {channels}")));
    }
    if sample_rate == 0 {
        return Err(err("zero sample rate"));
    }

    Ok(Format {
        channels,
        sample_rate,
    })
}

fn downmix_stereo(data: &[u8]) -> Vec<u8> {
    let mut mono = Vec::with_capacity(data.len() / 2);
    for frame in data.chunks_exact(4) {
        let left = i16::from_le_bytes([frame[0], frame[1]]) as i32;
        let right = i16::from_le_bytes([frame[2], frame[3]]) as i32;
        let mixed = ((left + right) / 2) as i16;
        mono.extend_from_slice(&mixed.to_le_bytes());
    }
    mono
}

fn err(reason: &str) -> VoiceprintError {
    VoiceprintError::Decode(reason.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a minimal valid WAV file around interleaved PCM16 samples.
    fn wav_bytes(channels: u16, sample_rate: u32, samples: &[i16]) -> Vec<u8> {
        let data_len = samples.len() * 2;
        let mut out = Vec::new();
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&((36 + data_len) as u32).to_le_bytes());
        out.extend_from_slice(b"WAVE");

        out.extend_from_slice(b"fmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes()); // PCM
        out.extend_from_slice(&channels.to_le_bytes());
        out.extend_from_slice(&sample_rate.to_le_bytes());
        let byte_rate = sample_rate * channels as u32 * 2;
        out.extend_from_slice(&byte_rate.to_le_bytes());
        out.extend_from_slice(&(channels * 2).to_le_bytes()); // block align
        out.extend_from_slice(&16u16.to_le_bytes()); // bits

        out.extend_from_slice(b"data");
        out.extend_from_slice(&(data_len as u32).to_le_bytes());
        for s in samples {
            out.extend_from_slice(&s.to_le_bytes());
        }
        out
    }

    #[test]
    fn decode_mono() {
        let bytes = wav_bytes(1, 16000, &[0, 100, -100, i16::MAX]);
        let pcm = decode(&bytes).unwrap();
        assert_eq!(pcm.sample_rate, 16000);
        assert_eq!(pcm.len(), 4);
        assert_eq!(
            pcm.data,
            [0i16, 100, -100, i16::MAX]
                .iter()
                .flat_map(|s| s.to_le_bytes())
                .collect::<Vec<u8>>()
        );
    }

    #[test]
    fn decode_stereo_downmixes() {
        // Frames (100, 200) and (-100, 100) average to 150 and 0.
        let bytes = wav_bytes(2, 44100, &[100, 200, -100, 100]);
        let pcm = decode(&bytes).unwrap();
        assert_eq!(pcm.sample_rate, 44100);
        assert_eq!(pcm.len(), 2);
        let s0 = i16::from_le_bytes([pcm.data[0], pcm.data[1]]);
        let s1 = i16::from_le_bytes([pcm.data[2], pcm.data[3]]);
        assert_eq!((s0, s1), (150, 0));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode(b"").is_err());
        assert!(decode(b"RIFF").is_err());
        assert!(decode(b"not audio at all, just words").is_err());
    }

    #[test]
    fn decode_rejects_float_format() {
        let mut bytes = wav_bytes(1, 16000, &[1, 2, 3]);
        bytes[20] = 3; // IEEE float format tag
        let err = decode(&bytes).unwrap_err();
        assert!(err.to_string().contains("format"), "got {err}");
    }

    #[test]
    fn decode_rejects_wrong_bit_depth() {
        let mut bytes = wav_bytes(1, 16000, &[1, 2, 3]);
        bytes[34] = 8;
        bytes[35] = 0;
        let err = decode(&bytes).unwrap_err();
        assert!(err.to_string().contains("bit depth"), "got {err}");
    }

    #[test]
    fn decode_rejects_truncated_data() {
        let mut bytes = wav_bytes(1, 16000, &[1, 2, 3, 4]);
        bytes.truncate(bytes.len() - 3);
        assert!(decode(&bytes).is_err());
    }

    #[test]
    fn decode_rejects_empty_data() {
        let bytes = wav_bytes(1, 16000, &[]);
        let err = decode(&bytes).unwrap_err();
        assert!(err.to_string().contains("empty"), "got {err}");
    }

    #[test]
    fn decode_skips_unknown_chunks() {
        // LIST chunk between fmt and data must be ignored.
        let tail = wav_bytes(1, 8000, &[7, 8]);
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&tail[..36]); // RIFF header + fmt
        bytes.extend_from_slice(b"LIST");
        bytes.extend_from_slice(&4u32.to_le_bytes());
        bytes.extend_from_slice(b"INFO");
        bytes.extend_from_slice(&tail[36..]); // data chunk
        let pcm = decode(&bytes).unwrap();
        assert_eq!(pcm.len(), 2);
    }
}
