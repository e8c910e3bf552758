//! WAV output.

use hound::{SampleFormat, WavSpec, WavWriter};
use std::path::Path;

/// Write interleaved samples as 32-bit float WAV.
pub fn write_wav_f32(
    path: &Path,
    interleaved: &[f32],
    channels: u16,
    sample_rate: u32,
) -> hound::Result<()> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for &sample in interleaved {
        writer.write_sample(sample)?;
    }
    writer.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::WavReader;
    use tempfile::NamedTempFile;

    #[test]
    fn writes_float_stereo() {
        let samples: Vec<f32> = (0..200).map(|i| (i as f32 / 200.0) - 0.5).collect();
        let file = NamedTempFile::new().unwrap();

        write_wav_f32(file.path(), &samples, 2, 44100).unwrap();

        let reader = WavReader::open(file.path()).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 44100);
        assert_eq!(spec.bits_per_sample, 32);
        assert_eq!(spec.sample_format, SampleFormat::Float);

        let read: Vec<f32> = reader.into_samples::<f32>().map(Result::unwrap).collect();
        assert_eq!(read, samples);
    }
}
