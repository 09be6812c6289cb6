//! WAV export of offline renders

use std::io::{Seek, Write};
use std::path::Path;

use crate::error::AudioResult;

fn wav_spec(sample_rate: u32) -> hound::WavSpec {
    hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    }
}

/// Write mono float samples to a 32-bit float WAV file
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> AudioResult<()> {
    let mut writer = hound::WavWriter::create(path, wav_spec(sample_rate))?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    log::info!(
        "Wrote {} samples ({:.2}s) to {}",
        samples.len(),
        samples.len() as f64 / sample_rate.max(1) as f64,
        path.display()
    );
    Ok(())
}

/// Same as [`write_wav`] into any seekable writer
pub fn write_wav_to<W: Write + Seek>(
    writer: W,
    samples: &[f32],
    sample_rate: u32,
) -> AudioResult<()> {
    let mut writer = hound::WavWriter::new(writer, wav_spec(sample_rate))?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_wav_in_memory() {
        let samples: Vec<f32> = (0..100).map(|i| (i as f32 / 100.0) - 0.5).collect();
        let mut cursor = Cursor::new(Vec::new());
        write_wav_to(&mut cursor, &samples, 8000).unwrap();

        cursor.set_position(0);
        let mut reader = hound::WavReader::new(cursor).unwrap();
        assert_eq!(reader.spec().sample_rate, 8000);
        assert_eq!(reader.spec().channels, 1);
        let read: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(read, samples);
    }
}
