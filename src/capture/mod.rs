// Capture module - signal sources feeding the analyzer
//
// A SignalSource fills the analyzer's two byte arrays once per tick. Real
// capture devices live outside this crate; the sources here decode WAV
// files (WavFileSource) or synthesize test tones (ToneSource). Both turn
// PCM into byte frames through the same sliding-window ByteSpectrum.

pub mod tone;
pub mod wav;

pub use tone::{BurstPattern, ToneSource};
pub use wav::WavFileSource;

use std::collections::VecDeque;

use crate::analysis::{ByteFrame, ByteSpectrum};
use crate::config::AnalysisConfig;

/// Per-tick producer of analyzer input frames
///
/// Initialization failure is reported as `false`; the cause is logged by
/// the source. Retrying is left to the caller.
pub trait SignalSource: Send {
    /// Prepare the source; must be called before `read_frame`
    fn initialize(&mut self) -> bool;

    /// Length of the frames this source produces
    fn bin_count(&self) -> usize;

    /// Sample rate of the PCM behind the frames, valid after `initialize`
    fn sample_rate(&self) -> u32;

    /// Fill both buffers with the next tick's frame
    ///
    /// # Returns
    /// `false` once the source is exhausted or was never initialized
    fn read_frame(&mut self, frequency: &mut [u8], time_domain: &mut [u8]) -> bool;
}

/// Sliding PCM window shared by the PCM-backed sources
///
/// Each tick pushes one hop of new samples; the window always holds the
/// most recent `fft_size` samples, zero-filled until enough have arrived.
pub(crate) struct PcmWindow {
    spectrum: ByteSpectrum,
    samples: VecDeque<f32>,
    scratch: Vec<f32>,
}

impl PcmWindow {
    pub(crate) fn new(config: &AnalysisConfig) -> Self {
        let spectrum = ByteSpectrum::new(config);
        let fft_size = spectrum.fft_size();
        Self {
            spectrum,
            samples: std::iter::repeat(0.0).take(fft_size).collect(),
            scratch: Vec::with_capacity(fft_size),
        }
    }

    pub(crate) fn bin_count(&self) -> usize {
        self.spectrum.bin_count()
    }

    /// Append one hop of samples and compute the frame for the new window
    pub(crate) fn advance(&mut self, hop: &[f32]) -> ByteFrame {
        let fft_size = self.spectrum.fft_size();
        self.samples.extend(hop.iter().copied());
        while self.samples.len() > fft_size {
            self.samples.pop_front();
        }

        self.scratch.clear();
        self.scratch.extend(self.samples.iter().copied());
        self.spectrum.compute_frame(&self.scratch)
    }

    pub(crate) fn clear(&mut self) {
        for sample in self.samples.iter_mut() {
            *sample = 0.0;
        }
    }
}

/// Copy a computed frame into caller-provided buffers
///
/// Buffers longer than the frame are zero-filled (frequency) or midline-filled
/// (time domain) past the frame's end.
pub(crate) fn copy_frame(frame: &ByteFrame, frequency: &mut [u8], time_domain: &mut [u8]) {
    fill_from(frequency, &frame.frequency, 0);
    fill_from(time_domain, &frame.time_domain, 128);
}

fn fill_from(dest: &mut [u8], src: &[u8], pad: u8) {
    let shared = dest.len().min(src.len());
    dest[..shared].copy_from_slice(&src[..shared]);
    for byte in dest[shared..].iter_mut() {
        *byte = pad;
    }
}
