//! Microphone capture seam
//!
//! The runtime opens the capture while the mic is on and closes it when the
//! mic goes off, the run ends, or the host pauses.

use rand::{Rng, SeedableRng};

use crate::consts::SAMPLE_RATE;
use rand_pcg::Pcg32;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("microphone permission denied")]
    PermissionDenied,
    #[error("microphone unavailable: {0}")]
    Unavailable(String),
}

/// A host microphone delivering mono i16 blocks at [`SAMPLE_RATE`]
pub trait AudioCapture {
    /// Acquire the device and start recording
    fn open(&mut self) -> Result<(), CaptureError>;

    /// Next captured block, if one is ready (must not block)
    fn read(&mut self) -> Option<Vec<i16>>;

    /// Stop recording and release the device
    fn close(&mut self);
}

/// Host without a usable microphone
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMicrophone;

impl AudioCapture for NoMicrophone {
    fn open(&mut self) -> Result<(), CaptureError> {
        Err(CaptureError::PermissionDenied)
    }

    fn read(&mut self) -> Option<Vec<i16>> {
        None
    }

    fn close(&mut self) {}
}

/// Deterministic noise source for headless runs
///
/// Each read yields one block of white noise whose peak amplitude follows
/// `loudness`, cycling through it one entry per block.
#[derive(Debug, Clone)]
pub struct SyntheticMic {
    rng: Pcg32,
    block_len: usize,
    loudness: Vec<i16>,
    cursor: usize,
    open: bool,
    /// Number of times the device was acquired
    pub opened: u32,
}

impl SyntheticMic {
    pub fn new(seed: u64, block_len: usize, loudness: Vec<i16>) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            block_len: block_len.max(1),
            loudness,
            cursor: 0,
            open: false,
            opened: 0,
        }
    }

    /// Mic whose blocks each hold `window_ms` of audio at [`SAMPLE_RATE`]
    pub fn with_window(seed: u64, window_ms: u64, loudness: Vec<i16>) -> Self {
        let block_len = SAMPLE_RATE as u64 * window_ms / 1_000;
        Self::new(seed, block_len as usize, loudness)
    }

    pub fn block_len(&self) -> usize {
        self.block_len
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}

impl AudioCapture for SyntheticMic {
    fn open(&mut self) -> Result<(), CaptureError> {
        if self.loudness.is_empty() {
            return Err(CaptureError::Unavailable("no loudness script".into()));
        }
        self.open = true;
        self.opened += 1;
        Ok(())
    }

    fn read(&mut self) -> Option<Vec<i16>> {
        if !self.open {
            return None;
        }
        let peak = self.loudness[self.cursor % self.loudness.len()].unsigned_abs() as i32;
        self.cursor += 1;
        let block = (0..self.block_len)
            .map(|_| {
                if peak == 0 {
                    0
                } else {
                    self.rng.random_range(-peak..=peak).clamp(i16::MIN as i32, i16::MAX as i32) as i16
                }
            })
            .collect();
        Some(block)
    }

    fn close(&mut self) {
        self.open = false;
    }
}
