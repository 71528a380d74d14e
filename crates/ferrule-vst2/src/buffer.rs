//! Native sample buffers.
//!
//! A [`SampleBuffer`] owns one contiguous array per channel plus the array
//! of channel pointers the process routines expect (`S**`). Host audio is
//! moved in and out with explicit per-sample conversions, so host storage
//! can be any [`Sample`] type regardless of the precision the plugin runs
//! at.
//!
//! # Truncation
//!
//! Copies transfer `min(host, native)` channels and `min(host, native)`
//! frames per channel. Anything outside that window is left untouched on
//! both sides.

use std::sync::atomic::{AtomicBool, Ordering};

use ferrule_core::{NativeSample, Sample};

// Static flag so the truncation warning only logs once per session
static TRUNCATION_WARNING_LOGGED: AtomicBool = AtomicBool::new(false);

fn warn_truncated(direction: &str, host: (usize, usize), native: (usize, usize)) {
    if !TRUNCATION_WARNING_LOGGED.swap(true, Ordering::Relaxed) {
        log::warn!(
            "Truncated copy {} native buffer: host {}x{}, native {}x{}. \
             This warning will only appear once per session.",
            direction,
            host.0,
            host.1,
            native.0,
            native.1
        );
    }
}

/// Per-channel native sample storage.
pub struct SampleBuffer<S: NativeSample> {
    channels: Vec<Box<[S]>>,
    /// Channel pointers handed to the plugin. Rebuilt before every process
    /// call so they always derive from the current borrow of `channels`.
    pointers: Vec<*mut S>,
    frames: usize,
}

/// Single precision buffer for `processReplacing`.
pub type FloatBuffer = SampleBuffer<f32>;

/// Double precision buffer for `processDoubleReplacing`.
pub type DoubleBuffer = SampleBuffer<f64>;

// SAFETY: SampleBuffer exclusively owns its sample storage. The pointer
// array only ever points into that storage and is rebuilt on use.
unsafe impl<S: NativeSample> Send for SampleBuffer<S> {}

impl<S: NativeSample> SampleBuffer<S> {
    /// Allocate `channels` zeroed channels of `frames` samples each.
    pub fn new(channels: usize, frames: usize) -> Self {
        Self {
            channels: (0..channels).map(|_| vec![S::ZERO; frames].into_boxed_slice()).collect(),
            pointers: Vec::with_capacity(channels),
            frames,
        }
    }

    /// Number of channels.
    #[inline]
    pub fn channels(&self) -> usize {
        self.channels.len()
    }

    /// Number of frames per channel.
    #[inline]
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Samples of one channel.
    pub fn channel(&self, index: usize) -> Option<&[S]> {
        self.channels.get(index).map(|c| &c[..])
    }

    /// Mutable samples of one channel.
    pub fn channel_mut(&mut self, index: usize) -> Option<&mut [S]> {
        self.channels.get_mut(index).map(|c| &mut c[..])
    }

    /// Set every sample to zero.
    pub fn clear(&mut self) {
        for channel in &mut self.channels {
            channel.fill(S::ZERO);
        }
    }

    /// Copy host channels into the buffer, converting each sample.
    ///
    /// Returns the number of frames copied per channel.
    pub fn copy_from<H: Sample, C: AsRef<[H]>>(&mut self, host: &[C]) -> usize {
        let host_frames = host.first().map_or(0, |c| c.as_ref().len());
        let frames = self.frames.min(host_frames);
        if host.len() != self.channels() || host_frames != self.frames {
            warn_truncated("into", (host.len(), host_frames), (self.channels(), self.frames));
        }

        for (native, source) in self.channels.iter_mut().zip(host) {
            let source = source.as_ref();
            let n = frames.min(source.len());
            for (dst, src) in native[..n].iter_mut().zip(&source[..n]) {
                *dst = S::from_sample(*src);
            }
        }
        frames
    }

    /// Copy the buffer into host channels, converting each sample.
    ///
    /// Returns the number of frames copied per channel.
    pub fn copy_into<H: Sample, C: AsMut<[H]>>(&self, host: &mut [C]) -> usize {
        let host_channels = host.len();
        let host_frames = host.first_mut().map_or(0, |c| c.as_mut().len());
        let frames = self.frames.min(host_frames);
        if host_channels != self.channels() || host_frames != self.frames {
            warn_truncated("out of", (host_channels, host_frames), (self.channels(), self.frames));
        }

        for (native, target) in self.channels.iter().zip(host.iter_mut()) {
            let target = target.as_mut();
            let n = frames.min(target.len());
            for (dst, src) in target[..n].iter_mut().zip(&native[..n]) {
                *dst = H::from_sample(*src);
            }
        }
        frames
    }

    /// Copy interleaved host audio with `host_channels` channels into the
    /// buffer. Returns the number of frames copied.
    pub fn copy_from_interleaved<H: Sample>(&mut self, host: &[H], host_channels: usize) -> usize {
        if host_channels == 0 {
            return 0;
        }
        let frames = self.frames.min(host.len() / host_channels);
        let channels = self.channels().min(host_channels);
        for (ch, native) in self.channels.iter_mut().take(channels).enumerate() {
            for (frame, dst) in native[..frames].iter_mut().enumerate() {
                *dst = S::from_sample(host[frame * host_channels + ch]);
            }
        }
        frames
    }

    /// Copy the buffer into interleaved host audio with `host_channels`
    /// channels. Returns the number of frames copied.
    pub fn copy_into_interleaved<H: Sample>(&self, host: &mut [H], host_channels: usize) -> usize {
        if host_channels == 0 {
            return 0;
        }
        let frames = self.frames.min(host.len() / host_channels);
        let channels = self.channels().min(host_channels);
        for (ch, native) in self.channels.iter().take(channels).enumerate() {
            for (frame, src) in native[..frames].iter().enumerate() {
                host[frame * host_channels + ch] = H::from_sample(*src);
            }
        }
        frames
    }

    /// Channel pointer array for the process routine.
    pub(crate) fn as_raw(&mut self) -> *mut *mut S {
        self.pointers.clear();
        self.pointers.extend(self.channels.iter_mut().map(|c| c.as_mut_ptr()));
        self.pointers.as_mut_ptr()
    }

    /// Free the storage.
    pub fn release(self) {
        log::trace!("Releasing {}x{} sample buffer", self.channels(), self.frames);
        drop(self);
    }
}

impl<S: NativeSample> std::fmt::Debug for SampleBuffer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampleBuffer")
            .field("channels", &self.channels())
            .field("frames", &self.frames)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zeroed() {
        let buffer = FloatBuffer::new(2, 64);
        assert_eq!(buffer.channels(), 2);
        assert_eq!(buffer.frames(), 64);
        assert!(buffer.channel(1).unwrap().iter().all(|&s| s == 0.0));
        assert!(buffer.channel(2).is_none());
    }

    #[test]
    fn test_round_trip_matching_shape() {
        let host: Vec<Vec<f64>> = vec![vec![0.1, -0.2, 0.3], vec![1.0, 0.5, -1.0]];
        let mut buffer = DoubleBuffer::new(2, 3);
        assert_eq!(buffer.copy_from(&host), 3);

        let mut out = vec![vec![0.0f64; 3]; 2];
        assert_eq!(buffer.copy_into(&mut out), 3);
        assert_eq!(out, host);
    }

    #[test]
    fn test_cross_precision_copy() {
        let host = vec![vec![0.25f64, 0.5, 0.75]];
        let mut buffer = FloatBuffer::new(1, 3);
        buffer.copy_from(&host);
        assert_eq!(buffer.channel(0).unwrap(), &[0.25f32, 0.5, 0.75]);
    }

    #[test]
    fn test_copy_from_truncates_and_leaves_rest() {
        let mut buffer = FloatBuffer::new(2, 4);
        buffer.channel_mut(1).unwrap().fill(9.0);
        buffer.channel_mut(0).unwrap()[3] = 7.0;

        // One host channel, three frames.
        let host = vec![vec![1.0f32, 2.0, 3.0]];
        assert_eq!(buffer.copy_from(&host), 3);

        assert_eq!(buffer.channel(0).unwrap(), &[1.0, 2.0, 3.0, 7.0]);
        assert_eq!(buffer.channel(1).unwrap(), &[9.0; 4]);
    }

    #[test]
    fn test_copy_into_truncates_and_leaves_rest() {
        let mut buffer = FloatBuffer::new(1, 2);
        buffer.channel_mut(0).unwrap().copy_from_slice(&[0.5, 0.25]);

        let mut host = vec![vec![-1.0f32; 4], vec![-1.0f32; 4]];
        assert_eq!(buffer.copy_into(&mut host), 2);

        assert_eq!(host[0], vec![0.5, 0.25, -1.0, -1.0]);
        assert_eq!(host[1], vec![-1.0; 4]);
    }

    #[test]
    fn test_interleaved_round_trip() {
        let interleaved = [1.0f32, -1.0, 2.0, -2.0, 3.0, -3.0];
        let mut buffer = DoubleBuffer::new(2, 3);
        assert_eq!(buffer.copy_from_interleaved(&interleaved, 2), 3);
        assert_eq!(buffer.channel(1).unwrap(), &[-1.0, -2.0, -3.0]);

        let mut out = [0.0f32; 6];
        assert_eq!(buffer.copy_into_interleaved(&mut out, 2), 3);
        assert_eq!(out, interleaved);
        assert_eq!(buffer.copy_into_interleaved(&mut out, 0), 0);
    }

    #[test]
    fn test_raw_pointers_follow_channels() {
        let mut buffer = FloatBuffer::new(3, 8);
        let raw = buffer.as_raw();
        let first = unsafe { *raw };
        assert_eq!(first as *const f32, buffer.channel(0).unwrap().as_ptr());
        buffer.release();
    }
}
