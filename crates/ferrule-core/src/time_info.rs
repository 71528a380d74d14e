//! Transport and timing information exchanged through `HostOpcode::GetTime`.
//!
//! The plugin asks for a [`TimeInfo`] pointer at the start of a block. The
//! structure is owned by the host and must stay valid until the next
//! request; see the host adapter in `ferrule-vst2` for how that is kept.

// =============================================================================
// TimeInfoFlags
// =============================================================================

/// Validity and transport bits stored in [`TimeInfo::flags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeInfoFlags(pub i32);

impl TimeInfoFlags {
    /// Play, cycle or record state changed since the last block.
    pub const TRANSPORT_CHANGED: Self = Self(1);
    /// The sequencer is playing.
    pub const TRANSPORT_PLAYING: Self = Self(1 << 1);
    /// Cycle mode is active.
    pub const TRANSPORT_CYCLE_ACTIVE: Self = Self(1 << 2);
    /// Recording is active.
    pub const TRANSPORT_RECORDING: Self = Self(1 << 3);
    /// Automation write mode is active.
    pub const AUTOMATION_WRITING: Self = Self(1 << 6);
    /// Automation read mode is active.
    pub const AUTOMATION_READING: Self = Self(1 << 7);
    /// `nano_seconds` is valid.
    pub const NANOS_VALID: Self = Self(1 << 8);
    /// `ppq_pos` is valid.
    pub const PPQ_POS_VALID: Self = Self(1 << 9);
    /// `tempo` is valid.
    pub const TEMPO_VALID: Self = Self(1 << 10);
    /// `bar_start_pos` is valid.
    pub const BARS_VALID: Self = Self(1 << 11);
    /// `cycle_start_pos` and `cycle_end_pos` are valid.
    pub const CYCLE_POS_VALID: Self = Self(1 << 12);
    /// Time signature fields are valid.
    pub const TIME_SIG_VALID: Self = Self(1 << 13);
    /// `smpte_offset` and `smpte_frame_rate` are valid.
    pub const SMPTE_VALID: Self = Self(1 << 14);
    /// `samples_to_next_clock` is valid.
    pub const CLOCK_VALID: Self = Self(1 << 15);

    #[inline]
    pub const fn bits(self) -> i32 {
        self.0
    }

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl std::ops::BitOr for TimeInfoFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl std::ops::BitOrAssign for TimeInfoFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

// =============================================================================
// SmpteFrameRate
// =============================================================================

/// SMPTE frame rate codes used in [`TimeInfo::smpte_frame_rate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum SmpteFrameRate {
    #[default]
    Fps24 = 0,
    Fps25 = 1,
    Fps2997 = 2,
    Fps30 = 3,
    Fps2997Drop = 4,
    Fps30Drop = 5,
    Film16mm = 6,
    Film35mm = 7,
    /// HDTV 23.976 fps.
    Fps239 = 10,
    /// HDTV 24.976 fps.
    Fps249 = 11,
    /// HDTV 59.94 fps.
    Fps599 = 12,
    /// HDTV 60 fps.
    Fps60 = 13,
}

impl SmpteFrameRate {
    /// Decode a raw frame rate code. Codes 8 and 9 are unassigned.
    pub fn from_raw(raw: i32) -> Option<Self> {
        Some(match raw {
            0 => Self::Fps24,
            1 => Self::Fps25,
            2 => Self::Fps2997,
            3 => Self::Fps30,
            4 => Self::Fps2997Drop,
            5 => Self::Fps30Drop,
            6 => Self::Film16mm,
            7 => Self::Film35mm,
            10 => Self::Fps239,
            11 => Self::Fps249,
            12 => Self::Fps599,
            13 => Self::Fps60,
            _ => return None,
        })
    }

    /// Frames per second. Film formats report their projection rate.
    pub fn fps(self) -> f64 {
        match self {
            Self::Fps24 | Self::Film16mm | Self::Film35mm => 24.0,
            Self::Fps25 => 25.0,
            Self::Fps2997 | Self::Fps2997Drop => 30000.0 / 1001.0,
            Self::Fps30 | Self::Fps30Drop => 30.0,
            Self::Fps239 => 24000.0 / 1001.0,
            Self::Fps249 => 24.976,
            Self::Fps599 => 60000.0 / 1001.0,
            Self::Fps60 => 60.0,
        }
    }
}

// =============================================================================
// TimeInfo
// =============================================================================

/// Time position at the start of the current block (88 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimeInfo {
    /// Position in samples.
    pub sample_pos: f64,
    /// Sample rate in Hz.
    pub sample_rate: f64,
    /// System time in nanoseconds.
    pub nano_seconds: f64,
    /// Musical position in quarter notes.
    pub ppq_pos: f64,
    /// Tempo in BPM.
    pub tempo: f64,
    /// Last bar start in quarter notes.
    pub bar_start_pos: f64,
    /// Left locator in quarter notes.
    pub cycle_start_pos: f64,
    /// Right locator in quarter notes.
    pub cycle_end_pos: f64,
    pub time_sig_numerator: i32,
    pub time_sig_denominator: i32,
    /// Offset in SMPTE subframes (1/80 frame).
    pub smpte_offset: i32,
    /// Raw [`SmpteFrameRate`] code.
    pub smpte_frame_rate: i32,
    /// Samples to the next 24 PPQ MIDI clock. May be negative.
    pub samples_to_next_clock: i32,
    /// Raw [`TimeInfoFlags`].
    pub flags: i32,
}

impl TimeInfo {
    /// Time info carrying only the always-valid sample position and rate.
    pub fn new(sample_pos: f64, sample_rate: f64) -> Self {
        Self {
            sample_pos,
            sample_rate,
            ..Self::default()
        }
    }

    /// Set the tempo and mark it valid.
    pub fn with_tempo(mut self, bpm: f64) -> Self {
        self.tempo = bpm;
        self.insert_flags(TimeInfoFlags::TEMPO_VALID);
        self
    }

    /// Set the musical position and mark it valid.
    pub fn with_ppq_pos(mut self, ppq_pos: f64) -> Self {
        self.ppq_pos = ppq_pos;
        self.insert_flags(TimeInfoFlags::PPQ_POS_VALID);
        self
    }

    /// Set the time signature and mark it valid.
    pub fn with_time_signature(mut self, numerator: i32, denominator: i32) -> Self {
        self.time_sig_numerator = numerator;
        self.time_sig_denominator = denominator;
        self.insert_flags(TimeInfoFlags::TIME_SIG_VALID);
        self
    }

    /// Set the playing bit.
    pub fn with_playing(mut self, playing: bool) -> Self {
        if playing {
            self.insert_flags(TimeInfoFlags::TRANSPORT_PLAYING);
        } else {
            self.flags &= !TimeInfoFlags::TRANSPORT_PLAYING.bits();
        }
        self
    }

    /// Typed view of [`TimeInfo::flags`].
    #[inline]
    pub fn time_flags(&self) -> TimeInfoFlags {
        TimeInfoFlags(self.flags)
    }

    fn insert_flags(&mut self, flags: TimeInfoFlags) {
        self.flags |= flags.bits();
    }

    /// Whether the transport is playing.
    pub fn is_playing(&self) -> bool {
        self.time_flags().contains(TimeInfoFlags::TRANSPORT_PLAYING)
    }

    /// Tempo, if valid.
    pub fn tempo(&self) -> Option<f64> {
        self.time_flags()
            .contains(TimeInfoFlags::TEMPO_VALID)
            .then_some(self.tempo)
    }

    /// Time signature as (numerator, denominator), if valid.
    pub fn time_signature(&self) -> Option<(i32, i32)> {
        self.time_flags()
            .contains(TimeInfoFlags::TIME_SIG_VALID)
            .then_some((self.time_sig_numerator, self.time_sig_denominator))
    }

    /// SMPTE frame rate, if valid and a known code.
    pub fn frame_rate(&self) -> Option<SmpteFrameRate> {
        if self.time_flags().contains(TimeInfoFlags::SMPTE_VALID) {
            SmpteFrameRate::from_raw(self.smpte_frame_rate)
        } else {
            None
        }
    }
}
