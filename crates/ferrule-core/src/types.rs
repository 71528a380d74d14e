//! Small protocol enums shared by both call directions.

// =============================================================================
// Process Level
// =============================================================================

/// Answer to `HostOpcode::GetCurrentProcessLevel`: which thread the host is
/// calling from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum ProcessLevel {
    /// Not supported by the host.
    #[default]
    Unknown = 0,
    /// GUI thread.
    User = 1,
    /// Audio thread, where process is called.
    Realtime = 2,
    /// Sequencer thread (MIDI, timers).
    Prefetch = 3,
    /// Offline processing, on the user thread.
    Offline = 4,
}

impl ProcessLevel {
    pub fn from_raw(raw: isize) -> Option<Self> {
        Some(match raw {
            0 => Self::Unknown,
            1 => Self::User,
            2 => Self::Realtime,
            3 => Self::Prefetch,
            4 => Self::Offline,
            _ => return None,
        })
    }
}

// =============================================================================
// Host Language
// =============================================================================

/// Answer to `HostOpcode::GetLanguage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum HostLanguage {
    #[default]
    English = 1,
    German = 2,
    French = 3,
    Italian = 4,
    Spanish = 5,
    Japanese = 6,
}

// =============================================================================
// Plugin Category
// =============================================================================

/// Answer to `EffectOpcode::GetPlugCategory`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum PluginCategory {
    /// Not implemented by the plugin.
    #[default]
    Unknown = 0,
    Effect = 1,
    /// Instrument: synth, sampler.
    Synth = 2,
    /// Scope, tuner.
    Analysis = 3,
    /// Dynamics control.
    Mastering = 4,
    /// Panner.
    Spacializer = 5,
    /// Delay and reverb.
    RoomFx = 6,
    SurroundFx = 7,
    /// Denoiser.
    Restoration = 8,
    OfflineProcess = 9,
    /// Container for other plugins.
    Shell = 10,
    /// Tone generator.
    Generator = 11,
}

impl PluginCategory {
    /// Decode a dispatcher return value. Unknown codes map to
    /// [`PluginCategory::Unknown`].
    pub fn from_raw(raw: isize) -> Self {
        match raw {
            1 => Self::Effect,
            2 => Self::Synth,
            3 => Self::Analysis,
            4 => Self::Mastering,
            5 => Self::Spacializer,
            6 => Self::RoomFx,
            7 => Self::SurroundFx,
            8 => Self::Restoration,
            9 => Self::OfflineProcess,
            10 => Self::Shell,
            11 => Self::Generator,
            _ => Self::Unknown,
        }
    }
}

// =============================================================================
// Can Do
// =============================================================================

/// Tri-state answer to a `CanDo` query in either direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CanDo {
    Yes,
    No,
    /// The protocol's "don't know" (0), also used for any unexpected value.
    #[default]
    Maybe,
}

impl CanDo {
    /// Decode a dispatcher return value.
    pub fn from_raw(raw: isize) -> Self {
        match raw {
            1 => Self::Yes,
            -1 => Self::No,
            _ => Self::Maybe,
        }
    }

    /// Encode as a callback return value.
    pub fn to_raw(self) -> isize {
        match self {
            Self::Yes => 1,
            Self::No => -1,
            Self::Maybe => 0,
        }
    }
}

// =============================================================================
// Process Precision
// =============================================================================

/// Value for `EffectOpcode::SetProcessPrecision`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(isize)]
pub enum ProcessPrecision {
    Single = 0,
    Double = 1,
}

/// Index for `EffectOpcode::GetChunk` / `SetChunk`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ChunkKind {
    Bank = 0,
    Program = 1,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_do_round_trip_values() {
        assert_eq!(CanDo::from_raw(1), CanDo::Yes);
        assert_eq!(CanDo::from_raw(-1), CanDo::No);
        assert_eq!(CanDo::from_raw(0), CanDo::Maybe);
        assert_eq!(CanDo::from_raw(42), CanDo::Maybe);
        assert_eq!(CanDo::No.to_raw(), -1);
    }

    #[test]
    fn test_category_codes() {
        assert_eq!(PluginCategory::from_raw(2), PluginCategory::Synth);
        assert_eq!(PluginCategory::from_raw(11), PluginCategory::Generator);
        assert_eq!(PluginCategory::from_raw(99), PluginCategory::Unknown);
        assert_eq!(PluginCategory::Shell as i32, 10);
    }

    #[test]
    fn test_process_level_and_language_codes() {
        assert_eq!(ProcessLevel::from_raw(2), Some(ProcessLevel::Realtime));
        assert_eq!(ProcessLevel::from_raw(5), None);
        assert_eq!(HostLanguage::English as i32, 1);
        assert_eq!(HostLanguage::Japanese as i32, 6);
    }
}
