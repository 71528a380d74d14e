//! Speaker arrangement structures (904 bytes on every platform).

use crate::name::Ascii64;

/// Number of speaker slots in a [`SpeakerArrangement`].
pub const MAX_SPEAKERS: usize = 8;

/// Arrangement type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ArrangementType {
    UserDefined = -2,
    Empty = -1,
    /// M
    Mono = 0,
    /// L R
    Stereo = 1,
    /// Ls Rs
    StereoSurround = 2,
    /// Lc Rc
    StereoCenter = 3,
    /// Sl Sr
    StereoSide = 4,
    /// C Lfe
    StereoCLfe = 5,
    /// L R C
    Cine30 = 6,
    /// L R S
    Music30 = 7,
    /// L R C Lfe
    Cine31 = 8,
    /// L R Lfe S
    Music31 = 9,
    /// L R C S
    Cine40 = 10,
    /// L R Ls Rs
    Music40 = 11,
    /// L R C Lfe S
    Cine41 = 12,
    /// L R Lfe Ls Rs
    Music41 = 13,
    /// L R C Ls Rs
    Surround50 = 14,
    /// L R C Lfe Ls Rs
    Surround51 = 15,
    /// L R C Ls Rs Cs
    Cine60 = 16,
    /// L R Ls Rs Sl Sr
    Music60 = 17,
    /// L R C Lfe Ls Rs Cs
    Cine61 = 18,
    /// L R Lfe Ls Rs Sl Sr
    Music61 = 19,
    /// L R C Ls Rs Lc Rc
    Cine70 = 20,
    /// L R C Ls Rs Sl Sr
    Music70 = 21,
    /// L R C Lfe Ls Rs Lc Rc
    Cine71 = 22,
    /// L R C Lfe Ls Rs Sl Sr
    Music71 = 23,
    /// L R C Ls Rs Lc Rc Cs
    Cine80 = 24,
    /// L R C Ls Rs Cs Sl Sr
    Music80 = 25,
    /// L R C Lfe Ls Rs Lc Rc Cs
    Cine81 = 26,
    /// L R C Lfe Ls Rs Cs Sl Sr
    Music81 = 27,
    /// L R C Lfe Ls Rs Tfl Tfc Tfr Trl Trr Lfe2
    Surround102 = 28,
}

impl ArrangementType {
    /// Decode a raw arrangement code.
    pub fn from_raw(raw: i32) -> Option<Self> {
        use ArrangementType::*;
        const TABLE: [ArrangementType; 31] = [
            UserDefined, Empty, Mono, Stereo, StereoSurround, StereoCenter,
            StereoSide, StereoCLfe, Cine30, Music30, Cine31, Music31, Cine40,
            Music40, Cine41, Music41, Surround50, Surround51, Cine60, Music60,
            Cine61, Music61, Cine70, Music70, Cine71, Music71, Cine80, Music80,
            Cine81, Music81, Surround102,
        ];
        let slot = usize::try_from(raw.checked_add(2)?).ok()?;
        TABLE.get(slot).copied()
    }

    /// Default arrangement for a plain channel count.
    ///
    /// Counts without a standard layout (and counts above eight) map to
    /// [`ArrangementType::UserDefined`].
    pub fn for_channels(channels: usize) -> Self {
        match channels {
            0 => Self::Empty,
            1 => Self::Mono,
            2 => Self::Stereo,
            3 => Self::Music30,
            4 => Self::Music40,
            5 => Self::Surround50,
            6 => Self::Music60,
            7 => Self::Music70,
            8 => Self::Music80,
            _ => Self::UserDefined,
        }
    }
}

/// Speaker type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum SpeakerType {
    Mono = 0,
    Left = 1,
    Right = 2,
    Center = 3,
    Lfe = 4,
    LeftSurround = 5,
    RightSurround = 6,
    LeftOfCenter = 7,
    RightOfCenter = 8,
    /// Surround, also used for center surround.
    Surround = 9,
    SideLeft = 10,
    SideRight = 11,
    TopMiddle = 12,
    TopFrontLeft = 13,
    TopFrontCenter = 14,
    TopFrontRight = 15,
    TopRearLeft = 16,
    TopRearCenter = 17,
    TopRearRight = 18,
    Lfe2 = 19,
    Undefined = 0x7fff_ffff,
}

/// One speaker slot (112 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeakerProperties {
    /// Radians, -PI..PI.
    pub azimuth: f32,
    /// Radians, -PI/2..PI/2.
    pub elevation: f32,
    /// Meters.
    pub radius: f32,
    pub reserved: f32,
    pub name: Ascii64,
    /// Raw [`SpeakerType`] code.
    pub speaker_type: i32,
    pub future: [u8; 28],
}

impl Default for SpeakerProperties {
    fn default() -> Self {
        Self {
            azimuth: 0.0,
            elevation: 0.0,
            radius: 0.0,
            reserved: 0.0,
            name: Ascii64::zeroed(),
            speaker_type: SpeakerType::Undefined as i32,
            future: [0; 28],
        }
    }
}

/// Channel layout of one side of the plugin (904 bytes).
///
/// Only the first [`MAX_SPEAKERS`] speakers are stored inline, which is the
/// layout every 2.4 plugin reads.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeakerArrangement {
    /// Raw [`ArrangementType`] code.
    pub arrangement_type: i32,
    pub num_channels: i32,
    pub speakers: [SpeakerProperties; MAX_SPEAKERS],
}

impl Default for SpeakerArrangement {
    fn default() -> Self {
        Self {
            arrangement_type: ArrangementType::Empty as i32,
            num_channels: 0,
            speakers: [SpeakerProperties::default(); MAX_SPEAKERS],
        }
    }
}

impl SpeakerArrangement {
    /// Arrangement for `channels` channels with every populated speaker
    /// marked as [`SpeakerType::Undefined`].
    ///
    /// Channel counts above [`MAX_SPEAKERS`] produce a user-defined
    /// arrangement whose `num_channels` is clamped to the inline slots, so
    /// a plugin walking `speakers[..num_channels]` stays inside the struct.
    pub fn with_channels(channels: usize) -> Self {
        let mut arrangement = Self {
            arrangement_type: ArrangementType::for_channels(channels) as i32,
            num_channels: channels.min(MAX_SPEAKERS) as i32,
            ..Self::default()
        };
        for speaker in arrangement.speakers.iter_mut().take(channels) {
            speaker.speaker_type = SpeakerType::Undefined as i32;
        }
        arrangement
    }

    /// Typed arrangement code, if known.
    pub fn kind(&self) -> Option<ArrangementType> {
        ArrangementType::from_raw(self.arrangement_type)
    }

    /// Channel count, clamped at zero.
    pub fn channels(&self) -> usize {
        usize::try_from(self.num_channels).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};

    #[test]
    fn test_layout() {
        assert_eq!(size_of::<SpeakerProperties>(), 112);
        assert_eq!(offset_of!(SpeakerProperties, name), 16);
        assert_eq!(offset_of!(SpeakerProperties, speaker_type), 80);
        assert_eq!(size_of::<SpeakerArrangement>(), 904);
        assert_eq!(offset_of!(SpeakerArrangement, speakers), 8);
    }

    #[test]
    fn test_arrangement_codes() {
        assert_eq!(ArrangementType::UserDefined as i32, -2);
        assert_eq!(ArrangementType::Music30 as i32, 7);
        assert_eq!(ArrangementType::Music80 as i32, 25);
        assert_eq!(ArrangementType::Surround102 as i32, 28);
        assert_eq!(ArrangementType::from_raw(-2), Some(ArrangementType::UserDefined));
        assert_eq!(ArrangementType::from_raw(15), Some(ArrangementType::Surround51));
        assert_eq!(ArrangementType::from_raw(29), None);
        assert_eq!(ArrangementType::from_raw(-3), None);
    }

    #[test]
    fn test_with_channels() {
        let stereo = SpeakerArrangement::with_channels(2);
        assert_eq!(stereo.kind(), Some(ArrangementType::Stereo));
        assert_eq!(stereo.channels(), 2);
        assert_eq!(stereo.speakers[0].speaker_type, SpeakerType::Undefined as i32);

        let empty = SpeakerArrangement::with_channels(0);
        assert_eq!(empty.kind(), Some(ArrangementType::Empty));

        let wide = SpeakerArrangement::with_channels(12);
        assert_eq!(wide.kind(), Some(ArrangementType::UserDefined));
    }

    #[test]
    fn test_wide_arrangement_fits_inline_slots() {
        for channels in [MAX_SPEAKERS + 1, 12, 64, usize::MAX] {
            let wide = SpeakerArrangement::with_channels(channels);
            assert_eq!(wide.num_channels, MAX_SPEAKERS as i32);
            assert_eq!(wide.channels(), wide.speakers.len());
            assert!(wide
                .speakers
                .iter()
                .all(|s| s.speaker_type == SpeakerType::Undefined as i32));
        }
    }

    #[test]
    fn test_for_channels_table() {
        let expected = [-1, 0, 1, 7, 11, 14, 17, 21, 25];
        for (channels, code) in expected.iter().enumerate() {
            assert_eq!(ArrangementType::for_channels(channels) as i32, *code);
        }
    }
}
