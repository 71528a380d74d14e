//! Event record layouts passed through `ProcessEvents` in both directions.
//!
//! A container ([`Events`]) is a header followed by an inline array of
//! pointers to event records. Every record starts with the common
//! [`EventHeader`] prefix; `event_type` selects the concrete layout.

use std::ffi::c_void;

/// `event_type` of a [`MidiEvent`].
pub const EVENT_TYPE_MIDI: i32 = 1;

/// `event_type` of a [`SysExEvent`].
pub const EVENT_TYPE_SYSEX: i32 = 6;

/// Common prefix of every event record (32 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct EventHeader {
    pub event_type: i32,
    /// Size of the full record in bytes.
    pub byte_size: i32,
    /// Sample offset into the current block.
    pub delta_frames: i32,
    pub flags: i32,
    pub data: [u8; 16],
}

/// Bits stored in [`MidiEvent::flags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MidiEventFlags(pub i32);

impl MidiEventFlags {
    /// Played live rather than coming from a sequencer track.
    pub const REALTIME: Self = Self(1);

    #[inline]
    pub const fn bits(self) -> i32 {
        self.0
    }

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

/// MIDI short message record (32 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MidiEvent {
    /// Always [`EVENT_TYPE_MIDI`].
    pub event_type: i32,
    pub byte_size: i32,
    pub delta_frames: i32,
    /// Raw [`MidiEventFlags`].
    pub flags: i32,
    /// Note length in samples, 0 if unknown.
    pub note_length: i32,
    /// Offset into the note in samples, 0 if unknown.
    pub note_offset: i32,
    /// One to three MIDI bytes; the fourth is reserved.
    pub midi_data: [u8; 4],
    /// Cents, -64..=63.
    pub detune: i8,
    pub note_off_velocity: u8,
    pub reserved1: u8,
    pub reserved2: u8,
}

/// System exclusive record.
///
/// `sysex_dump` points at memory owned by whoever built the container.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct SysExEvent {
    /// Always [`EVENT_TYPE_SYSEX`].
    pub event_type: i32,
    pub byte_size: i32,
    pub delta_frames: i32,
    pub flags: i32,
    pub dump_bytes: i32,
    pub reserved1: isize,
    pub sysex_dump: *mut u8,
    pub reserved2: isize,
}

/// Events container header.
///
/// The `events` array is declared with two slots but is really a flexible
/// array member of `num_events` entries; containers are allocated with room
/// for the actual count.
#[repr(C)]
#[derive(Debug)]
pub struct Events {
    pub num_events: i32,
    pub reserved: isize,
    pub events: [*mut EventHeader; 2],
}

impl Events {
    /// Byte offset of the pointer array.
    pub const EVENTS_OFFSET: usize = std::mem::offset_of!(Events, events);

    /// Pointer to the `index`-th slot of the flexible pointer array.
    ///
    /// # Safety
    ///
    /// `events` must point to a container allocated with at least
    /// `index + 1` slots.
    pub unsafe fn slot(events: *const Events, index: usize) -> *const *mut EventHeader {
        events
            .cast::<u8>()
            .add(Self::EVENTS_OFFSET)
            .cast::<*mut EventHeader>()
            .add(index)
    }

    /// Erase the type for a dispatch `ptr` argument.
    pub fn as_void(events: *mut Events) -> *mut c_void {
        events.cast()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};

    #[test]
    fn test_midi_event_layout() {
        assert_eq!(size_of::<MidiEvent>(), 32);
        assert_eq!(size_of::<EventHeader>(), 32);
        assert_eq!(offset_of!(MidiEvent, midi_data), 24);
        assert_eq!(offset_of!(MidiEvent, detune), 28);
        assert_eq!(offset_of!(MidiEvent, reserved2), 31);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_sysex_and_container_layout_64() {
        assert_eq!(offset_of!(SysExEvent, dump_bytes), 16);
        assert_eq!(offset_of!(SysExEvent, sysex_dump), 32);
        assert_eq!(size_of::<SysExEvent>(), 48);
        assert_eq!(Events::EVENTS_OFFSET, 16);
    }

    #[test]
    fn test_event_type_codes() {
        assert_eq!(EVENT_TYPE_MIDI, 1);
        assert_eq!(EVENT_TYPE_SYSEX, 6);
        assert!(MidiEventFlags(1).contains(MidiEventFlags::REALTIME));
    }
}
