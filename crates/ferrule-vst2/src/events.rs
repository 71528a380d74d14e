//! Events containers.
//!
//! [`EventsBuffer`] owns a natively-laid-out container for one
//! `ProcessEvents` dispatch: the header, the pointer array, every record
//! and every SysEx payload. Dropping it (or calling
//! [`EventsBuffer::release`]) frees all of them exactly once.
//!
//! [`read_events`] decodes a container owned by the other side, as received
//! through `HostOpcode::ProcessEvents`.

use std::ffi::c_void;
use std::mem::size_of;

use ferrule_core::{
    EventHeader, Events, MidiEvent, MidiEventFlags, SysExEvent, EVENT_TYPE_MIDI, EVENT_TYPE_SYSEX,
};

// =============================================================================
// Host-side Events
// =============================================================================

/// A MIDI short message with its timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MidiMessage {
    /// Sample offset into the block.
    pub delta_frames: i32,
    /// Played live rather than from a sequencer track.
    pub realtime: bool,
    /// Note length in samples, 0 if unknown.
    pub note_length: i32,
    /// Offset into the note in samples, 0 if unknown.
    pub note_offset: i32,
    /// Status byte and up to two data bytes.
    pub data: [u8; 3],
    /// Cents, -64..=63.
    pub detune: i8,
    pub note_off_velocity: u8,
}

/// A system exclusive dump with its timing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SysExMessage {
    pub delta_frames: i32,
    /// Complete dump, `F0` and `F7` included.
    pub data: Vec<u8>,
}

/// One event, as the host sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Midi(MidiMessage),
    SysEx(SysExMessage),
}

impl Event {
    /// MIDI event with default flags.
    pub fn midi(delta_frames: i32, data: [u8; 3]) -> Self {
        Self::Midi(MidiMessage {
            delta_frames,
            data,
            ..MidiMessage::default()
        })
    }

    /// SysEx event.
    pub fn sysex(delta_frames: i32, data: impl Into<Vec<u8>>) -> Self {
        Self::SysEx(SysExMessage {
            delta_frames,
            data: data.into(),
        })
    }

    /// Sample offset into the block.
    pub fn delta_frames(&self) -> i32 {
        match self {
            Self::Midi(midi) => midi.delta_frames,
            Self::SysEx(sysex) => sysex.delta_frames,
        }
    }
}

impl From<&MidiMessage> for MidiEvent {
    fn from(message: &MidiMessage) -> Self {
        let flags = if message.realtime {
            MidiEventFlags::REALTIME.bits()
        } else {
            0
        };
        Self {
            event_type: EVENT_TYPE_MIDI,
            byte_size: size_of::<MidiEvent>() as i32,
            delta_frames: message.delta_frames,
            flags,
            note_length: message.note_length,
            note_offset: message.note_offset,
            midi_data: [message.data[0], message.data[1], message.data[2], 0],
            detune: message.detune,
            note_off_velocity: message.note_off_velocity,
            reserved1: 0,
            reserved2: 0,
        }
    }
}

impl From<&MidiEvent> for MidiMessage {
    fn from(event: &MidiEvent) -> Self {
        Self {
            delta_frames: event.delta_frames,
            realtime: MidiEventFlags(event.flags).contains(MidiEventFlags::REALTIME),
            note_length: event.note_length,
            note_offset: event.note_offset,
            data: [event.midi_data[0], event.midi_data[1], event.midi_data[2]],
            detune: event.detune,
            note_off_velocity: event.note_off_velocity,
        }
    }
}

// =============================================================================
// Native Container
// =============================================================================

/// Heap record owned by an [`EventsBuffer`].
enum Record {
    Midi(*mut MidiEvent),
    SysEx(*mut SysExEvent, *mut [u8]),
}

impl Record {
    fn header(&self) -> *mut EventHeader {
        match *self {
            Self::Midi(event) => event.cast(),
            Self::SysEx(event, _) => event.cast(),
        }
    }
}

/// Native events container built for a single dispatch.
///
/// The pointer array is stored in word-sized slots so the header and the
/// flexible array share one allocation with pointer alignment.
pub struct EventsBuffer {
    storage: Box<[usize]>,
    records: Vec<Record>,
}

// SAFETY: EventsBuffer exclusively owns the container, every record and
// every SysEx payload. Nothing else holds the raw pointers between
// dispatches, so moving the buffer to another thread is sound.
unsafe impl Send for EventsBuffer {}

/// Header words before the pointer array (num_events + padding, reserved).
const HEADER_WORDS: usize = Events::EVENTS_OFFSET / size_of::<usize>();

impl EventsBuffer {
    /// Allocate a container holding `events` in order.
    pub fn build(events: &[Event]) -> Self {
        // At least the two slots the declared struct has.
        let slots = events.len().max(2);
        let mut buffer = Self {
            storage: vec![0usize; HEADER_WORDS + slots].into_boxed_slice(),
            records: Vec::with_capacity(events.len()),
        };

        for event in events {
            let record = match event {
                Event::Midi(message) => Record::Midi(Box::into_raw(Box::new(MidiEvent::from(message)))),
                Event::SysEx(message) => {
                    let dump = Box::into_raw(message.data.clone().into_boxed_slice());
                    let native = SysExEvent {
                        event_type: EVENT_TYPE_SYSEX,
                        byte_size: size_of::<SysExEvent>() as i32,
                        delta_frames: message.delta_frames,
                        flags: 0,
                        dump_bytes: message.data.len() as i32,
                        reserved1: 0,
                        sysex_dump: dump.cast::<u8>(),
                        reserved2: 0,
                    };
                    Record::SysEx(Box::into_raw(Box::new(native)), dump)
                }
            };
            buffer.records.push(record);
        }

        let header = buffer.as_ptr();
        // SAFETY: storage is zeroed, pointer aligned and large enough for the
        // header plus `slots` pointers.
        unsafe {
            (*header).num_events = events.len() as i32;
            for (index, record) in buffer.records.iter().enumerate() {
                *(Events::slot(header, index) as *mut *mut EventHeader) = record.header();
            }
        }

        log::trace!("Built events container with {} events", events.len());
        buffer
    }

    /// Number of events in the container.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the container holds no events.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Decode the `index`-th native record.
    pub fn get(&self, index: usize) -> Option<Event> {
        let record = self.records.get(index)?;
        // SAFETY: the record is owned by this buffer and fully initialized.
        unsafe { decode(record.header()) }
    }

    /// Container pointer for a dispatch call.
    pub fn as_ptr(&mut self) -> *mut Events {
        self.storage.as_mut_ptr().cast()
    }

    /// Container pointer as a dispatch `ptr` argument.
    pub fn as_void_ptr(&mut self) -> *mut c_void {
        Events::as_void(self.as_ptr())
    }

    /// Free the container and everything it owns.
    pub fn release(self) {
        log::trace!("Releasing events container with {} events", self.len());
        drop(self);
    }
}

impl Drop for EventsBuffer {
    fn drop(&mut self) {
        for record in self.records.drain(..) {
            // SAFETY: every pointer came from Box::into_raw in build() and is
            // freed only here.
            unsafe {
                match record {
                    Record::Midi(event) => drop(Box::from_raw(event)),
                    Record::SysEx(event, dump) => {
                        drop(Box::from_raw(event));
                        drop(Box::from_raw(dump));
                    }
                }
            }
        }
    }
}

impl std::fmt::Debug for EventsBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventsBuffer").field("len", &self.len()).finish()
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode one record by its type tag. Unsupported types yield `None`.
///
/// # Safety
///
/// `header` must be null or point to a record whose layout matches its
/// `event_type`.
unsafe fn decode(header: *const EventHeader) -> Option<Event> {
    if header.is_null() {
        return None;
    }

    match (*header).event_type {
        EVENT_TYPE_MIDI => Some(Event::Midi(MidiMessage::from(&*header.cast::<MidiEvent>()))),
        EVENT_TYPE_SYSEX => {
            let sysex = &*header.cast::<SysExEvent>();
            let data = if sysex.sysex_dump.is_null() || sysex.dump_bytes <= 0 {
                Vec::new()
            } else {
                std::slice::from_raw_parts(sysex.sysex_dump, sysex.dump_bytes as usize).to_vec()
            };
            Some(Event::sysex(sysex.delta_frames, data))
        }
        other => {
            log::debug!("Skipping event of unsupported type {}", other);
            None
        }
    }
}

/// Copy every supported event out of a container owned by the other side.
///
/// The container is only read; ownership stays with the caller of
/// `ProcessEvents`.
///
/// # Safety
///
/// `events` must be null or point to a valid container whose pointer array
/// holds `num_events` entries.
pub unsafe fn read_events(events: *const Events) -> Vec<Event> {
    if events.is_null() {
        return Vec::new();
    }

    let count = usize::try_from((*events).num_events).unwrap_or(0);
    (0..count)
        .filter_map(|index| decode(*Events::slot(events, index)))
        .collect()
}
