//! Opcode tables for both directions of the VST2 call protocol.
//!
//! [`EffectOpcode`] travels host -> plugin through the effect dispatcher and
//! [`HostOpcode`] travels plugin -> host through the host callback. Every
//! variant carries an explicit discriminant equal to the published protocol
//! value. Deprecated slots are kept (prefixed `Deprecated`) so raw values
//! received from old plugins still decode. Host slot 5 was never assigned
//! and has no variant.
//!
//! Each variant's documentation lists how the four generic parameters are
//! used: `index` (i32), `value` (isize), `ptr` (pointer) and `opt` (f32),
//! plus the meaning of the return value.

/// Generates a closed opcode enum with a frozen lookup table.
///
/// Produces `from_raw`, `raw`, `name` and the `ALL` table in declaration
/// order. Values are written out literally; nothing is derived from
/// position.
macro_rules! opcode_table {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $value:literal,
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(i32)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                $variant = $value,
            )*
        }

        impl $name {
            /// Every opcode in ascending numeric order.
            pub const ALL: &'static [$name] = &[$($name::$variant,)*];

            /// Decode a raw opcode value. Returns `None` for unassigned values.
            pub const fn from_raw(raw: i32) -> Option<Self> {
                match raw {
                    $($value => Some(Self::$variant),)*
                    _ => None,
                }
            }

            /// The numeric protocol value.
            #[inline]
            pub const fn raw(self) -> i32 {
                self as i32
            }

            /// Variant name, used in log output.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)*
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", self.name(), self.raw())
            }
        }
    };
}

opcode_table! {
    /// Opcodes sent by the host to the plugin dispatcher.
    pub enum EffectOpcode {
        /// Initialise the plugin. Sent once, right after loading.
        Open = 0,
        /// Release all plugin resources. The effect pointer is invalid afterwards.
        Close = 1,
        /// `value`: program number to select.
        SetProgram = 2,
        /// Returns the current program number.
        GetProgram = 3,
        /// `ptr`: 24-byte ASCII buffer holding the new current program name.
        SetProgramName = 4,
        /// `ptr`: 24-byte ASCII buffer receiving the current program name.
        GetProgramName = 5,
        /// `index`: parameter. `ptr`: 8-byte buffer receiving the unit label ("dB", "ms").
        GetParamLabel = 6,
        /// `index`: parameter. `ptr`: 8-byte buffer receiving the value text ("0.5", "HALL").
        GetParamDisplay = 7,
        /// `index`: parameter. `ptr`: 8-byte buffer receiving the name ("Gain").
        GetParamName = 8,
        DeprecatedGetVu = 9,
        /// `opt`: new sample rate.
        SetSampleRate = 10,
        /// `value`: maximum block size in frames.
        SetBlockSize = 11,
        /// `value`: 1 resumes processing, 0 suspends it.
        MainsChanged = 12,
        /// `ptr`: receives a pointer to the editor rectangle.
        EditGetRect = 13,
        /// `ptr`: native parent window handle.
        EditOpen = 14,
        /// Close the editor window.
        EditClose = 15,
        DeprecatedEditDraw = 16,
        DeprecatedEditMouse = 17,
        DeprecatedEditKey = 18,
        /// Host idle tick for the editor.
        EditIdle = 19,
        DeprecatedEditTop = 20,
        DeprecatedEditSleep = 21,
        DeprecatedIdentify = 22,
        /// `index`: 0 bank, 1 program. `ptr`: `void**` receiving the chunk address.
        /// Returns the chunk length in bytes. The memory stays owned by the plugin.
        GetChunk = 23,
        /// `index`: 0 bank, 1 program. `value`: byte length. `ptr`: chunk data.
        SetChunk = 24,
        /// `ptr`: events container. Valid only for the duration of the call.
        ProcessEvents = 25,
        /// `index`: parameter. Returns 1 when the parameter can be automated.
        CanBeAutomated = 26,
        /// `index`: parameter. `ptr`: null-terminated text to parse. Returns 1 on success.
        String2Parameter = 27,
        DeprecatedGetNumProgramCategories = 28,
        /// `index`: program. `ptr`: 24-byte buffer receiving its name. Returns 1 on success.
        GetProgramNameIndexed = 29,
        DeprecatedCopyProgram = 30,
        DeprecatedConnectInput = 31,
        DeprecatedConnectOutput = 32,
        /// `index`: input pin. `ptr`: pin properties to fill. Returns 1 if supported.
        GetInputProperties = 33,
        /// `index`: output pin. `ptr`: pin properties to fill. Returns 1 if supported.
        GetOutputProperties = 34,
        /// Returns the plugin category.
        GetPlugCategory = 35,
        DeprecatedGetCurrentPosition = 36,
        DeprecatedGetDestinationBuffer = 37,
        /// `ptr`: audio file array. `value`: count. `index`: start flag.
        OfflineNotify = 38,
        /// `ptr`: offline task array. `value`: count.
        OfflinePrepare = 39,
        /// `ptr`: offline task array. `value`: count.
        OfflineRun = 40,
        /// `ptr`: variable I/O descriptor.
        ProcessVarIo = 41,
        /// `value`: input arrangement pointer. `ptr`: output arrangement pointer.
        SetSpeakerArrangement = 42,
        DeprecatedSetBlockSizeAndSampleRate = 43,
        /// `value`: 1 bypasses, 0 processes.
        SetBypass = 44,
        /// `ptr`: 32-byte buffer receiving the effect name.
        GetEffectName = 45,
        DeprecatedGetErrorText = 46,
        /// `ptr`: 64-byte buffer receiving the vendor string.
        GetVendorString = 47,
        /// `ptr`: 64-byte buffer receiving the product string.
        GetProductString = 48,
        /// Returns the vendor-specific version.
        GetVendorVersion = 49,
        /// No fixed contract.
        VendorSpecific = 50,
        /// `ptr`: capability string. Returns 1 yes, -1 no, 0 don't know.
        CanDo = 51,
        /// Returns the tail length in samples. 0 is default, 1 means no tail.
        GetTailSize = 52,
        DeprecatedIdle = 53,
        DeprecatedGetIcon = 54,
        DeprecatedSetViewPosition = 55,
        /// `index`: parameter. `ptr`: parameter properties to fill. Returns 1 if supported.
        GetParameterProperties = 56,
        DeprecatedKeysRequired = 57,
        /// Returns the VST version the plugin implements (2400 for 2.4).
        GetVstVersion = 58,
        /// `index`: ASCII character. `value`: virtual key. `opt`: modifiers. Returns 1 if used.
        EditKeyDown = 59,
        /// `index`: ASCII character. `value`: virtual key. `opt`: modifiers. Returns 1 if used.
        EditKeyUp = 60,
        /// `value`: 0 circular, 1 circular relative, 2 linear.
        SetEditKnobMode = 61,
        /// `index`: MIDI channel. `ptr`: MIDI program name record. Returns programs used.
        GetMidiProgramName = 62,
        /// `index`: MIDI channel. `ptr`: MIDI program name record. Returns the current program.
        GetCurrentMidiProgram = 63,
        /// `index`: MIDI channel. `ptr`: MIDI program category record. Returns categories used.
        GetMidiProgramCategory = 64,
        /// `index`: MIDI channel. Returns 1 when program or key names changed.
        HasMidiProgramsChanged = 65,
        /// `index`: MIDI channel. `ptr`: MIDI key name record. Returns 1 if supported.
        GetMidiKeyName = 66,
        /// Sent before a program is loaded.
        BeginSetProgram = 67,
        /// Sent after a program is loaded.
        EndSetProgram = 68,
        /// `value`: receives input arrangement pointer. `ptr`: receives output arrangement pointer.
        GetSpeakerArrangement = 69,
        /// `ptr`: 64-byte buffer receiving the sub-plugin name. Returns its unique id.
        ShellGetNextPlugin = 70,
        /// Processing is about to start.
        StartProcess = 71,
        /// Processing has stopped.
        StopProcess = 72,
        /// `value`: total number of samples the offline pass will process.
        SetTotalSampleToProcess = 73,
        /// `value`: pan law type. `opt`: gain.
        SetPanLaw = 74,
        /// `ptr`: patch chunk info. Returns -1 refuse, 1 accept, 0 unsupported.
        BeginLoadBank = 75,
        /// `ptr`: patch chunk info. Returns -1 refuse, 1 accept, 0 unsupported.
        BeginLoadProgram = 76,
        /// `value`: 0 for 32-bit processing, 1 for 64-bit.
        SetProcessPrecision = 77,
        /// Returns the number of MIDI input channels used (1-16).
        GetNumMidiInputChannels = 78,
        /// Returns the number of MIDI output channels used (1-16).
        GetNumMidiOutputChannels = 79,
    }
}

opcode_table! {
    /// Opcodes sent by the plugin to the host callback.
    pub enum HostOpcode {
        /// `index`: parameter. `opt`: new normalized value.
        Automate = 0,
        /// Returns the host's VST version (2400). Answered by the bridge itself.
        Version = 1,
        /// Returns the unique id of the shell sub-plugin being loaded.
        CurrentId = 2,
        /// The plugin is in a modal loop and wants idle time.
        Idle = 3,
        DeprecatedPinConnected = 4,
        DeprecatedWantMidi = 6,
        /// `value`: request mask. Returns a time info pointer owned by the host, or 0.
        GetTime = 7,
        /// `ptr`: events container produced by the plugin. Returns 1 when processed.
        ProcessEvents = 8,
        DeprecatedSetTime = 9,
        DeprecatedTempoAt = 10,
        DeprecatedGetNumAutomatableParameters = 11,
        DeprecatedGetParameterQuantization = 12,
        /// The plugin's I/O setup changed. Returns 1 if supported.
        IoChanged = 13,
        DeprecatedNeedIdle = 14,
        /// `index`: new width. `value`: new height. Returns 1 on success.
        SizeWindow = 15,
        /// Returns the current sample rate.
        GetSampleRate = 16,
        /// Returns the current block size.
        GetBlockSize = 17,
        /// Returns the input latency in samples.
        GetInputLatency = 18,
        /// Returns the output latency in samples.
        GetOutputLatency = 19,
        DeprecatedGetPreviousPlug = 20,
        DeprecatedGetNextPlug = 21,
        DeprecatedWillReplaceOrAccumulate = 22,
        /// Returns the current process level.
        GetCurrentProcessLevel = 23,
        /// Returns the current automation state.
        GetAutomationState = 24,
        /// `index`: new audio files. `value`: audio files. `ptr`: audio file array.
        OfflineStart = 25,
        /// `index`: read original samples. `value`: option. `ptr`: offline task.
        OfflineRead = 26,
        /// `value`: option. `ptr`: offline task.
        OfflineWrite = 27,
        /// Returns the current offline pass.
        OfflineGetCurrentPass = 28,
        /// Returns the current offline meta pass.
        OfflineGetCurrentMetaPass = 29,
        DeprecatedSetOutputSampleRate = 30,
        DeprecatedGetOutputSpeakerArrangement = 31,
        /// `ptr`: 64-byte buffer receiving the host vendor.
        GetVendorString = 32,
        /// `ptr`: 64-byte buffer receiving the host product.
        GetProductString = 33,
        /// Returns the host vendor version.
        GetVendorVersion = 34,
        /// No fixed contract.
        VendorSpecific = 35,
        DeprecatedSetIcon = 36,
        /// `ptr`: capability string. Returns 1 yes, -1 no, 0 don't know.
        CanDo = 37,
        /// Returns the host language.
        GetLanguage = 38,
        DeprecatedOpenWindow = 39,
        DeprecatedCloseWindow = 40,
        /// Returns a pointer to the host's current directory string.
        GetDirectory = 41,
        /// Request a display refresh.
        UpdateDisplay = 42,
        /// `index`: parameter about to be edited.
        BeginEdit = 43,
        /// `index`: parameter no longer being edited.
        EndEdit = 44,
        /// `ptr`: file selector descriptor. Returns 1 on success.
        OpenFileSelector = 45,
        /// `ptr`: file selector descriptor.
        CloseFileSelector = 46,
        DeprecatedEditFile = 47,
        DeprecatedGetChunkFile = 48,
        DeprecatedGetInputSpeakerArrangement = 49,
    }
}

impl EffectOpcode {
    /// Whether the slot was deprecated in VST 2.4.
    pub fn is_deprecated(self) -> bool {
        self.name().starts_with("Deprecated")
    }
}

impl HostOpcode {
    /// Whether the slot was deprecated in VST 2.4.
    pub fn is_deprecated(self) -> bool {
        self.name().starts_with("Deprecated")
    }
}
