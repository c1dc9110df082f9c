/*
    Copyright (C) 2020-2022  Rafal Michalski

    This file is part of SPECTRUSTY, a Rust library for building emulators.

    For the full copyright notice, see the lib.rs file.
*/
/*! **TZX** file format utilities.

# TZX format

A **TZX** file starts with a 10 byte header followed by a sequence of blocks.

| offset | size | description                      |
|--------|------|----------------------------------|
|    0   |    8 | signature `"ZXTape!"` + `0x1A`   |
|    8   |    1 | major revision number            |
|    9   |    1 | minor revision number            |

Each block starts with a block ID byte which determines the structure of the rest of the block.
All multi-byte values are stored LSB first.

This module understands two kinds of blocks:

*Standard speed data* block (ID `0x10`):

| offset | size | description                      |
|--------|------|----------------------------------|
|    0   |    2 | pause after this block (ms)      |
|    2   |    2 | length of data that follow       |
|    4   |    N | data as in *TAP* files           |

*Text description* block (ID `0x30`):

| offset | size | description                      |
|--------|------|----------------------------------|
|    0   |    1 | length of the text description   |
|    1   |    N | text description in ASCII        |

Any other block ID found at a block boundary makes the whole image invalid. Without knowing the
structure of such a block it's impossible to tell where the next one begins.

## Parsing

```no_run
use spectrusty_tzx::tzx::*;

let image = std::fs::read("some.tzx")?;
let tzx = parse_tzx(&image)?;
for block in tzx.blocks.iter() {
    println!("{}", block);
}
# Ok::<(), Box<dyn std::error::Error>>(())
```

## *TAPE* pulses

[TzxPulseIter] converts parsed blocks to a sequence of [Pulse]s: T-state intervals paired with
the signal level held during each interval. The signal starts low and toggles after each data
pulse. A non-zero pause after a data block is emitted as a single pulse that keeps the current
level.

```no_run
use spectrusty_tzx::tzx::*;

let tzx = read_tzx(std::fs::File::open("some.tzx")?)?;
for Pulse { level, duration } in tzx.pulse_iter() {
    // feed the tape loading routine
}
# Ok::<(), std::io::Error>(())
```
*/
use core::convert::TryFrom;
use core::fmt;
use core::num::NonZeroU32;
use std::borrow::Cow;

#[cfg(feature = "snapshot")]
use serde::{Serialize, Deserialize};

use crate::pulse::{EncPulseIter, pause_pulse_length};

mod parse;
mod pulse;
mod write;
pub use parse::*;
pub use pulse::*;
pub use write::*;

/// The **TZX** file signature.
pub const SIGNATURE: &[u8;8] = b"ZXTape!\x1a";
/// The size of the **TZX** file header, including the signature.
pub const HEADER_SIZE: usize = 10;
/// The major revision number of the **TZX** format written by this module.
pub const MAJOR_REVISION: u8 = 1;
/// The minor revision number of the **TZX** format written by this module.
pub const MINOR_REVISION: u8 = 20;
/// The default pause after a data block in milliseconds.
pub const DEFAULT_PAUSE_MS: u16 = 1000;

macro_rules! tzx_id {
    ($($id:ident = $n:literal => $name:literal),*) => {
        /// **TZX** block identifiers.
        #[repr(u8)]
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum TzxId {
            $(#[doc = $name] $id = $n),*
        }

        impl TryFrom<u8> for TzxId {
            type Error = &'static str;
            fn try_from(id: u8) -> Result<Self, Self::Error> {
                match id {
                    $($n => Ok(TzxId::$id),)*
                    _ => Err("Unknown TZX ID")
                }
            }
        }

        impl fmt::Display for TzxId {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(match self {
                    $(TzxId::$id => $name),*
                })
            }
        }
    };
}

tzx_id! {
    StandardSpeed    = 0x10 => "Standard speed data",
    TurboSpeed       = 0x11 => "Turbo speed data",
    PureTone         = 0x12 => "Pure tone",
    SeqOfPulses      = 0x13 => "Sequence of pulses",
    PureData         = 0x14 => "Pure data",
    DirectRec        = 0x15 => "Direct recording",
    CswRecording     = 0x18 => "CSW recording",
    Generalized      = 0x19 => "Generalized data",
    Pause            = 0x20 => "Pause",
    GroupStart       = 0x21 => "Group start",
    GroupEnd         = 0x22 => "Group end",
    Jump             = 0x23 => "Jump to block",
    LoopStart        = 0x24 => "Loop start",
    LoopEnd          = 0x25 => "Loop end",
    CallSeq          = 0x26 => "Call sequence",
    Return           = 0x27 => "Return from sequence",
    Select           = 0x28 => "Select block",
    StopIn48k        = 0x2A => "Stop the tape if in 48K mode",
    SetLevel         = 0x2B => "Set signal level",
    Text             = 0x30 => "Text description",
    Message          = 0x31 => "Message",
    Archive          = 0x32 => "Archive info",
    Hardware         = 0x33 => "Hardware type",
    Custom           = 0x35 => "Custom info",
    Glue             = 0x5A => "Glue"
}

impl From<TzxId> for u8 {
    fn from(id: TzxId) -> u8 {
        id as u8
    }
}

/// The parsed **TZX** file.
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TzxFile {
    /// The major revision number of the format.
    pub major_revision: u8,
    /// The minor revision number of the format.
    pub minor_revision: u8,
    /// Blocks in the order of playback.
    pub blocks: Vec<TzxBlock>,
}

/// The **TZX** block.
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TzxBlock {
    /// Block `0x10`.
    StandardSpeed(StandardSpeedBlock),
    /// Block `0x30`.
    Text(TextDescription),
}

/// The standard speed data block, loaded with the ROM timing.
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StandardSpeedBlock {
    /// The duration of silence following this block's pulses.
    pub pause_after_block_in_ms: u16,
    /// Data, including the flag and checksum bytes, as in a *TAP* chunk.
    pub data: Box<[u8]>,
}

/// The text description block.
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextDescription {
    /// Raw ASCII text.
    pub text: Box<[u8]>,
}

impl Default for TzxFile {
    fn default() -> Self {
        TzxFile::new()
    }
}

impl TzxFile {
    /// Creates an empty `TzxFile` of the revision written by this module.
    pub fn new() -> Self {
        TzxFile {
            major_revision: MAJOR_REVISION,
            minor_revision: MINOR_REVISION,
            blocks: Vec::new()
        }
    }
    /// Appends a `block`, builder style.
    pub fn with_block<B: Into<TzxBlock>>(mut self, block: B) -> Self {
        self.blocks.push(block.into());
        self
    }
    /// Returns the signature of the file. It's always [SIGNATURE].
    #[inline]
    pub fn signature(&self) -> &'static [u8;8] {
        SIGNATURE
    }
    /// Returns an iterator over the text description blocks.
    pub fn texts(&self) -> impl Iterator<Item=&TextDescription> {
        self.blocks.iter().filter_map(|block| match block {
            TzxBlock::Text(text) => Some(text),
            _ => None
        })
    }
    /// Returns an iterator over the standard speed data blocks.
    pub fn data_blocks(&self) -> impl Iterator<Item=&StandardSpeedBlock> {
        self.blocks.iter().filter_map(|block| match block {
            TzxBlock::StandardSpeed(data) => Some(data),
            _ => None
        })
    }
    /// Returns a leveled pulse iterator over all blocks of this file.
    pub fn pulse_iter(&self) -> TzxPulseIter<'_> {
        TzxPulseIter::new(&self.blocks)
    }
}

impl TzxBlock {
    /// Returns the ID of this block.
    pub fn id(&self) -> TzxId {
        match self {
            TzxBlock::StandardSpeed(..) => TzxId::StandardSpeed,
            TzxBlock::Text(..) => TzxId::Text,
        }
    }
    /// Returns the size in bytes of this block, including its ID.
    pub fn size(&self) -> usize {
        match self {
            TzxBlock::StandardSpeed(block) => 5 + block.data.len(),
            TzxBlock::Text(text) => 2 + text.text.len(),
        }
    }
}

impl StandardSpeedBlock {
    /// Creates a block from `data` with the [DEFAULT_PAUSE_MS] pause.
    pub fn new<D: Into<Box<[u8]>>>(data: D) -> Self {
        StandardSpeedBlock { pause_after_block_in_ms: DEFAULT_PAUSE_MS, data: data.into() }
    }
    /// Changes the pause after this block, builder style.
    pub fn with_pause(mut self, ms: u16) -> Self {
        self.pause_after_block_in_ms = ms;
        self
    }
    /// Returns a pulse interval iterator over this block's data, excluding the pause.
    pub fn pulse_iter(&self) -> EncPulseIter<'_> {
        EncPulseIter::new(&self.data)
    }
    /// Returns the length of the pause in T-states or `None` if there is no pause.
    pub fn pause_pulse(&self) -> Option<NonZeroU32> {
        pause_pulse_length(self.pause_after_block_in_ms)
    }
}

impl TextDescription {
    /// Creates a text description block.
    pub fn new<T: Into<Box<[u8]>>>(text: T) -> Self {
        TextDescription { text: text.into() }
    }
    /// Returns a string reference if the underlying bytes can form a proper UTF-8 string.
    pub fn to_str(&self) -> Result<&str, core::str::Utf8Error> {
        core::str::from_utf8(&self.text)
    }
    /// Returns a string, including invalid characters.
    pub fn to_str_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.text)
    }
}

impl From<StandardSpeedBlock> for TzxBlock {
    fn from(block: StandardSpeedBlock) -> Self {
        TzxBlock::StandardSpeed(block)
    }
}

impl From<TextDescription> for TzxBlock {
    fn from(text: TextDescription) -> Self {
        TzxBlock::Text(text)
    }
}

impl fmt::Display for TzxBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TzxBlock::StandardSpeed(block) => fmt::Display::fmt(block, f),
            TzxBlock::Text(text) => fmt::Display::fmt(text, f),
        }
    }
}

impl fmt::Display for StandardSpeedBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} bytes, pause {} ms",
            TzxId::StandardSpeed, self.data.len(), self.pause_after_block_in_ms)
    }
}

impl fmt::Display for TextDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Text: {:?}", self.to_str_lossy())
    }
}
