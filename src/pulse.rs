/*
    Copyright (C) 2020-2022  Rafal Michalski

    This file is part of SPECTRUSTY, a Rust library for building emulators.

    For the full copyright notice, see the lib.rs file.
*/
//! **TAPE** pulse signal encoding with the standard ROM timing.
use core::num::NonZeroU32;

mod encoding;

pub mod consts {
    use core::num::NonZeroU32;
    /// The frequency of the reference clock in T-states per second.
    pub const CPU_HZ: u32 = 3_500_000;
    /// Length of the lead pulse in T-states.
    pub const LEAD_PULSE_LENGTH : NonZeroU32 = unsafe { NonZeroU32::new_unchecked(2168) };
    /// Length of the 1st sync pulse in T-states.
    pub const SYNC_PULSE1_LENGTH: NonZeroU32 = unsafe { NonZeroU32::new_unchecked(667)  };
    /// Length of the 2nd sync pulse in T-states.
    pub const SYNC_PULSE2_LENGTH: NonZeroU32 = unsafe { NonZeroU32::new_unchecked(735)  };
    /// Length of the bit value 0 pulse in T-states.
    pub const ZERO_PULSE_LENGTH : NonZeroU32 = unsafe { NonZeroU32::new_unchecked(855)  };
    /// Length of the bit value 1 pulse in T-states.
    pub const ONE_PULSE_LENGTH  : NonZeroU32 = unsafe { NonZeroU32::new_unchecked(1710) };

    /// The number of LEAD pulses for the header block.
    pub const LEAD_PULSES_HEAD: u16 = 8063;
    /// The number of LEAD pulses for the data block.
    pub const LEAD_PULSES_DATA: u16 = 3223;
}

pub use encoding::*;

/// Converts a pause duration given in milliseconds to T-states.
#[inline]
pub fn ms_to_ticks(ms: u16) -> u32 {
    // u16::MAX ms is ~229.4M T-states, so the result always fits
    (u64::from(ms) * u64::from(consts::CPU_HZ) / 1000) as u32
}

/// Returns the length of a pause pulse in T-states or `None` if `ms` is 0.
#[inline]
pub fn pause_pulse_length(ms: u16) -> Option<NonZeroU32> {
    NonZeroU32::new(ms_to_ticks(ms))
}

/// Creates an iterator of *TAPE* pulse intervals encoding `data` with the standard ROM timing.
///
/// The first byte of `data` is treated as a flag byte. See [EncPulseIter].
pub fn standard_block_pulses(data: &[u8]) -> EncPulseIter<'_> {
    EncPulseIter::new(data)
}

/// Returns the exact number of pulses [standard_block_pulses] yields for the given `data`.
pub fn standard_block_pulse_count(data: &[u8]) -> usize {
    match data.split_first() {
        Some((&flag, _)) => lead_pulses_for(flag) as usize + 2 + 16 * data.len(),
        None => 0
    }
}

/// Returns the number of lead pulses preceding a block starting with the given `flag` byte.
#[inline]
pub fn lead_pulses_for(flag: u8) -> u16 {
    if flag & 0x80 == 0 {
        consts::LEAD_PULSES_HEAD
    }
    else {
        consts::LEAD_PULSES_DATA
    }
}
