/*
    Copyright (C) 2020-2022  Rafal Michalski

    This file is part of SPECTRUSTY, a Rust library for building emulators.

    For the full copyright notice, see the lib.rs file.
*/
use core::iter::FusedIterator;
use core::num::NonZeroU32;

#[cfg(feature = "snapshot")]
use serde::{Serialize, Deserialize};

use super::consts::*;
use super::lead_pulses_for;

/// The current state of the [EncPulseIter].
#[cfg_attr(feature = "snapshot", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PulseIterState {
    /// Emitting lead pulses.
    Lead{
        /// How many pulses left to the end of this lead.
        countdown: u16
    },
    /// Emitting the 1st sync pulse.
    Sync1,
    /// Emitting the 2nd sync pulse.
    Sync2,
    /// Emitting data pulses.
    Data{
        /// A current byte.
        /// The highest bit determines the last (`pulse` is odd) or next (`pulse` is even) pulse being emitted.
        current: u8,
        /// A pulse counter for the current byte.
        /// There are two pulses per each bit (16 pulses per byte).
        pulse: u8 },
    /// Emitting is done.
    Done
}

/// Encodes a slice of bytes as *TAPE* T-state pulse intervals via an [Iterator] interface.
///
/// The timing of the pulses matches those expected by ZX Spectrum's ROM loading routines.
///
/// The first byte is a flag byte and it determines the duration of the *LEAD PULSE* signal.
/// If it's less than 128 the number of generated lead pulses is [LEAD_PULSES_HEAD].
/// Otherwise, it's [LEAD_PULSES_DATA].
///
/// After the lead pulses, two synchronization pulses are being emitted following by data pulses
/// for each byte including the initial flag byte. Each bit is encoded as two pulses of equal length,
/// the most significant bit first.
///
/// An empty slice produces no pulses at all.
#[derive(Clone, Debug)]
pub struct EncPulseIter<'a> {
    data: &'a [u8],
    state: PulseIterState,
    flag: u8,
}

impl PulseIterState {
    /// Returns `true` if there are no more pulses to emit.
    pub fn is_done(&self) -> bool {
        matches!(self, PulseIterState::Done)
    }
    /// Returns `true` if emitting lead pulses.
    pub fn is_lead(&self) -> bool {
        matches!(self, PulseIterState::Lead {..})
    }
    /// Returns `true` if emitting data pulses.
    pub fn is_data(&self) -> bool {
        matches!(self, PulseIterState::Data {..})
    }
    /// Returns `true` if emitting sync1 pulse.
    pub fn is_sync1(&self) -> bool {
        matches!(self, PulseIterState::Sync1)
    }
    /// Returns `true` if emitting sync2 pulse.
    pub fn is_sync2(&self) -> bool {
        matches!(self, PulseIterState::Sync2)
    }
}

impl Default for EncPulseIter<'_> {
    fn default() -> Self {
        EncPulseIter { data: &[], state: PulseIterState::Done, flag: 0 }
    }
}

impl<'a> EncPulseIter<'a> {
    /// Creates a new `EncPulseIter` encoding the given `data`.
    pub fn new(data: &'a [u8]) -> Self {
        match data.split_first() {
            Some((&flag, data)) => {
                let state = PulseIterState::Lead { countdown: lead_pulses_for(flag) };
                EncPulseIter { data, state, flag }
            }
            None => EncPulseIter::default()
        }
    }
    /// Returns a reference to the current state.
    pub fn state(&self) -> &PulseIterState {
        &self.state
    }
    /// Returns a flag byte.
    pub fn flag(&self) -> u8 {
        self.flag
    }
    /// Returns `true` if there are no more pulses to emit.
    pub fn is_done(&self) -> bool {
        self.state.is_done()
    }
    /// Returns the bytes that haven't been encoded yet, excluding the byte being currently emitted.
    pub fn remaining(&self) -> &'a [u8] {
        self.data
    }
    /// Allows to manually assign a `state`, a `flag` and the `remaining` bytes.
    /// Can be used to restore a previously serialized state.
    pub fn with_state_and_flag(mut self, state: PulseIterState, flag: u8, remaining: &'a [u8]) -> Self {
        self.state = state;
        self.flag = flag;
        self.data = remaining;
        self
    }

    fn next_data(&mut self) -> PulseIterState {
        match self.data.split_first() {
            Some((&current, rest)) => {
                self.data = rest;
                PulseIterState::Data { current, pulse: 0 }
            }
            None => PulseIterState::Done
        }
    }
}

impl Iterator for EncPulseIter<'_> {
    type Item = NonZeroU32;

    fn next(&mut self) -> Option<NonZeroU32> {
        match self.state {
            PulseIterState::Lead {ref mut countdown} => {
                match *countdown - 1 {
                    0 => {
                        self.state = PulseIterState::Sync1
                    }
                    res => {
                        *countdown = res
                    }
                }
                Some(LEAD_PULSE_LENGTH)
            }
            PulseIterState::Sync1 => {
                self.state = PulseIterState::Sync2;
                Some(SYNC_PULSE1_LENGTH)
            }
            PulseIterState::Sync2 => {
                self.state = PulseIterState::Data { current: self.flag, pulse: 0 };
                Some(SYNC_PULSE2_LENGTH)
            }
            PulseIterState::Data { ref mut current, ref mut pulse } => {
                let bit_one: bool = *current & 0x80 != 0;
                if *pulse == 15 {
                    self.state = self.next_data();
                }
                else {
                    if *pulse & 1 == 1 {
                        *current = current.rotate_left(1);
                    }
                    *pulse += 1;
                }
                Some(if bit_one { ONE_PULSE_LENGTH } else { ZERO_PULSE_LENGTH })
            }
            PulseIterState::Done => None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.len();
        (len, Some(len))
    }
}

impl ExactSizeIterator for EncPulseIter<'_> {
    fn len(&self) -> usize {
        let data_pulses = 16 * self.data.len();
        match self.state {
            PulseIterState::Lead { countdown } => countdown as usize + 2 + 16 + data_pulses,
            PulseIterState::Sync1 => 2 + 16 + data_pulses,
            PulseIterState::Sync2 => 1 + 16 + data_pulses,
            PulseIterState::Data { pulse, .. } => 16 - pulse as usize + data_pulses,
            PulseIterState::Done => 0
        }
    }
}

impl FusedIterator for EncPulseIter<'_> {}
