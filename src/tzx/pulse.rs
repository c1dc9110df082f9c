/*
    Copyright (C) 2020-2022  Rafal Michalski

    This file is part of SPECTRUSTY, a Rust library for building emulators.

    For the full copyright notice, see the lib.rs file.
*/
use core::iter::FusedIterator;
use core::num::NonZeroU32;

#[allow(unused_imports)]
use log::{error, warn, info, debug, trace};

use crate::pulse::{EncPulseIter, standard_block_pulse_count};
use super::{TzxFile, TzxBlock};

/// A single *TAPE* signal interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pulse {
    /// The signal level held during this interval: `true` is high.
    pub level: bool,
    /// The length of this interval in T-states.
    pub duration: NonZeroU32,
}

impl From<Pulse> for (bool, u32) {
    fn from(Pulse { level, duration }: Pulse) -> Self {
        (level, duration.get())
    }
}

/// Implements an iterator of leveled T-state pulse intervals over **TZX** blocks.
/// See also: [EncPulseIter].
///
/// The signal starts low. The level is toggled after each emitted data pulse, so the level
/// entering a block is the level reached at the end of the previous one.
///
/// A non-zero pause after a standard speed data block is emitted as a single pulse at the
/// current level which is left unchanged. A zero pause emits nothing.
///
/// Text description blocks emit no pulses, their content is logged with [log::info].
#[derive(Clone, Debug)]
pub struct TzxPulseIter<'a> {
    blocks: &'a [TzxBlock],
    next_block: usize,
    ep_iter: EncPulseIter<'a>,
    pause: Option<NonZeroU32>,
    level: bool,
}

/// Creates an instance of [TzxPulseIter] over blocks of the given `tzx` file.
pub fn pulses(tzx: &TzxFile) -> TzxPulseIter<'_> {
    tzx.pulse_iter()
}

impl<'a> TzxPulseIter<'a> {
    /// Creates a new `TzxPulseIter` starting with the first of `blocks` and the low signal level.
    pub fn new(blocks: &'a [TzxBlock]) -> Self {
        TzxPulseIter {
            blocks,
            next_block: 0,
            ep_iter: EncPulseIter::default(),
            pause: None,
            level: false
        }
    }
    /// Returns the level of the next data pulse or the pending pause.
    pub fn level(&self) -> bool {
        self.level
    }
    /// Returns the index of the block being currently emitted.
    ///
    /// Returns `None` before the first block has been entered.
    pub fn block_index(&self) -> Option<usize> {
        self.next_block.checked_sub(1)
    }
    /// Returns a reference to the iterator of the current block's data pulses.
    pub fn get_ref(&self) -> &EncPulseIter<'a> {
        &self.ep_iter
    }
    /// Returns `true` if there are no more pulses to emit.
    pub fn is_done(&self) -> bool {
        self.len() == 0
    }

    fn enter_block(&mut self, block: &'a TzxBlock) {
        match block {
            TzxBlock::StandardSpeed(block) => {
                trace!("block #{}: {}, level: {}", self.next_block - 1, block, self.level);
                self.ep_iter = block.pulse_iter();
                self.pause = block.pause_pulse();
            }
            TzxBlock::Text(text) => {
                info!("{}", text);
            }
        }
    }
}

impl Iterator for TzxPulseIter<'_> {
    type Item = Pulse;

    fn next(&mut self) -> Option<Pulse> {
        loop {
            if let Some(duration) = self.ep_iter.next() {
                let level = self.level;
                self.level = !level;
                return Some(Pulse { level, duration })
            }
            if let Some(duration) = self.pause.take() {
                return Some(Pulse { level: self.level, duration })
            }
            let blocks = self.blocks;
            let block = blocks.get(self.next_block)?;
            self.next_block += 1;
            self.enter_block(block);
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.len();
        (len, Some(len))
    }
}

impl ExactSizeIterator for TzxPulseIter<'_> {
    fn len(&self) -> usize {
        let pending = self.ep_iter.len() + self.pause.is_some() as usize;
        self.blocks.get(self.next_block..).unwrap_or_default().iter().fold(pending, |len, block| {
            match block {
                TzxBlock::StandardSpeed(block) => {
                    len + standard_block_pulse_count(&block.data) + block.pause_pulse().is_some() as usize
                }
                TzxBlock::Text(..) => len
            }
        })
    }
}

impl FusedIterator for TzxPulseIter<'_> {}
