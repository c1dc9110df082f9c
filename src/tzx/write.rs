/*
    Copyright (C) 2020-2022  Rafal Michalski

    This file is part of SPECTRUSTY, a Rust library for building emulators.

    For the full copyright notice, see the lib.rs file.
*/
use core::convert::TryFrom;
use std::io::{ErrorKind, Error, Write, Result};

use super::{SIGNATURE, HEADER_SIZE, TzxId, TzxFile, TzxBlock, StandardSpeedBlock, TextDescription};

/// Writes the whole `tzx` file to `wr`. Returns the number of bytes written.
///
/// Fails with [ErrorKind::InvalidInput] if any block's payload is too large to be expressed
/// by the block's size field. In this instance, some bytes may have already been written.
pub fn write_tzx<W: Write>(mut wr: W, tzx: &TzxFile) -> Result<usize> {
    wr.write_all(SIGNATURE)?;
    wr.write_all(&[tzx.major_revision, tzx.minor_revision])?;
    tzx.blocks.iter().try_fold(HEADER_SIZE, |size, block| {
        Ok(size + block.write_to(&mut wr)?)
    })
}

impl TzxFile {
    /// Returns the binary **TZX** image of this file.
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        let size = self.blocks.iter().map(TzxBlock::size).sum::<usize>() + HEADER_SIZE;
        let mut image = Vec::with_capacity(size);
        write_tzx(&mut image, self)?;
        Ok(image)
    }
}

impl TzxBlock {
    /// Writes this block, including its ID, to `wr`. Returns the number of bytes written.
    pub fn write_to<W: Write>(&self, wr: W) -> Result<usize> {
        match self {
            TzxBlock::StandardSpeed(block) => block.write_to(wr),
            TzxBlock::Text(text) => text.write_to(wr),
        }
    }
}

impl StandardSpeedBlock {
    /// Writes this block, including its ID, to `wr`. Returns the number of bytes written.
    pub fn write_to<W: Write>(&self, mut wr: W) -> Result<usize> {
        let size = u16::try_from(self.data.len()).map_err(|_|
            Error::new(ErrorKind::InvalidInput, "standard speed data block is larger than 65535 bytes")
        )?;
        wr.write_all(&[u8::from(TzxId::StandardSpeed)])?;
        wr.write_all(&self.pause_after_block_in_ms.to_le_bytes())?;
        wr.write_all(&size.to_le_bytes())?;
        wr.write_all(&self.data)?;
        Ok(5 + self.data.len())
    }
}

impl TextDescription {
    /// Writes this block, including its ID, to `wr`. Returns the number of bytes written.
    pub fn write_to<W: Write>(&self, mut wr: W) -> Result<usize> {
        let size = u8::try_from(self.text.len()).map_err(|_|
            Error::new(ErrorKind::InvalidInput, "text description is longer than 255 bytes")
        )?;
        wr.write_all(&[u8::from(TzxId::Text), size])?;
        wr.write_all(&self.text)?;
        Ok(2 + self.text.len())
    }
}
