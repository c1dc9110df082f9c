/*
    Copyright (C) 2020-2022  Rafal Michalski

    This file is part of SPECTRUSTY, a Rust library for building emulators.

    For the full copyright notice, see the lib.rs file.
*/
use core::convert::TryFrom;
use core::fmt;
use std::io;

#[allow(unused_imports)]
use log::{error, warn, info, debug, trace};

use nom::bytes::complete::take;
use nom::combinator::map;
use nom::error::{context, ContextError, ErrorKind, ParseError};
use nom::number::complete::{le_u16, le_u8};
use nom::{Err, IResult, Offset};

use super::{SIGNATURE, TzxId, TzxFile, TzxBlock, StandardSpeedBlock, TextDescription};

/// The type of the error returned by the **TZX** file parser.
///
/// Every variant carries the byte offset in the parsed image at which the problem was found.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormatError {
    /// The image doesn't start with [SIGNATURE].
    Signature {
        /// The bytes found in place of the signature.
        found: Box<[u8]>
    },
    /// A block ID that can't be parsed was found at a block boundary.
    UnsupportedBlock {
        /// The block ID.
        id: u8,
        /// The offset of the block ID.
        offset: usize
    },
    /// The image ends before the declared end of a field.
    Truncated {
        /// The offset where the incomplete field begins.
        offset: usize,
        /// The name of the incomplete field.
        field: &'static str,
        /// How many bytes were left in the image at `offset`.
        available: usize
    },
}

impl FormatError {
    /// Returns the offset in bytes of the malformed part of the image.
    pub fn offset(&self) -> usize {
        match *self {
            FormatError::Signature {..} => 0,
            FormatError::UnsupportedBlock { offset, .. } |
            FormatError::Truncated { offset, .. } => offset
        }
    }
    /// Returns the expected signature. It's always [SIGNATURE].
    pub fn expected_signature(&self) -> &'static [u8;8] {
        SIGNATURE
    }
}

impl std::error::Error for FormatError {}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::Signature { found } => {
                write!(f, "not a TZX file: expected signature \"{}\", found \"{}\"",
                    SIGNATURE.escape_ascii(), found.escape_ascii())
            }
            &FormatError::UnsupportedBlock { id, offset } => {
                write!(f, "unsupported TZX block ID 0x{:02x} at byte {}", id, offset)?;
                if let Ok(tzx_id) = TzxId::try_from(id) {
                    write!(f, " ({})", tzx_id)?;
                }
                Ok(())
            }
            &FormatError::Truncated { offset, field, available } => {
                write!(f, "truncated TZX data at byte {}: not enough bytes for {}, {} remaining",
                    offset, field, available)
            }
        }
    }
}

/// Parses given `image` and returns a [TzxFile] on success.
///
/// The whole image must consist of the header and complete, supported blocks.
pub fn parse_tzx(image: &[u8]) -> Result<TzxFile, FormatError> {
    tzx_file(image)
        .map(|(_, tzx)| tzx)
        .map_err(|err| {
            let err = FormatError::from_nom(image, err);
            debug!("TZX parse error: {}", err);
            err
        })
}

/// Reads data from `rd`, parses data and returns a [TzxFile] on success.
/// When there was a parse error returns `Err` with [FormatError] wrapped in [io::Error]
/// with [io::ErrorKind::InvalidData]. To get to the inner [FormatError] you need either
/// to downcast it yourself or use one of convenient [IoErrorExt] methods.
pub fn read_tzx<R: io::Read>(
        mut rd: R
    ) -> io::Result<TzxFile>
{
    let mut data = Vec::new();
    rd.read_to_end(&mut data)?;
    parse_tzx(&data).map_err(|e|
        io::Error::new(io::ErrorKind::InvalidData, e)
    )
}

/// A trait with helpers for extracting [FormatError] from [io::Error].
pub trait IoErrorExt: Sized {
    fn is_tzx_format(&self) -> bool {
        self.tzx_format_ref().is_some()
    }
    fn into_tzx_format(self) -> Option<Box<FormatError>>;
    fn tzx_format_ref(&self) -> Option<&FormatError>;
}

impl IoErrorExt for io::Error {
    fn into_tzx_format(self) -> Option<Box<FormatError>> {
        if let Some(inner) = self.into_inner() {
            if let Ok(err) = inner.downcast::<FormatError>() {
                return Some(err)
            }
        }
        None
    }
    fn tzx_format_ref(&self) -> Option<&FormatError> {
        self.get_ref().and_then(|inner| inner.downcast_ref::<FormatError>())
    }
}

/****************************************************************************/
/*                        OM NOM NOM NOM NOM NOM NOM                        */
/****************************************************************************/
#[derive(Clone, Debug, PartialEq)]
enum TzxNomError<'a> {
    Eof { input: &'a [u8], field: Option<&'static str> },
    Signature { found: &'a [u8] },
    BlockId { input: &'a [u8], id: u8 },
}

type PResult<'a, O> = IResult<&'a [u8], O, TzxNomError<'a>>;

impl<'a> ParseError<&'a [u8]> for TzxNomError<'a> {
    fn from_error_kind(input: &'a [u8], _kind: ErrorKind) -> Self {
        TzxNomError::Eof { input, field: None }
    }

    fn append(_input: &'a [u8], _kind: ErrorKind, other: Self) -> Self {
        other
    }
}

impl<'a> ContextError<&'a [u8]> for TzxNomError<'a> {
    // the innermost context names the field
    fn add_context(input: &'a [u8], ctx: &'static str, other: Self) -> Self {
        match other {
            TzxNomError::Eof { field: None, .. } => TzxNomError::Eof { input, field: Some(ctx) },
            other => other
        }
    }
}

impl FormatError {
    fn from_nom(raw: &[u8], err: Err<TzxNomError<'_>>) -> Self {
        let err = match err {
            Err::Error(e)|Err::Failure(e) => e,
            Err::Incomplete(..) => return FormatError::Truncated {
                offset: raw.len(), field: "block", available: 0
            }
        };
        match err {
            TzxNomError::Eof { input, field } => FormatError::Truncated {
                offset: raw.offset(input),
                field: field.unwrap_or("block"),
                available: input.len()
            },
            TzxNomError::Signature { found } => FormatError::Signature { found: found.into() },
            TzxNomError::BlockId { input, id } => FormatError::UnsupportedBlock {
                id, offset: raw.offset(input)
            }
        }
    }
}

fn byte_field<'a>(field: &'static str, inp: &'a [u8]) -> PResult<'a, u8> {
    context(field, le_u8)(inp)
}

fn word_field<'a>(field: &'static str, inp: &'a [u8]) -> PResult<'a, u16> {
    context(field, le_u16)(inp)
}

fn bytes_field<'a>(field: &'static str, count: usize, inp: &'a [u8]) -> PResult<'a, &'a [u8]> {
    context(field, take(count))(inp)
}

fn signature(inp: &[u8]) -> PResult<'_, &[u8]> {
    let len = SIGNATURE.len().min(inp.len());
    if inp[..len] != SIGNATURE[..len] {
        return Err(Err::Failure(TzxNomError::Signature { found: &inp[..len] }))
    }
    bytes_field("signature", SIGNATURE.len(), inp)
}

fn header(inp: &[u8]) -> PResult<'_, (u8, u8)> {
    let (inp, _) = signature(inp)?;
    let (inp, major) = byte_field("major revision", inp)?;
    let (inp, minor) = byte_field("minor revision", inp)?;
    Ok((inp, (major, minor)))
}

fn standard_speed_block(inp: &[u8]) -> PResult<'_, StandardSpeedBlock> {
    let (inp, pause_after_block_in_ms) = word_field("pause after block", inp)?;
    let (inp, data_size) = word_field("data length", inp)?;
    let (inp, data) = bytes_field("data", data_size.into(), inp)?;
    Ok((inp, StandardSpeedBlock { pause_after_block_in_ms, data: data.into() }))
}

fn text_description(inp: &[u8]) -> PResult<'_, TextDescription> {
    let (inp, text_size) = byte_field("text length", inp)?;
    let (inp, text) = bytes_field("text", text_size.into(), inp)?;
    Ok((inp, TextDescription { text: text.into() }))
}

fn block(inp: &[u8]) -> PResult<'_, TzxBlock> {
    let (rest, id) = byte_field("block ID", inp)?;
    match TzxId::try_from(id) {
        Ok(TzxId::StandardSpeed) => map(standard_speed_block, TzxBlock::StandardSpeed)(rest),
        Ok(TzxId::Text) => map(text_description, TzxBlock::Text)(rest),
        _ => Err(Err::Failure(TzxNomError::BlockId { input: inp, id }))
    }
}

fn tzx_file(raw: &[u8]) -> PResult<'_, TzxFile> {
    let (mut inp, (major_revision, minor_revision)) = header(raw)?;
    debug!("TZX revision: {}.{:02}", major_revision, minor_revision);
    let mut blocks = Vec::new();
    while !inp.is_empty() {
        let (rest, block) = block(inp)?;
        debug!("block #{} at {}: {}", blocks.len(), raw.offset(inp), block);
        blocks.push(block);
        inp = rest;
    }
    Ok((inp, TzxFile { major_revision, minor_revision, blocks }))
}
