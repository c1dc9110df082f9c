/*
    Copyright (C) 2020-2022  Rafal Michalski

    This file is part of SPECTRUSTY, a Rust library for building emulators.

    SPECTRUSTY is free software: you can redistribute it and/or modify it under
    the terms of the GNU Lesser General Public License (LGPL) as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    SPECTRUSTY is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Lesser General Public License for more details.

    You should have received a copy of the GNU Lesser General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.

    Author contact information: see Cargo.toml file, section [package.authors].
*/
//! **TZX** tape image parser and *TAPE* pulse generator of the SPECTRUSTY library.
//!
//! * [tzx] parses **TZX** images into a list of blocks and turns them into a stream of
//!   leveled T-state pulse intervals.
//! * [pulse] encodes raw data bytes as *TAPE* pulse intervals matching the timing expected
//!   by ZX Spectrum's ROM loading routines.
// http://www.worldofspectrum.org/TZXformat.html
pub mod pulse;
pub mod tzx;
