/*
    FluxFox
    https://github.com/dbalsom/fluxfox

    Copyright 2024 Daniel Balsom

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------

    src/types/chs.rs

    Sector address types
*/
use std::fmt::Display;

use crate::MAXIMUM_SECTOR_SIZE;

/// The address of a sector as recorded in its header: cylinder, head, sector id and size code.
///
/// GCR formats have no size code. Their sectors are always 256 bytes, so they are reported with
/// `n == 1`. Commodore and Apple headers carry no head number either; `h` is always 0 for them.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SectorId {
    c: u16,
    h: u8,
    s: u8,
    n: u8,
}

impl From<(u16, u8, u8, u8)> for SectorId {
    fn from((c, h, s, n): (u16, u8, u8, u8)) -> Self {
        Self { c, h, s, n }
    }
}

impl From<SectorId> for (u16, u8, u8, u8) {
    fn from(id: SectorId) -> Self {
        (id.c, id.h, id.s, id.n)
    }
}

impl Display for SectorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[c:{} h:{} s:{} n:{}]", self.c, self.h, self.s, self.n)
    }
}

impl SectorId {
    pub fn new(c: u16, h: u8, s: u8, n: u8) -> Self {
        Self { c, h, s, n }
    }
    pub fn c(&self) -> u16 {
        self.c
    }
    pub fn h(&self) -> u8 {
        self.h
    }
    pub fn s(&self) -> u8 {
        self.s
    }
    pub fn n(&self) -> u8 {
        self.n
    }
    /// Return the size of the 'n' parameter in bytes.
    pub fn n_size(&self) -> usize {
        Self::n_to_bytes(self.n)
    }

    /// The formula for calculating size from n is (128 * 2^n).
    /// We enforce a maximum size of 8192 bytes for a single sector.
    pub fn n_to_bytes(n: u8) -> usize {
        if n > 6 {
            MAXIMUM_SECTOR_SIZE
        }
        else {
            std::cmp::min(MAXIMUM_SECTOR_SIZE, 128usize << n)
        }
    }

    pub fn bytes_to_n(size: usize) -> u8 {
        let mut n = 0;
        let mut size = size;
        while size > 128 {
            size >>= 1;
            n += 1;
        }
        n
    }
}
