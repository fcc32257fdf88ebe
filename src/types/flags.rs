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

    src/types/flags.rs

    Defines common bitflags
*/
use bitflags::bitflags;

bitflags! {
    /// Bit flags recording why a track decode stopped early, or what limits it hit.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[rustfmt::skip]
    pub struct TrackFlags: u32 {
        #[doc = "The recovered bitstream reached the bit buffer capacity; remaining flux was dropped"]
        const TRUNCATED     = 0b0000_0000_0000_0001;
        #[doc = "The bitstream ended inside a header or data field"]
        const UNDERFLOW     = 0b0000_0000_0000_0010;
        #[doc = "The configured maximum sector count was reached with sector headers left unread"]
        const SECTOR_LIMIT  = 0b0000_0000_0000_0100;
        #[doc = "The caller's cancellation token was triggered"]
        const CANCELLED     = 0b0000_0000_0000_1000;
        #[doc = "The caller's deadline elapsed"]
        const DEADLINE      = 0b0000_0000_0001_0000;
    }
}
