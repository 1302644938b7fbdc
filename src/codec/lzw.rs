//! Entry-local LZW codec with a fixed, per-entry dictionary width `W`.
//!
//! Codes are packed LSB-first: the first code occupies the low `W` bits of
//! the first output byte, with overflow spilling into subsequent bytes.
//! The dictionary resets to the 256 singletons whenever it reaches
//! `2^W - 1` live entries, in both the encoder and the decoder, so both
//! sides reset at the same logical position without needing to signal it.

use crate::error::{ArchiveError, Result};
use std::collections::HashMap;
use std::io::{Read, Write};

/// `codec_param` -> dictionary width in bits, per the fixed mapping table.
const WIDTH_TABLE: [(u8, u32); 10] = [
    (0, 9),
    (1, 10),
    (2, 11),
    (3, 13),
    (4, 14),
    (5, 16),
    (6, 18),
    (7, 21),
    (8, 24),
    (9, 26),
];

pub fn width_for_param(param: u8) -> Result<u32> {
    WIDTH_TABLE
        .iter()
        .find(|(p, _)| *p == param)
        .map(|(_, w)| *w)
        .ok_or(ArchiveError::UnknownCodec {
            codec_id: 1,
            codec_param: param,
        })
}

struct DictLimits {
    w: u32,
    dict_size: u32,
    invalid: u32,
}

impl DictLimits {
    fn new(param: u8) -> Result<Self> {
        let w = width_for_param(param)?;
        let dict_size = 1u32 << w;
        Ok(Self {
            w,
            dict_size,
            invalid: dict_size - 1,
        })
    }
}

/// LZW compressor bound to a sink, fixed to a single entry's dictionary
/// width. The archive calls `compress` exactly once per entry (covering
/// the whole payload) followed by `finish`, matching the original
/// single-pass encoder this codec is modeled on.
pub struct LzwCompressor<W: Write> {
    sink: W,
    limits: DictLimits,
    dict: HashMap<(u32, u8), u32>,
    bit_buf: u64,
    bit_count: u32,
    cur: u32,
}

impl<W: Write> LzwCompressor<W> {
    pub fn new(sink: W, codec_param: u8) -> Result<Self> {
        let limits = DictLimits::new(codec_param)?;
        let mut me = Self {
            sink,
            limits,
            dict: HashMap::new(),
            bit_buf: 0,
            bit_count: 0,
            cur: 0,
        };
        me.reset_dictionary();
        me.cur = me.limits.invalid;
        Ok(me)
    }

    fn reset_dictionary(&mut self) {
        self.dict.clear();
        for i in 0u32..256 {
            self.dict.insert((self.limits.invalid, i as u8), i);
        }
    }

    fn write_code(&mut self, code: u32) -> Result<()> {
        self.bit_buf |= (code as u64) << self.bit_count;
        self.bit_count += self.limits.w;
        while self.bit_count >= 8 {
            let byte = (self.bit_buf & 0xFF) as u8;
            self.sink.write_all(&[byte])?;
            self.bit_buf >>= 8;
            self.bit_count -= 8;
        }
        Ok(())
    }

    /// Consume exactly `n` bytes of input, emitting LZW codes.
    pub fn compress(&mut self, input: &mut impl Read, n: u64) -> Result<()> {
        let dict_max = self.limits.dict_size - 1;
        let mut byte = [0u8; 1];
        for _ in 0..n {
            input.read_exact(&mut byte)?;
            let b = byte[0];

            if self.dict.len() as u32 == dict_max {
                self.reset_dictionary();
            }

            let key = (self.cur, b);
            if let Some(&code) = self.dict.get(&key) {
                self.cur = code;
            } else {
                let new_code = self.dict.len() as u32;
                self.dict.insert(key, new_code);
                self.write_code(self.cur)?;
                self.cur = b as u32;
            }
        }

        if self.cur != self.limits.invalid {
            self.write_code(self.cur)?;
            self.cur = self.limits.invalid;
        }
        Ok(())
    }

    /// Flush any pending sub-byte residue and return the sink.
    pub fn finish(mut self) -> Result<W> {
        if self.bit_count > 0 {
            let byte = (self.bit_buf & 0xFF) as u8;
            self.sink.write_all(&[byte])?;
            self.bit_buf = 0;
            self.bit_count = 0;
        }
        Ok(self.sink)
    }
}

/// LZW decompressor bound to a sink, mirroring `LzwCompressor`'s reset
/// schedule exactly so both sides stay in lockstep.
pub struct LzwDecompressor<W: Write> {
    sink: W,
    limits: DictLimits,
    dict: Vec<(u32, u8)>,
    bit_buf: u64,
    bit_count: u32,
    prev: u32,
}

impl<W: Write> LzwDecompressor<W> {
    pub fn new(sink: W, codec_param: u8) -> Result<Self> {
        let limits = DictLimits::new(codec_param)?;
        let mut me = Self {
            sink,
            limits,
            dict: Vec::new(),
            bit_buf: 0,
            bit_count: 0,
            prev: 0,
        };
        me.reset_dictionary();
        me.prev = me.limits.invalid;
        Ok(me)
    }

    fn reset_dictionary(&mut self) {
        self.dict.clear();
        self.dict.reserve(256);
        for i in 0u32..256 {
            self.dict.push((self.limits.invalid, i as u8));
        }
    }

    fn first_byte(&self, mut code: u32) -> u8 {
        loop {
            let (prefix, byte) = self.dict[code as usize];
            if prefix == self.limits.invalid {
                return byte;
            }
            code = prefix;
        }
    }

    fn string_for(&self, mut code: u32, out: &mut Vec<u8>) {
        out.clear();
        while code != self.limits.invalid {
            let (prefix, byte) = self.dict[code as usize];
            out.push(byte);
            code = prefix;
        }
        out.reverse();
    }

    fn read_code(&mut self, input: &mut impl Read, remaining: &mut u64) -> Result<Option<u32>> {
        if *remaining == 0 {
            return Ok(None);
        }
        while self.bit_count < self.limits.w {
            if *remaining == 0 {
                return Err(ArchiveError::Corrupted(
                    "LZW stream truncated mid-code".into(),
                ));
            }
            let mut byte = [0u8; 1];
            input.read_exact(&mut byte)?;
            *remaining -= 1;
            self.bit_buf |= (byte[0] as u64) << self.bit_count;
            self.bit_count += 8;
        }
        let mask = (1u64 << self.limits.w) - 1;
        let code = (self.bit_buf & mask) as u32;
        self.bit_buf >>= self.limits.w;
        self.bit_count -= self.limits.w;
        Ok(Some(code))
    }

    /// Consume exactly `n` compressed bytes from `input`, writing the
    /// decompressed byte stream to the sink.
    pub fn decompress(&mut self, input: &mut impl Read, n: u64) -> Result<()> {
        let dict_max = self.limits.dict_size - 1;
        let mut remaining = n;
        let mut tmp = Vec::with_capacity(64);

        while let Some(code) = self.read_code(input, &mut remaining)? {
            if self.dict.len() as u32 == dict_max {
                self.reset_dictionary();
            }

            let size = self.dict.len() as u32;
            if code > size {
                return Err(ArchiveError::Corrupted("invalid LZW code".into()));
            }

            if code == size {
                let first = self.first_byte(self.prev);
                self.dict.push((self.prev, first));
                self.string_for(code, &mut tmp);
            } else {
                self.string_for(code, &mut tmp);
                if self.prev != self.limits.invalid {
                    let first = tmp[0];
                    self.dict.push((self.prev, first));
                }
            }

            self.sink.write_all(&tmp)?;
            self.prev = code;
        }
        Ok(())
    }

    /// Any unread bits must be zero padding; anything else is corruption.
    pub fn finish(self) -> Result<W> {
        if self.bit_buf != 0 {
            return Err(ArchiveError::Corrupted(
                "nonzero residual bits at end of LZW stream".into(),
            ));
        }
        Ok(self.sink)
    }
}
