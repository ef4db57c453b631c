//! LZ2K decoder.
//!
//! A packed range is a run of chunks, each introduced by a 12-byte header
//! (`"LZ2K"`, unpacked size, packed size, little-endian). A chunk payload is
//! LZ77 over an 8 KiB window coded with static Huffman tables that are
//! re-sent every block, in the style of LHA `-lh5-`: bits are read MSB
//! first, and each block starts with its symbol count and three code tables
//! (code-length codes, literal/length codes, position codes).

use byteorder::{ByteOrder, LittleEndian};

use crate::error::CodecError;

pub const CHUNK_MAGIC: &[u8; 4] = b"LZ2K";
pub const CHUNK_HEADER_LEN: usize = 12;

const DICBIT: usize = 13;
const MAX_MATCH: usize = 256;
const THRESHOLD: usize = 3;
const MAX_CODE_LEN: usize = 16;

/// Literals 0..=255, then match lengths `THRESHOLD..=MAX_MATCH`.
const NC: usize = 255 + MAX_MATCH + 2 - THRESHOLD;
const CBIT: u32 = 9;

/// Position classes: class `j > 0` covers distances `2^(j-1)..2^j`.
const NP: usize = DICBIT + 1;
const PBIT: u32 = 4;

/// Code-length alphabet: lengths 0..=16 plus three zero-run codes.
const NT: usize = MAX_CODE_LEN + 3;
const TBIT: u32 = 5;
const TABLE_ZERO_RUN_AT: usize = 3;

type Result<T> = std::result::Result<T, CodecError>;

/// Decodes chunks from `input` until exactly `unpacked_size` bytes exist.
pub fn decompress(input: &[u8], unpacked_size: u32) -> Result<Vec<u8>> {
    let expected = unpacked_size as usize;
    let mut out = Vec::with_capacity(expected);
    let mut pos = 0;

    while out.len() < expected {
        if pos >= input.len() {
            return Err(CodecError::SizeMismatch {
                produced: out.len(),
                expected,
            });
        }
        pos = decompress_chunk(input, pos, &mut out, Some(expected))?;
    }

    tracing::debug!(
        consumed = pos,
        available = input.len(),
        produced = out.len(),
        "decompressed LZ2K"
    );

    Ok(out)
}

/// Decodes every chunk in `input`.
pub fn decompress_stream(input: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut pos = 0;

    while pos < input.len() {
        pos = decompress_chunk(input, pos, &mut out, None)?;
    }

    Ok(out)
}

/// Decodes the chunk at `pos` onto `out`, returning the offset just past it.
fn decompress_chunk(
    input: &[u8],
    pos: usize,
    out: &mut Vec<u8>,
    limit: Option<usize>,
) -> Result<usize> {
    let header = input
        .get(pos..pos + CHUNK_HEADER_LEN)
        .ok_or(CodecError::TruncatedChunk { offset: pos })?;

    if &header[..4] != CHUNK_MAGIC {
        let mut found = [0u8; 4];
        found.copy_from_slice(&header[..4]);
        return Err(CodecError::BadChunkMagic { offset: pos, found });
    }

    let unpacked = LittleEndian::read_u32(&header[4..8]) as usize;
    let packed = LittleEndian::read_u32(&header[8..12]) as usize;

    let start = pos + CHUNK_HEADER_LEN;
    let end = start
        .checked_add(packed)
        .filter(|end| *end <= input.len())
        .ok_or(CodecError::InputOverrun {
            consumed: start.saturating_add(packed),
            available: input.len(),
        })?;

    if let Some(limit) = limit {
        if out.len() + unpacked > limit {
            return Err(CodecError::OutputOverrun {
                wanted: out.len() + unpacked,
                size: limit,
            });
        }
    }

    tracing::trace!(
        offset = format_args!("{:#x}", pos),
        packed,
        unpacked,
        "decoding LZ2K chunk"
    );

    Decoder::new(&input[start..end]).run(out, unpacked)?;
    Ok(end)
}

/// MSB-first bit reader. Reads past the end yield zero bits; the caller
/// checks [`BitReader::check_overrun`] once the chunk is done.
struct BitReader<'a> {
    data: &'a [u8],
    next: usize,
    buf: u32,
    count: u32,
    consumed: usize,
}

impl<'a> BitReader<'a> {
    fn new(data: &'a [u8]) -> BitReader<'a> {
        BitReader {
            data,
            next: 0,
            buf: 0,
            count: 0,
            consumed: 0,
        }
    }

    #[inline(always)]
    fn refill(&mut self) {
        while self.count <= 24 {
            let byte = self.data.get(self.next).copied().unwrap_or(0);
            self.next += 1;
            self.buf |= u32::from(byte) << (24 - self.count);
            self.count += 8;
        }
    }

    /// The next `n` bits (1..=16) without consuming them.
    #[inline(always)]
    fn peek(&mut self, n: u32) -> u32 {
        self.refill();
        self.buf >> (32 - n)
    }

    #[inline(always)]
    fn skip(&mut self, n: u32) {
        self.refill();
        self.buf <<= n;
        self.count -= n;
        self.consumed += n as usize;
    }

    #[inline(always)]
    fn bits(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        let value = self.peek(n);
        self.skip(n);
        value
    }

    fn check_overrun(&self) -> Result<()> {
        let consumed = (self.consumed + 7) / 8;
        if consumed > self.data.len() {
            return Err(CodecError::InputOverrun {
                consumed,
                available: self.data.len(),
            });
        }
        Ok(())
    }
}

/// A canonical Huffman code, or the degenerate one-symbol code which
/// consumes no bits at all.
#[derive(Debug)]
enum Huffman {
    Single(u16),
    Canonical {
        counts: [u16; MAX_CODE_LEN + 1],
        symbols: Vec<u16>,
    },
}

impl Huffman {
    fn single(symbol: u32, alphabet: usize) -> Result<Huffman> {
        if symbol as usize >= alphabet {
            return Err(CodecError::BadTable("single symbol outside alphabet"));
        }
        Ok(Huffman::Single(symbol as u16))
    }

    /// Codes are assigned shortest first, then by symbol value.
    fn from_lengths(lengths: &[u8]) -> Result<Huffman> {
        let mut counts = [0u16; MAX_CODE_LEN + 1];
        for &len in lengths {
            let len = len as usize;
            if len > MAX_CODE_LEN {
                return Err(CodecError::BadTable("code length over 16 bits"));
            }
            counts[len] += 1;
        }
        counts[0] = 0;

        let space: u32 = (1..=MAX_CODE_LEN)
            .map(|len| u32::from(counts[len]) << (MAX_CODE_LEN - len))
            .sum();
        if space != 0 && space != 1 << MAX_CODE_LEN {
            return Err(CodecError::BadTable("incomplete or oversubscribed code"));
        }

        let mut symbols = Vec::with_capacity(lengths.len());
        for len in 1..=MAX_CODE_LEN {
            symbols.extend(
                lengths
                    .iter()
                    .enumerate()
                    .filter(|(_, l)| **l as usize == len)
                    .map(|(symbol, _)| symbol as u16),
            );
        }

        Ok(Huffman::Canonical { counts, symbols })
    }

    fn decode(&self, bits: &mut BitReader<'_>) -> Result<u16> {
        let (counts, symbols) = match self {
            Huffman::Single(symbol) => return Ok(*symbol),
            Huffman::Canonical { counts, symbols } => (counts, symbols),
        };

        let window = bits.peek(MAX_CODE_LEN as u32);
        let mut code = 0u32;
        let mut first = 0u32;
        let mut index = 0u32;

        for len in 1..=MAX_CODE_LEN {
            code |= (window >> (MAX_CODE_LEN - len)) & 1;
            let count = u32::from(counts[len]);
            if code < first + count {
                bits.skip(len as u32);
                return Ok(symbols[(index + code - first) as usize]);
            }
            index += count;
            first = (first + count) << 1;
            code <<= 1;
        }

        Err(CodecError::BadTable("code not in table"))
    }
}

struct Decoder<'a> {
    bits: BitReader<'a>,
    block_remaining: u32,
    literals: Huffman,
    positions: Huffman,
}

impl<'a> Decoder<'a> {
    fn new(data: &'a [u8]) -> Decoder<'a> {
        Decoder {
            bits: BitReader::new(data),
            block_remaining: 0,
            literals: Huffman::Single(0),
            positions: Huffman::Single(0),
        }
    }

    fn run(mut self, out: &mut Vec<u8>, size: usize) -> Result<()> {
        let chunk_start = out.len();
        let end = chunk_start + size;

        while out.len() < end {
            let symbol = self.next_symbol()? as usize;
            if symbol <= u8::MAX as usize {
                out.push(symbol as u8);
                continue;
            }

            let length = symbol - (u8::MAX as usize + 1 - THRESHOLD);
            let distance = self.next_distance()? + 1;
            let produced = out.len() - chunk_start;
            if distance > produced {
                return Err(CodecError::BadDistance { distance, produced });
            }
            if out.len() + length > end {
                return Err(CodecError::OutputOverrun {
                    wanted: produced + length,
                    size,
                });
            }

            // Byte at a time: the source may overlap what is being written.
            let from = out.len() - distance;
            for i in 0..length {
                let byte = out[from + i];
                out.push(byte);
            }
        }

        self.bits.check_overrun()
    }

    fn next_symbol(&mut self) -> Result<u16> {
        if self.block_remaining == 0 {
            self.read_block_header()?;
        }
        self.block_remaining -= 1;
        self.literals.decode(&mut self.bits)
    }

    fn next_distance(&mut self) -> Result<usize> {
        let class = u32::from(self.positions.decode(&mut self.bits)?);
        if class == 0 {
            return Ok(0);
        }
        Ok(((1 << (class - 1)) + self.bits.bits(class - 1)) as usize)
    }

    fn read_block_header(&mut self) -> Result<()> {
        self.block_remaining = self.bits.bits(16);
        if self.block_remaining == 0 {
            return Err(CodecError::BadTable("empty block"));
        }

        let code_lengths = self.read_table_lengths(NT, TBIT, Some(TABLE_ZERO_RUN_AT))?;
        self.literals = self.read_literal_lengths(&code_lengths)?;
        self.positions = self.read_table_lengths(NP, PBIT, None)?;
        Ok(())
    }

    /// Reads the code-length or position table. Lengths are 3 bits, with 7
    /// extended by a unary run of 1 bits.
    fn read_table_lengths(
        &mut self,
        alphabet: usize,
        nbit: u32,
        zero_run_at: Option<usize>,
    ) -> Result<Huffman> {
        let n = self.bits.bits(nbit) as usize;
        if n == 0 {
            return Huffman::single(self.bits.bits(nbit), alphabet);
        }
        if n > alphabet {
            return Err(CodecError::BadTable("too many table lengths"));
        }

        let mut lengths = vec![0u8; alphabet];
        let mut i = 0;
        while i < n {
            let mut len = self.bits.bits(3);
            if len == 7 {
                while self.bits.bits(1) == 1 {
                    len += 1;
                    if len as usize > MAX_CODE_LEN {
                        return Err(CodecError::BadTable("code length over 16 bits"));
                    }
                }
            }
            lengths[i] = len as u8;
            i += 1;

            if Some(i) == zero_run_at {
                i += self.bits.bits(2) as usize;
                if i > alphabet {
                    return Err(CodecError::BadTable("zero run past end of table"));
                }
            }
        }

        Huffman::from_lengths(&lengths)
    }

    /// Reads literal/length code lengths, themselves Huffman coded with
    /// `code_lengths`. Symbols 0..=2 are zero runs of 1, 3..=18 and 20..=531.
    fn read_literal_lengths(&mut self, code_lengths: &Huffman) -> Result<Huffman> {
        let n = self.bits.bits(CBIT) as usize;
        if n == 0 {
            return Huffman::single(self.bits.bits(CBIT), NC);
        }
        if n > NC {
            return Err(CodecError::BadTable("too many literal lengths"));
        }

        let mut lengths = vec![0u8; NC];
        let mut i = 0;
        while i < n {
            match code_lengths.decode(&mut self.bits)? {
                0 => i += 1,
                1 => i += self.bits.bits(4) as usize + 3,
                2 => i += self.bits.bits(CBIT) as usize + 20,
                len => {
                    lengths[i] = (len - 2) as u8;
                    i += 1;
                }
            }
            if i > NC {
                return Err(CodecError::BadTable("zero run past end of table"));
            }
        }

        Huffman::from_lengths(&lengths)
    }
}
