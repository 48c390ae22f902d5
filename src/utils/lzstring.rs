//! Decompression of obfuscator-embedded string tables.
//!
//! Obfuscated bundles ship their string table as a dictionary-coded blob packed into
//! UTF-16 code units, produced by the LZ-string `compressToUTF16` encoder. Each code
//! unit carries 15 data bits offset by 32 so the payload stays inside printable UTF-16
//! and survives being embedded in a script literal.
//!
//! # Stream Format
//!
//! The bit stream is read from a sliding 15-bit word: the current word is
//! `codeunit - 32`, bits are tested from the most significant slot bit (`2^14`)
//! downward, and multi-bit values accumulate those bits with increasing weight
//! (LSB-first). The stream opens with a 2-bit preamble selecting the width of the
//! first literal (0 → 8-bit, 1 → 16-bit, 2 → empty output). After the bootstrap the
//! decoder loops over variable-width codes:
//!
//! - code 0: an 8-bit literal follows
//! - code 1: a 16-bit literal follows
//! - code 2: end of data
//! - anything else: dictionary index, with the classic LZW `code == dictSize` edge
//!   case resolved as `w + w[0]`
//!
//! The code width starts at 3 bits and grows whenever the dictionary fills the
//! current width (`enlargeIn` countdown).
//!
//! # Failure Mode
//!
//! Malformed or truncated streams yield an empty string; the decoder never errors.
//! The pipeline treats an empty decompression as "no string table discovered".

/// Sentinel codes reserved at the bottom of the dictionary.
const CODE_LITERAL_8: usize = 0;
const CODE_LITERAL_16: usize = 1;
const CODE_END_OF_STREAM: usize = 2;

/// Bit mask of the most significant bit of a 15-bit slot.
const SLOT_MSB: i32 = 16384;

/// Offset added by the encoder to keep code units printable.
const CODE_UNIT_OFFSET: i32 = 32;

/// Reader over the packed bit stream.
///
/// `word` and `position` track the current 15-bit slot; `cursor` is the index of the
/// next code unit to load. Reads past the end of the data load zero words, and
/// `overrun` reports when that has happened so the caller can treat the stream as
/// truncated.
struct BitReader<'a> {
    data: &'a [u16],
    word: i32,
    position: i32,
    cursor: usize,
}

impl<'a> BitReader<'a> {
    fn new(data: &'a [u16]) -> Self {
        Self {
            data,
            word: i32::from(data[0]) - CODE_UNIT_OFFSET,
            position: SLOT_MSB,
            cursor: 1,
        }
    }

    fn read_bit(&mut self) -> bool {
        let bit = self.word & self.position != 0;
        self.position >>= 1;
        if self.position == 0 {
            self.position = SLOT_MSB;
            self.word = match self.data.get(self.cursor) {
                Some(&cu) => i32::from(cu) - CODE_UNIT_OFFSET,
                None => 0,
            };
            self.cursor += 1;
        }
        bit
    }

    /// Reads an unsigned `n`-bit value, accumulating bits LSB-first.
    fn read_bits(&mut self, n: u32) -> u32 {
        let mut value = 0u32;
        for weight in 0..n {
            if self.read_bit() {
                value |= 1 << weight;
            }
        }
        value
    }

    fn overrun(&self) -> bool {
        self.cursor > self.data.len()
    }
}

/// Decompresses a dictionary-coded UTF-16 payload back into the original string.
///
/// Returns an empty string for empty input, for streams that signal end-of-data
/// immediately, and for malformed or truncated streams. Never panics and never
/// returns an error; see the module docs for the stream format.
///
/// # Arguments
///
/// * `input` - The compressed payload exactly as it appears in the script literal.
///
/// # Examples
///
/// ```
/// use clearscript::utils::decompress_from_utf16;
///
/// assert_eq!(decompress_from_utf16(""), "");
/// ```
#[must_use]
pub fn decompress_from_utf16(input: &str) -> String {
    let data: Vec<u16> = input.encode_utf16().collect();
    if data.is_empty() {
        return String::new();
    }

    let mut reader = BitReader::new(&data);

    // Entries 0..2 are sentinels and never dereferenced; entry 3 is the first literal.
    let mut dictionary: Vec<Vec<u16>> = vec![Vec::new(), Vec::new(), Vec::new()];

    let first_width = match reader.read_bits(2) as usize {
        CODE_LITERAL_8 => 8,
        CODE_LITERAL_16 => 16,
        _ => return String::new(),
    };
    let first = reader.read_bits(first_width) as u16;

    let mut w = vec![first];
    dictionary.push(w.clone());
    let mut result = w.clone();

    let mut enlarge_in: u32 = 4;
    let mut num_bits: u32 = 3;

    loop {
        if reader.overrun() {
            return String::new();
        }

        let mut code = reader.read_bits(num_bits) as usize;
        match code {
            CODE_LITERAL_8 | CODE_LITERAL_16 => {
                let width = if code == CODE_LITERAL_8 { 8 } else { 16 };
                let literal = reader.read_bits(width) as u16;
                dictionary.push(vec![literal]);
                code = dictionary.len() - 1;
                enlarge_in -= 1;
            }
            CODE_END_OF_STREAM => return String::from_utf16_lossy(&result),
            _ => {}
        }

        if enlarge_in == 0 {
            enlarge_in = 1 << num_bits;
            num_bits += 1;
        }

        let entry = if code < dictionary.len() {
            dictionary[code].clone()
        } else if code == dictionary.len() {
            // LZW edge case: the code refers to the entry being built right now.
            let mut entry = w.clone();
            entry.push(w[0]);
            entry
        } else {
            return String::new();
        };

        result.extend_from_slice(&entry);

        let mut addition = w;
        addition.push(entry[0]);
        dictionary.push(addition);
        enlarge_in -= 1;

        if enlarge_in == 0 {
            enlarge_in = 1 << num_bits;
            num_bits += 1;
        }

        w = entry;
    }
}
