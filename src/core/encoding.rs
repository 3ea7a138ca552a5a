use thiserror::Error;

/// Switch to code set C while in B.
const CODE_C: u8 = 99;
/// Switch to code set B while in C.
const CODE_B: u8 = 100;
const START_B: u8 = 104;
const START_C: u8 = 105;
const STOP: u8 = 106;
const CHECKSUM_MODULUS: u32 = 103;

/// Bar/space widths for every Code128 value, bar first.
/// Values 0..=102 are data/shift symbols, 103..=105 the start codes, 106 the stop code.
#[rustfmt::skip]
const PATTERNS: [&str; 107] = [
    "212222", "222122", "222221", "121223", "121322", "131222", "122213", "122312",
    "132212", "221213", "221312", "231212", "112232", "122132", "122231", "113222",
    "123122", "123221", "223211", "221132", "221231", "213212", "223112", "312131",
    "311222", "321122", "321221", "312212", "322112", "322211", "212123", "212321",
    "232121", "111323", "131123", "131321", "112313", "132113", "132311", "211313",
    "231113", "231311", "112133", "112331", "132131", "113123", "113321", "133121",
    "313121", "211331", "231131", "213113", "213311", "213131", "311123", "311321",
    "331121", "312113", "312311", "332111", "314111", "221411", "431111", "111224",
    "111422", "121124", "121421", "141122", "141221", "112214", "112412", "122114",
    "122411", "142112", "142211", "241211", "221114", "413111", "241112", "134111",
    "111242", "121142", "121241", "114212", "124112", "124211", "411212", "421112",
    "421211", "212141", "214121", "412121", "111143", "111341", "131141", "114113",
    "114311", "411113", "411311", "113141", "114131", "311141", "411131", "211412",
    "211214", "211232", "2331112",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("cannot encode an empty string")]
    Empty,
    #[error("unsupported character: '{0}' (U+{1:04X})")]
    Unsupported(char, u32),
}

/// Code128 code sets used by the encoder. Code set A (control characters) is never selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeSet {
    /// Printable ASCII, one character per symbol.
    B,
    /// Digit pairs, two characters per symbol.
    C,
}

/// An encoded linear symbol: the source text and its symbol values,
/// including start code, checksum and stop code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    text: String,
    values: Vec<u8>,
}

impl Symbol {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn values(&self) -> &[u8] {
        &self.values
    }

    pub fn start_set(&self) -> CodeSet {
        if self.values.first() == Some(&START_C) {
            CodeSet::C
        } else {
            CodeSet::B
        }
    }

    pub fn checksum(&self) -> u8 {
        self.values[self.values.len() - 2]
    }

    /// Module pattern from the first bar of the start code to the last bar of the stop code.
    /// `true` marks a dark module.
    pub fn modules(&self) -> Vec<bool> {
        let mut out = Vec::with_capacity(self.module_count());
        for value in &self.values {
            for (idx, width) in PATTERNS[*value as usize].bytes().enumerate() {
                let dark = idx % 2 == 0;
                for _ in 0..(width - b'0') {
                    out.push(dark);
                }
            }
        }
        out
    }

    pub fn module_count(&self) -> usize {
        self.values
            .iter()
            .map(|v| pattern_width(PATTERNS[*v as usize]))
            .sum()
    }
}

pub trait BarcodeEncoding {
    fn name(&self) -> &'static str;
    fn encode(&self, text: &str) -> Result<Symbol, EncodeError>;
    fn is_supported(&self, text: &str) -> bool {
        self.encode(text).is_ok()
    }
}

/// Code128 encoder switching between code sets B and C.
///
/// Selection rules:
/// - start in C when the data opens with 4+ digits or is exactly two digits, otherwise B;
/// - in B, switch to C for a digit run of 6+, or 4+ when the run ends the data;
///   an odd run emits its first digit in B before switching;
/// - in C, emit digit pairs while two digits remain, then fall back to B.
#[derive(Debug, Default, Clone, Copy)]
pub struct Code128Encoder;

impl Code128Encoder {
    pub fn new() -> Self {
        Self
    }
}

impl BarcodeEncoding for Code128Encoder {
    fn name(&self) -> &'static str {
        "Code128"
    }

    fn encode(&self, text: &str) -> Result<Symbol, EncodeError> {
        if text.is_empty() {
            return Err(EncodeError::Empty);
        }
        let mut bytes = Vec::with_capacity(text.len());
        for ch in text.chars() {
            if !(' '..='\u{7f}').contains(&ch) {
                return Err(EncodeError::Unsupported(ch, ch as u32));
            }
            bytes.push(ch as u8);
        }

        let mut set = initial_set(&bytes);
        let mut values = vec![match set {
            CodeSet::B => START_B,
            CodeSet::C => START_C,
        }];

        let mut i = 0;
        while i < bytes.len() {
            let run = digit_run(&bytes[i..]);
            match set {
                CodeSet::C if run >= 2 => {
                    values.push((bytes[i] - b'0') * 10 + (bytes[i + 1] - b'0'));
                    i += 2;
                }
                CodeSet::C => {
                    values.push(CODE_B);
                    set = CodeSet::B;
                }
                CodeSet::B if run >= 6 || (run >= 4 && i + run == bytes.len()) => {
                    if run % 2 == 1 {
                        values.push(bytes[i] - b' ');
                        i += 1;
                    }
                    values.push(CODE_C);
                    set = CodeSet::C;
                }
                CodeSet::B => {
                    values.push(bytes[i] - b' ');
                    i += 1;
                }
            }
        }

        values.push(checksum(&values));
        values.push(STOP);
        Ok(Symbol {
            text: text.to_string(),
            values,
        })
    }
}

fn initial_set(bytes: &[u8]) -> CodeSet {
    let run = digit_run(bytes);
    if run >= 4 || (run == 2 && bytes.len() == 2) {
        CodeSet::C
    } else {
        CodeSet::B
    }
}

fn digit_run(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Weighted modulo-103 check value; the start code carries weight 1, as does the first data symbol.
fn checksum(values: &[u8]) -> u8 {
    let sum = values
        .iter()
        .enumerate()
        .map(|(pos, v)| (pos.max(1) as u32) * (*v as u32))
        .sum::<u32>();
    (sum % CHECKSUM_MODULUS) as u8
}

fn pattern_width(pattern: &str) -> usize {
    pattern.bytes().map(|b| (b - b'0') as usize).sum()
}
