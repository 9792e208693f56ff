//! Compression statistics: entropy, average code length and ratios

use crate::codec::CodeTable;
use crate::frequency::FrequencyMap;

/// Bits a symbol would take in a plain 8-bit encoding.
pub const PLAIN_BITS_PER_SYMBOL: u64 = 8;

/// Shannon entropy in bits per symbol.
pub fn shannon_entropy(freq: &FrequencyMap) -> f64 {
    let total = freq.total();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    freq.iter()
        .map(|(_, count)| {
            let p = count as f64 / total;
            -p * p.log2()
        })
        .sum()
}

/// Frequency-weighted mean code length in bits per symbol.
pub fn average_code_length(freq: &FrequencyMap, codes: &CodeTable) -> f64 {
    let total = freq.total();
    if total == 0 {
        return 0.0;
    }
    let bits: u64 = freq
        .iter()
        .map(|(symbol, count)| count * codes.get(symbol).map_or(0, |c| c.len() as u64))
        .sum();
    bits as f64 / total as f64
}

/// Payload bits over the 8-bits-per-symbol baseline.
pub fn ratio(payload_bits: usize, symbols: usize) -> f64 {
    if symbols == 0 {
        return 1.0;
    }
    payload_bits as f64 / (symbols as u64 * PLAIN_BITS_PER_SYMBOL) as f64
}

/// Percentage saved relative to the 8-bits-per-symbol baseline.
pub fn savings_percent(payload_bits: usize, symbols: usize) -> f64 {
    (1.0 - ratio(payload_bits, symbols)) * 100.0
}
