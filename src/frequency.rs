//! Symbol frequency analysis

use std::collections::HashMap;

use crate::error::CompressError;

/// Symbol counts in first-seen order.
///
/// The order is what the tree builder uses to break weight ties, so two
/// analyses of the same text always produce the same tree. The running total
/// always fits in a `u64`, so no merge of tree weights built from the map can
/// overflow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyMap {
    entries: Vec<(char, u64)>,
    index: HashMap<char, usize>,
    total: u64,
}

impl FrequencyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every symbol in `text`. Empty text gives an empty map.
    pub fn analyze(text: &str) -> Self {
        let mut map = Self::new();
        for ch in text.chars() {
            // a str's length always fits in u64
            let slot = map.slot(ch);
            *slot = slot.saturating_add(1);
            map.total = map.total.saturating_add(1);
        }
        map
    }

    /// Build from explicit `(symbol, count)` pairs; repeated symbols accumulate.
    pub fn from_counts<I>(counts: I) -> Result<Self, CompressError>
    where
        I: IntoIterator<Item = (char, u64)>,
    {
        let mut map = Self::new();
        for (symbol, count) in counts {
            map.add(symbol, count)?;
        }
        Ok(map)
    }

    /// Add `count` occurrences of `symbol`, appending it if unseen. Fails
    /// without changing the map if the total would overflow.
    pub fn add(&mut self, symbol: char, count: u64) -> Result<(), CompressError> {
        let total = self
            .total
            .checked_add(count)
            .ok_or(CompressError::WeightOverflow)?;
        // entry <= total, so this cannot overflow either
        let slot = self.slot(symbol);
        *slot += count;
        self.total = total;
        Ok(())
    }

    fn slot(&mut self, symbol: char) -> &mut u64 {
        let i = match self.index.get(&symbol) {
            Some(&i) => i,
            None => {
                let i = self.entries.len();
                self.index.insert(symbol, i);
                self.entries.push((symbol, 0));
                i
            }
        };
        &mut self.entries[i].1
    }

    pub fn get(&self, symbol: char) -> Option<u64> {
        self.index.get(&symbol).map(|&i| self.entries[i].1)
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts; equals the analyzed text's length in symbols.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, u64)> + '_ {
        self.entries.iter().copied()
    }
}
