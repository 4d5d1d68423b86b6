//! Per-package shared-string table.
//!
//! Two phases, two types: [`SharedStringTableBuilder`] counts text cells,
//! [`SharedStringTableBuilder::finalize`] consumes it and yields the read-only
//! [`SharedStringTable`] that cell classification resolves against.

use std::collections::HashMap;

use crate::spec::{EnumCell, Result, SpecChunk, SpecSharedStringEntry, XlsxPackError};

#[derive(Debug, Clone)]
struct SpecStringTally {
    frequency: usize,
    position_first: usize,
}

/// Collection phase: frequency and first-occurrence position per string.
#[derive(Debug, Clone, Default)]
pub struct SharedStringTableBuilder {
    dict_tally: HashMap<String, SpecStringTally>,
    n_position_next: usize,
}

impl SharedStringTableBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every text cell of `row`, left to right.
    pub fn collect_row(&mut self, row: &[EnumCell]) {
        for cell in row {
            let Some(value) = cell.as_text() else {
                continue;
            };
            let n_position = self.n_position_next;
            self.n_position_next += 1;

            match self.dict_tally.get_mut(value) {
                Some(tally) => tally.frequency += 1,
                None => {
                    self.dict_tally.insert(
                        value.to_string(),
                        SpecStringTally {
                            frequency: 1,
                            position_first: n_position,
                        },
                    );
                }
            }
        }
    }

    /// Collect rows top to bottom.
    pub fn collect_rows<'r, I>(&mut self, rows: I)
    where
        I: IntoIterator<Item = &'r [EnumCell]>,
    {
        for row in rows {
            self.collect_row(row);
        }
    }

    /// Builder pre-filled with one chunk's header and data rows.
    pub fn from_chunk(chunk: &SpecChunk<'_>) -> Self {
        let mut builder = Self::new();
        builder.collect_rows(chunk.iter_rows());
        builder
    }

    /// Ordering phase: sort by descending frequency, then first occurrence.
    pub fn finalize(self) -> SharedStringTable {
        let mut l_tallies: Vec<(String, SpecStringTally)> = self.dict_tally.into_iter().collect();
        l_tallies.sort_by(|(_, left), (_, right)| {
            right
                .frequency
                .cmp(&left.frequency)
                .then(left.position_first.cmp(&right.position_first))
        });

        let mut dict_index = HashMap::with_capacity(l_tallies.len());
        let mut l_entries = Vec::with_capacity(l_tallies.len());
        let mut n_total = 0usize;
        for (index, (value, tally)) in l_tallies.into_iter().enumerate() {
            n_total += tally.frequency;
            dict_index.insert(value.clone(), index);
            l_entries.push(SpecSharedStringEntry {
                value,
                frequency: tally.frequency,
                index,
            });
        }

        SharedStringTable {
            l_entries,
            dict_index,
            n_total,
        }
    }
}

/// Finalized, read-only shared-string table for one package.
#[derive(Debug, Clone, Default)]
pub struct SharedStringTable {
    l_entries: Vec<SpecSharedStringEntry>,
    dict_index: HashMap<String, usize>,
    n_total: usize,
}

impl SharedStringTable {
    /// Build the finalized table for one chunk.
    pub fn from_chunk(chunk: &SpecChunk<'_>) -> Self {
        SharedStringTableBuilder::from_chunk(chunk).finalize()
    }

    /// Index of `value` in the ordered table.
    pub fn resolve(&self, value: &str) -> Result<usize> {
        self.dict_index
            .get(value)
            .copied()
            .ok_or_else(|| XlsxPackError::UnknownString(value.to_string()))
    }

    /// Sum of all frequencies (`count` attribute).
    pub fn total_occurrences(&self) -> usize {
        self.n_total
    }

    /// Number of distinct strings (`uniqueCount` attribute).
    pub fn unique_count(&self) -> usize {
        self.l_entries.len()
    }

    /// Strings in final index order.
    pub fn ordered_entries(&self) -> impl Iterator<Item = &str> + '_ {
        self.l_entries.iter().map(|entry| entry.value.as_str())
    }

    /// Full entries in final index order.
    pub fn entries(&self) -> &[SpecSharedStringEntry] {
        &self.l_entries
    }
}
