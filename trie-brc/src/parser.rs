//! Streaming `name;value\n` record parser.
//!
//! The parser never looks ahead: name bytes walk the [`NameIndex`] one byte at
//! a time, value bytes are buffered until the newline. All state needed to pick
//! up in the middle of a record lives in [`Parser`], so chunks may be split
//! anywhere.

use crate::error::{Error, Result};
use crate::index::{NameIndex, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    ReadingName,
    ReadingValue,
}

#[derive(Debug)]
pub struct Parser {
    index: NameIndex,
    cursor: NodeId,
    state: State,
    value: Vec<u8>,
    records: u64,
}

impl Parser {
    pub fn new() -> Self {
        Self::with_index(NameIndex::new())
    }

    /// Continues aggregating into an existing index.
    pub fn with_index(index: NameIndex) -> Self {
        Self {
            cursor: index.root(),
            index,
            state: State::ReadingName,
            value: Vec::with_capacity(8),
            records: 0,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Records completed so far.
    pub fn records(&self) -> u64 {
        self.records
    }

    pub fn index(&self) -> &NameIndex {
        &self.index
    }

    /// Consumes one chunk. A record may start in one chunk and end in any later
    /// one.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<()> {
        let mut rest = chunk;
        while !rest.is_empty() {
            match self.state {
                State::ReadingName => {
                    let byte = rest[0];
                    rest = &rest[1..];
                    if byte == b';' {
                        self.state = State::ReadingValue;
                    } else {
                        self.cursor = self.index.descend(self.cursor, byte);
                    }
                }
                State::ReadingValue => match rest.iter().position(|&b| b == b'\n') {
                    Some(end) => {
                        self.value.extend_from_slice(&rest[..end]);
                        rest = &rest[end + 1..];
                        self.complete_record()?;
                    }
                    None => {
                        self.value.extend_from_slice(rest);
                        rest = &[];
                    }
                },
            }
        }
        Ok(())
    }

    /// Ends the input and hands back the index.
    ///
    /// A last record missing its newline is still counted as long as it has a
    /// value. A trailing name without `;` is dropped.
    pub fn finish(mut self) -> Result<NameIndex> {
        if self.state == State::ReadingValue && !self.value.is_empty() {
            self.complete_record()?;
        }
        Ok(self.index)
    }

    fn complete_record(&mut self) -> Result<()> {
        let value = parse_value(&self.value)?;
        self.index.leaf_of(self.cursor).add(value);
        self.value.clear();
        self.cursor = self.index.root();
        self.state = State::ReadingName;
        self.records += 1;
        Ok(())
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses `-?digits(.digits)?`. A trailing `\r` is tolerated so CRLF files
/// aggregate the same as LF ones.
pub fn parse_value(bytes: &[u8]) -> Result<f64> {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    let well_formed = {
        let digits = bytes.strip_prefix(b"-").unwrap_or(bytes);
        let mut dots = 0;
        !digits.is_empty()
            && digits.iter().all(|&b| match b {
                b'0'..=b'9' => true,
                b'.' => {
                    dots += 1;
                    dots == 1
                }
                _ => false,
            })
            && digits.iter().any(u8::is_ascii_digit)
    };
    if !well_formed {
        return Err(Error::invalid_value(bytes));
    }
    // Only ASCII digits, '-' and '.' got past the check above.
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|text| text.parse::<f64>().ok())
        .ok_or_else(|| Error::invalid_value(bytes))
}
