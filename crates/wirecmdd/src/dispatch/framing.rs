//! Record framing for connection input.

use std::io::{BufRead, BufReader, Read};

use super::errors::ConnectionError;

const RECORD_DELIMITER: u8 = b'\n';
const STATEMENT_DELIMITER: u8 = b';';

/// Streaming reader yielding newline-delimited records.
pub(crate) struct RecordReader<R> {
    reader: BufReader<R>,
    max_record_bytes: usize,
    buffer: Vec<u8>,
}

impl<R: Read> RecordReader<R> {
    pub(crate) fn new(inner: R, max_record_bytes: usize) -> Self {
        Self {
            reader: BufReader::new(inner),
            max_record_bytes,
            buffer: Vec::new(),
        }
    }

    /// Next record without its line terminator (`\n` or `\r\n`).
    ///
    /// Returns `Ok(None)` once the peer has closed the stream. Bytes received
    /// after the last newline still form a final record.
    pub(crate) fn next_record(&mut self) -> Result<Option<&[u8]>, ConnectionError> {
        self.buffer.clear();
        // Longest accepted record: a full payload followed by `\r\n`.
        let limit = self.max_record_bytes.saturating_add(2);
        let read = (&mut self.reader)
            .take(u64::try_from(limit).unwrap_or(u64::MAX))
            .read_until(RECORD_DELIMITER, &mut self.buffer)
            .map_err(ConnectionError::Read)?;
        if read == 0 {
            return Ok(None);
        }

        if self.buffer.last() == Some(&RECORD_DELIMITER) {
            self.buffer.pop();
            if self.buffer.last() == Some(&b'\r') {
                self.buffer.pop();
            }
        }
        if self.buffer.len() > self.max_record_bytes {
            return Err(ConnectionError::RecordTooLarge {
                max_bytes: self.max_record_bytes,
            });
        }
        Ok(Some(&self.buffer))
    }
}

/// Splits a record into trimmed, non-empty statements.
pub(crate) fn split_statements(record: &[u8]) -> impl Iterator<Item = &[u8]> {
    record
        .split(|byte| *byte == STATEMENT_DELIMITER)
        .map(<[u8]>::trim_ascii)
        .filter(|statement| !statement.is_empty())
}
