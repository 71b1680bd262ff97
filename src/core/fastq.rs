//! FASTQ record reader implementing the four-line state machine from the
//! component design: NEED_HEADER -> NEED_SEQ -> NEED_SEP -> NEED_QUAL ->
//! COMPLETE, one transition per input line.

use std::io::{self, BufRead};

/// One decoded FASTQ record. `header`, `separator` and `quality` keep
/// their trailing line terminator exactly as read, so writing them back
/// out reproduces the input byte-for-byte. `sequence` has its terminator
/// stripped, per the data model.
#[derive(Debug, Clone, Default)]
pub struct FastqRecord {
    pub header: String,
    pub sequence: Vec<u8>,
    pub separator: String,
    pub quality: String,
}

enum State {
    NeedHeader,
    NeedSeq,
    NeedSep,
    NeedQual,
}

/// Reads FASTQ records line-by-line from any `BufRead`, tracking how many
/// lines have been consumed so a worker can stop exactly at its assigned
/// `line_count`.
pub struct FastqReader<R: BufRead> {
    inner: R,
    lines_read: u64,
}

impl<R: BufRead> FastqReader<R> {
    pub fn new(inner: R) -> Self {
        FastqReader {
            inner,
            lines_read: 0,
        }
    }

    pub fn lines_read(&self) -> u64 {
        self.lines_read
    }

    /// Read one complete record, or `None` at clean end-of-stream. An
    /// incomplete trailing record (stream ends mid-record) is also
    /// reported as `None`, matching the original's "next gzgets fails"
    /// termination behavior.
    pub fn next_record(&mut self) -> io::Result<Option<FastqRecord>> {
        let mut state = State::NeedHeader;
        let mut record = FastqRecord::default();

        loop {
            let mut line = String::new();
            let n = self.inner.read_line(&mut line)?;
            if n == 0 {
                return Ok(None);
            }
            self.lines_read += 1;

            match state {
                State::NeedHeader => {
                    record.header = line;
                    state = State::NeedSeq;
                }
                State::NeedSeq => {
                    let stripped = line.trim_end_matches(['\r', '\n']);
                    record.sequence = stripped.as_bytes().to_vec();
                    state = State::NeedSep;
                }
                State::NeedSep => {
                    record.separator = line;
                    state = State::NeedQual;
                }
                State::NeedQual => {
                    record.quality = line;
                    return Ok(Some(record));
                }
            }
        }
    }
}

/// The read identifier for BED/FASTQ naming: leading '@' removed, and
/// truncated at the first whitespace (including the trailing newline).
pub fn record_name(header: &str) -> String {
    header
        .strip_prefix('@')
        .unwrap_or(header)
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string()
}
