//! Work partitioner: computes byte offsets into (optionally gzip'd)
//! FASTQ streams so each worker can seek to a distinct, record-aligned,
//! contiguous range without any inter-worker coordination.

use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use crate::core::gz::open_maybe_gz;

/// One worker's assignment: starting decompressed byte offsets into R1
/// (and R2, if paired) plus the number of lines (always a multiple of 4)
/// to consume from there.
#[derive(Debug, Clone, Copy)]
pub struct Partition {
    pub r1_start: u64,
    pub r2_start: u64,
    pub line_count: u64,
}

const RECORD_LINES: u64 = 4;

fn decompressed_size(path: &Path) -> io::Result<u64> {
    let mut reader = open_maybe_gz(path)?;
    let mut buf = [0u8; 64 * 1024];
    let mut total = 0u64;
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        total += n as u64;
    }
    Ok(total)
}

/// First pass (`decompressed_size`) learns the total size; second pass
/// walks line-by-line, cutting a new partition whenever the running byte
/// offset crosses the next `k * approx` boundary and the line count since
/// the last cut is a whole number of FASTQ records.
fn split_single(path: &Path, threads: usize) -> io::Result<Vec<(u64, u64)>> {
    let total = decompressed_size(path)?;
    let threads = threads.max(1);
    let approx = (total / threads as u64).max(1);

    let mut reader = BufReader::new(open_maybe_gz(path)?);
    let mut offset: u64 = 0;
    let mut lines_since_split: u64 = 0;
    let mut current_start: u64 = 0;
    let mut next_multiple: u64 = 1;
    let mut parts: Vec<(u64, u64)> = Vec::new();
    let mut line = String::new();

    loop {
        line.clear();
        let n = reader.read_line(&mut line)?;
        if n == 0 {
            break;
        }
        offset += n as u64;
        lines_since_split += 1;

        if parts.len() + 1 < threads
            && offset >= approx * next_multiple
            && lines_since_split % RECORD_LINES == 0
        {
            parts.push((current_start, lines_since_split));
            current_start = offset;
            lines_since_split = 0;
            next_multiple += 1;
        }
    }
    parts.push((current_start, lines_since_split));
    Ok(parts)
}

/// Couple R2 splits to R1's: R2 is walked purely by line count, closing a
/// partition as soon as its line count matches the corresponding R1
/// partition's.
fn split_r2_coupled(r2_path: &Path, r1_parts: &[(u64, u64)]) -> io::Result<Vec<u64>> {
    let mut reader = BufReader::new(open_maybe_gz(r2_path)?);
    let mut offset: u64 = 0;
    let mut starts = Vec::with_capacity(r1_parts.len());
    let mut current_start = 0u64;
    let mut lines_in_partition = 0u64;
    let mut line = String::new();

    for &(_, needed) in r1_parts {
        starts.push(current_start);
        if needed == 0 {
            continue;
        }
        while lines_in_partition < needed {
            line.clear();
            let n = reader.read_line(&mut line)?;
            if n == 0 {
                break;
            }
            offset += n as u64;
            lines_in_partition += 1;
        }
        current_start = offset;
        lines_in_partition = 0;
    }
    Ok(starts)
}

/// Plan `threads` contiguous, record-aligned partitions over `r1_path`
/// (required) and, if paired, `r2_path`.
pub fn plan(r1_path: &Path, r2_path: Option<&Path>, threads: usize) -> io::Result<Vec<Partition>> {
    let r1_parts = split_single(r1_path, threads)?;
    let r2_starts = match r2_path {
        Some(p) => split_r2_coupled(p, &r1_parts)?,
        None => vec![0u64; r1_parts.len()],
    };

    Ok(r1_parts
        .iter()
        .zip(r2_starts)
        .map(|(&(r1_start, line_count), r2_start)| Partition {
            r1_start,
            r2_start,
            line_count,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_fastq(records: usize) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        for i in 0..records {
            writeln!(f, "@read{i}").unwrap();
            writeln!(f, "ACGTACGTACGT").unwrap();
            writeln!(f, "+").unwrap();
            writeln!(f, "IIIIIIIIIIII").unwrap();
        }
        f
    }

    #[test]
    fn single_thread_yields_one_partition_covering_everything() {
        let f = write_fastq(10);
        let parts = plan(f.path(), None, 1).unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].r1_start, 0);
        assert_eq!(parts[0].line_count, 40);
    }

    #[test]
    fn partitions_are_record_aligned() {
        let f = write_fastq(40);
        let parts = plan(f.path(), None, 4).unwrap();
        assert!(parts.len() <= 4);
        let total_lines: u64 = parts.iter().map(|p| p.line_count).sum();
        assert_eq!(total_lines, 160);
        for p in &parts {
            assert_eq!(p.line_count % 4, 0);
        }
    }

    #[test]
    fn paired_partitions_couple_r1_and_r2_line_counts() {
        let f1 = write_fastq(40);
        let f2 = write_fastq(40);
        let parts = plan(f1.path(), Some(f2.path()), 4).unwrap();
        let total_lines: u64 = parts.iter().map(|p| p.line_count).sum();
        assert_eq!(total_lines, 160);
    }
}
