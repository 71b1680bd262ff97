//! Record writers: verbatim FASTQ passthrough and BED/BEDPE hit rows.

use std::io::{self, Write};

use crate::core::fastq::FastqRecord;

/// Write a FASTQ record back out byte-for-byte: header/separator/quality
/// carry their own trailing newline from the read; only the sequence
/// needs one appended, since it was stripped on read.
pub fn write_fastq_record<W: Write>(writer: &mut W, rec: &FastqRecord) -> io::Result<()> {
    writer.write_all(rec.header.as_bytes())?;
    writer.write_all(&rec.sequence)?;
    writer.write_all(b"\n")?;
    writer.write_all(rec.separator.as_bytes())?;
    writer.write_all(rec.quality.as_bytes())?;
    Ok(())
}

/// Single-end hit row: `chrom TAB start TAB end TAB name LF`.
pub fn write_bed<W: Write>(
    writer: &mut W,
    chrom: &str,
    start: usize,
    end: usize,
    name: &str,
) -> io::Result<()> {
    writeln!(writer, "{chrom}\t{start}\t{end}\t{name}")
}

/// Paired hit row, still written to a `.bed`-suffixed file:
/// `chrom1 TAB start1 TAB end1 TAB chrom2 TAB start2 TAB end2 TAB name TAB score TAB strand1 TAB strand2 LF`.
#[allow(clippy::too_many_arguments)]
pub fn write_bedpe<W: Write>(
    writer: &mut W,
    chrom1: &str,
    start1: usize,
    end1: usize,
    chrom2: &str,
    start2: usize,
    end2: usize,
    name: &str,
    score: u8,
    strand1: char,
    strand2: char,
) -> io::Result<()> {
    writeln!(
        writer,
        "{chrom1}\t{start1}\t{end1}\t{chrom2}\t{start2}\t{end2}\t{name}\t{score}\t{strand1}\t{strand2}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bed_row_is_tab_separated() {
        let mut buf = Vec::new();
        write_bed(&mut buf, "chr1", 0, 11, "read1").unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "chr1\t0\t11\tread1\n");
    }

    #[test]
    fn bedpe_row_has_ten_fields() {
        let mut buf = Vec::new();
        write_bedpe(&mut buf, "chr1", 0, 11, "chr1", 12, 23, "read1", 0, '+', '-').unwrap();
        let s = String::from_utf8(buf).unwrap();
        assert_eq!(s.trim_end().split('\t').count(), 10);
    }

    #[test]
    fn fastq_record_round_trips_verbatim() {
        use crate::core::fastq::FastqRecord;
        let rec = FastqRecord {
            header: "@r1 x\n".to_string(),
            sequence: b"ACGT".to_vec(),
            separator: "+\n".to_string(),
            quality: "IIII\n".to_string(),
        };
        let mut buf = Vec::new();
        write_fastq_record(&mut buf, &rec).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "@r1 x\nACGT\n+\nIIII\n"
        );
    }
}
