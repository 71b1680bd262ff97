//! Transparent gzip detection for reference and read streams.
//!
//! Compression is detected by sniffing the gzip magic bytes rather than by
//! file extension, so `.fastq` and `.fastq.gz` are handled identically.

use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use flate2::read::MultiGzDecoder;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Open `path`, returning a boxed reader that transparently decompresses
/// if the stream is gzipped.
pub fn open_maybe_gz(path: &Path) -> io::Result<Box<dyn Read + Send>> {
    let mut file = File::open(path)?;
    let mut magic = [0u8; 2];
    let n = file.read(&mut magic)?;
    file.seek(SeekFrom::Start(0))?;

    if n == 2 && magic == GZIP_MAGIC {
        Ok(Box::new(MultiGzDecoder::new(file)))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}
