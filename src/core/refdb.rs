//! Reference loader: parses (optionally gzip'd) multi-FASTA into an
//! immutable, indexable set of sequences.

use std::collections::HashSet;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::core::gz::open_maybe_gz;
use crate::error::MapError;

/// One loaded reference sequence. Sequences are numbered 0..S-1 in load
/// order and are immutable once the `Reference` is constructed.
pub struct Sequence {
    pub identifier: String,
    pub bases: Vec<u8>,
    /// Fraction of G/C bases, informational only (not used by the aligner).
    pub gc_fraction: f64,
}

impl Sequence {
    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }
}

pub struct Reference {
    pub sequences: Vec<Sequence>,
}

impl Reference {
    pub fn get(&self, seq_idx: usize) -> &Sequence {
        &self.sequences[seq_idx]
    }
}

fn gc_fraction(bases: &[u8]) -> f64 {
    if bases.is_empty() {
        return 0.0;
    }
    let gc = bases
        .iter()
        .filter(|&&b| b == b'G' || b == b'C' || b == b'g' || b == b'c')
        .count();
    gc as f64 / bases.len() as f64
}

/// Load and validate a multi-FASTA reference.
///
/// * `mask_lower` — if false, lowercase bases are uppercased (and therefore
///   seedable); if true, case is preserved, so lowercase-masked regions
///   become ambiguous to the k-mer encoder.
/// * `min_len` — the configured seed length k; any sequence shorter than
///   this is rejected up front since it could never seed.
pub fn load(path: &Path, mask_lower: bool, min_len: usize) -> Result<Reference, MapError> {
    let reader = open_maybe_gz(path).map_err(|e| MapError::io(path, e))?;
    let buf = BufReader::new(reader);

    let mut sequences: Vec<Sequence> = Vec::new();
    let mut seen_idents: HashSet<String> = HashSet::new();
    let mut current_ident: Option<String> = None;
    let mut current_bases: Vec<u8> = Vec::new();

    let flush = |ident: Option<String>,
                 bases: Vec<u8>,
                 sequences: &mut Vec<Sequence>,
                 seen: &mut HashSet<String>,
                 path: &Path|
     -> Result<(), MapError> {
        if let Some(identifier) = ident {
            if !seen.insert(identifier.clone()) {
                return Err(MapError::DuplicateIdentifier {
                    path: path.to_path_buf(),
                    identifier,
                });
            }
            let gc_fraction = gc_fraction(&bases);
            sequences.push(Sequence {
                identifier,
                bases,
                gc_fraction,
            });
        }
        Ok(())
    };

    for line in buf.lines() {
        let line = line.map_err(|e| MapError::io(path, e))?;
        if let Some(rest) = line.strip_prefix('>') {
            flush(
                current_ident.take(),
                std::mem::take(&mut current_bases),
                &mut sequences,
                &mut seen_idents,
                path,
            )?;
            let identifier = rest
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_string();
            current_ident = Some(identifier);
        } else {
            let trimmed = line.trim_end_matches(['\r', '\n']);
            if current_ident.is_some() {
                if mask_lower {
                    current_bases.extend_from_slice(trimmed.as_bytes());
                } else {
                    current_bases.extend(trimmed.bytes().map(|b| b.to_ascii_uppercase()));
                }
            }
        }
    }
    flush(
        current_ident.take(),
        current_bases,
        &mut sequences,
        &mut seen_idents,
        path,
    )?;

    if sequences.is_empty() {
        return Err(MapError::EmptyOrMalformedReference {
            path: path.to_path_buf(),
            reason: "no FASTA headers found".to_string(),
        });
    }

    for seq in &sequences {
        if seq.len() < min_len {
            return Err(MapError::SequenceTooShort {
                path: path.to_path_buf(),
                identifier: seq.identifier.clone(),
                len: seq.len(),
                k: min_len,
            });
        }
    }

    Ok(Reference { sequences })
}

pub fn path_for_diagnostics(path: &Path) -> PathBuf {
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_fasta(contents: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn loads_simple_reference() {
        let f = write_fasta(">chr1 desc\nACGTacgt\nACGT\n>chr2\nTTTTTTTTTTTT\n");
        let r = load(f.path(), false, 1).unwrap();
        assert_eq!(r.sequences.len(), 2);
        assert_eq!(r.sequences[0].identifier, "chr1");
        assert_eq!(r.sequences[0].bases, b"ACGTACGTACGT");
        assert_eq!(r.sequences[1].identifier, "chr2");
    }

    #[test]
    fn mask_lower_preserves_case() {
        let f = write_fasta(">chr1\nACGTacgt\n");
        let r = load(f.path(), true, 1).unwrap();
        assert_eq!(r.sequences[0].bases, b"ACGTacgt");
    }

    #[test]
    fn rejects_duplicate_identifiers() {
        let f = write_fasta(">chr1\nACGT\n>chr1\nTTTT\n");
        let err = load(f.path(), false, 1).unwrap_err();
        assert!(matches!(err, MapError::DuplicateIdentifier { .. }));
    }

    #[test]
    fn rejects_empty_reference() {
        let f = write_fasta("not a fasta file\n");
        let err = load(f.path(), false, 1).unwrap_err();
        assert!(matches!(err, MapError::EmptyOrMalformedReference { .. }));
    }

    #[test]
    fn rejects_sequence_shorter_than_k() {
        let f = write_fasta(">chr1\nACGT\n");
        let err = load(f.path(), false, 11).unwrap_err();
        assert!(matches!(err, MapError::SequenceTooShort { .. }));
    }
}
