//! Command-line surface and configuration normalization.
//!
//! Argument parsing is peripheral to the core algorithm (§1 Non-goals),
//! but is specified here the same way the rest of this codebase builds
//! its CLIs: `clap`'s derive API with `help_heading`s and range-validated
//! scalars.

use std::path::PathBuf;

use clap::{value_parser, Parser};

use crate::core::resolve::LibMode;
use crate::error::MapError;

#[derive(Debug, Parser)]
#[command(
    name = "kmerseed",
    about = "Ungapped seed-and-extend short-read mapper",
    version
)]
pub struct Cli {
    /// Reference FASTA (optionally gzip'd) [path]
    #[clap(short = 'i', long = "db", value_parser, help_heading = "Core")]
    pub db: PathBuf,

    /// Read 1 FASTQ (optionally gzip'd) [path]
    #[clap(long = "R1", value_parser, help_heading = "Core")]
    pub input_r1: Option<PathBuf>,

    /// Read 2 FASTQ (optionally gzip'd) [path]
    #[clap(long = "R2", value_parser, help_heading = "Core")]
    pub input_r2: Option<PathBuf>,

    /// Output basename; outputs are `<basename>_R1.fastq`, `_R2.fastq`, `.bed` [path]
    #[clap(short = 'o', long = "out", value_parser, help_heading = "Core")]
    pub basename: PathBuf,

    /// Library orientation: ISF, ISR, IU, OSF, OSR, OU, SF, SR, U
    #[clap(short = 'l', long = "lib", help_heading = "Core")]
    pub lib: String,

    /// Seed length [9, 11, 13, 15]
    #[clap(short = 'k', long, default_value = "11", help_heading = "Mapping")]
    pub k: u8,

    /// Max mismatches, as a percentage of read length [0..100)
    #[clap(short = 'm', long = "mismatch", default_value = "15", value_parser = value_parser!(u8).range(0..100), help_heading = "Mapping")]
    pub mismatch_percent: u8,

    /// Seed stride along the read [>=1]
    #[clap(short = 's', long = "step", default_value = "17", value_parser = value_parser!(usize).range(1..), help_heading = "Mapping")]
    pub step: usize,

    /// Number of worker threads [>=1]
    #[clap(short = 't', long = "threads", default_value = "1", value_parser = value_parser!(usize).range(1..), help_heading = "Core")]
    pub threads: usize,

    /// Number of alternative candidates to evaluate before committing [>=0]
    #[clap(short = 'e', long = "evals", default_value = "0", help_heading = "Mapping")]
    pub evals: usize,

    /// Invert output: write non-mapping reads instead of mapping ones [flag]
    #[clap(long, help_heading = "Output")]
    pub diff: bool,

    /// Allow cross-sequence / unordered fallback pairing [flag]
    #[clap(long, help_heading = "Mapping")]
    pub disjoin: bool,

    /// Treat 'N' in the read as a free (non-mismatching) position [flag]
    #[clap(long = "ignore_N", alias = "ignore-n", help_heading = "Mapping")]
    pub ignore_n: bool,

    /// Preserve reference case instead of uppercasing (lowercase becomes unseedable) [flag]
    #[clap(long = "mask-lower", help_heading = "Mapping")]
    pub mask_lower: bool,

    /// Disable BED/BEDPE output [flag]
    #[clap(long = "no-bed", help_heading = "Output")]
    pub no_bed: bool,

    /// Disable FASTQ output [flag]
    #[clap(long = "no-fastq", help_heading = "Output")]
    pub no_fastq: bool,

    /// Suppress the startup parameter dump and progress bar [flag]
    #[clap(long, help_heading = "Output")]
    pub quiet: bool,
}

/// Normalized, validated configuration. Distinct from `Cli` so the core
/// modules never depend on `clap` types.
#[derive(Debug, Clone)]
pub struct Config {
    pub db: PathBuf,
    pub input_r1: Option<PathBuf>,
    pub input_r2: Option<PathBuf>,
    pub basename: PathBuf,
    pub lib: LibMode,
    pub k: usize,
    pub mismatch_percent: u32,
    pub step: usize,
    pub threads: usize,
    pub evals: usize,
    pub diff: bool,
    pub no_disjoin: bool,
    pub ignore_n: bool,
    pub mask_lower: bool,
    pub bed_out: bool,
    pub fastq_out: bool,
    pub quiet: bool,
}

/// A non-fatal policy conflict, logged as `[Warning] ...` but never
/// aborting the run.
pub struct ConfigWarning(pub String);

impl Config {
    /// Validate and normalize `cli` into a `Config`, applying the
    /// `evals>0 => no_disjoin=true` and `diff => bed_out=false` policies
    /// and returning the warnings those policies triggered.
    pub fn from_cli(cli: Cli) -> Result<(Config, Vec<ConfigWarning>), MapError> {
        if cli.input_r1.is_none() && cli.input_r2.is_none() {
            return Err(MapError::BadArguments(
                "at least one of -R1/-R2 is required".to_string(),
            ));
        }
        if !matches!(cli.k, 9 | 11 | 13 | 15) {
            return Err(MapError::BadArguments(format!(
                "-k must be one of 9, 11, 13, 15 (got {})",
                cli.k
            )));
        }
        let lib = LibMode::parse(&cli.lib).ok_or_else(|| {
            MapError::BadArguments(format!(
                "-l must be one of ISF, ISR, IU, OSF, OSR, OU, SF, SR, U (got {:?})",
                cli.lib
            ))
        })?;
        if lib.is_paired() && (cli.input_r1.is_none() || cli.input_r2.is_none()) {
            return Err(MapError::BadArguments(format!(
                "library mode {:?} requires both -R1 and -R2",
                cli.lib
            )));
        }

        let mut warnings = Vec::new();
        let mut no_disjoin = !cli.disjoin;
        if cli.evals > 0 && !no_disjoin {
            warnings.push(ConfigWarning(
                "evals>0 requires no_disjoin; --disjoin ignored".to_string(),
            ));
            no_disjoin = true;
        }

        let mut bed_out = !cli.no_bed;
        if cli.diff && bed_out {
            warnings.push(ConfigWarning(
                "--diff disables BED/BEDPE output".to_string(),
            ));
            bed_out = false;
        }

        let config = Config {
            db: cli.db,
            input_r1: cli.input_r1,
            input_r2: cli.input_r2,
            basename: cli.basename,
            lib,
            k: cli.k as usize,
            mismatch_percent: cli.mismatch_percent as u32,
            step: cli.step,
            threads: cli.threads,
            evals: cli.evals,
            diff: cli.diff,
            no_disjoin,
            ignore_n: cli.ignore_n,
            mask_lower: cli.mask_lower,
            bed_out,
            fastq_out: !cli.no_fastq,
            quiet: cli.quiet,
        };
        Ok((config, warnings))
    }

    /// Human-readable parameter dump, mirroring the existing codebase's
    /// startup diagnostic convention.
    pub fn print_params(&self) {
        if self.quiet {
            return;
        }
        eprintln!("\nSession parameters:");
        eprintln!("  Database: {}", self.db.display());
        if let Some(p) = &self.input_r1 {
            eprintln!("  R1 file: {}", p.display());
        }
        if let Some(p) = &self.input_r2 {
            eprintln!("  R2 file: {}", p.display());
        }
        eprintln!("  Output basename: {}", self.basename.display());
        eprintln!("  Lib: {:?}", self.lib);
        eprintln!("  --diff option: {}", if self.diff { "ON" } else { "OFF" });
        eprintln!(
            "  --disjoin option: {}",
            if self.no_disjoin { "OFF" } else { "ON" }
        );
        eprintln!(
            "  --ignore_N option: {}",
            if self.ignore_n { "ON" } else { "OFF" }
        );
        eprintln!(
            "  --mask-lower filter: {}",
            if self.mask_lower { "ON" } else { "OFF" }
        );
        eprintln!(
            "  BED output: {}",
            if self.bed_out && !self.diff {
                "Enabled"
            } else {
                "Disabled"
            }
        );
        eprintln!(
            "  FASTQ output: {}",
            if self.fastq_out { "Enabled" } else { "Disabled" }
        );
        if self.evals > 0 {
            eprintln!("  Num Evals: {}", self.evals);
        } else {
            eprintln!("  -e option set to 0");
        }
        eprintln!("  Kmer size: {}", self.k);
        eprintln!("  Mismatches: {}%", self.mismatch_percent);
        eprintln!("  Step size: {}", self.step);
        if self.threads == 1 {
            eprintln!("  Working on single thread");
        } else {
            eprintln!("  Using {} threads", self.threads);
        }
        eprintln!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_cli() -> Cli {
        Cli {
            db: PathBuf::from("ref.fa"),
            input_r1: Some(PathBuf::from("r1.fq")),
            input_r2: Some(PathBuf::from("r2.fq")),
            basename: PathBuf::from("out"),
            lib: "ISF".to_string(),
            k: 11,
            mismatch_percent: 15,
            step: 17,
            threads: 1,
            evals: 0,
            diff: false,
            disjoin: false,
            ignore_n: false,
            mask_lower: false,
            no_bed: false,
            no_fastq: false,
            quiet: true,
        }
    }

    #[test]
    fn evals_forces_no_disjoin_with_warning() {
        let mut cli = base_cli();
        cli.evals = 3;
        cli.disjoin = true;
        let (config, warnings) = Config::from_cli(cli).unwrap();
        assert!(config.no_disjoin);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn diff_disables_bed_with_warning() {
        let mut cli = base_cli();
        cli.diff = true;
        let (config, warnings) = Config::from_cli(cli).unwrap();
        assert!(!config.bed_out);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn rejects_bad_k() {
        let mut cli = base_cli();
        cli.k = 12;
        assert!(Config::from_cli(cli).is_err());
    }

    #[test]
    fn rejects_missing_inputs() {
        let mut cli = base_cli();
        cli.input_r1 = None;
        cli.input_r2 = None;
        assert!(Config::from_cli(cli).is_err());
    }

    #[test]
    fn paired_mode_requires_both_inputs() {
        let mut cli = base_cli();
        cli.input_r2 = None;
        assert!(Config::from_cli(cli).is_err());
    }

    #[test]
    fn single_end_mode_accepts_one_input() {
        let mut cli = base_cli();
        cli.lib = "SF".to_string();
        cli.input_r2 = None;
        assert!(Config::from_cli(cli).is_ok());
    }

    #[test]
    fn documented_invocation_parses_from_argv() {
        let cli = Cli::parse_from([
            "kmerseed", "-i", "ref.fa", "-R1", "r1.fq", "-o", "out", "-l", "SF",
        ]);
        assert_eq!(cli.db, PathBuf::from("ref.fa"));
        assert_eq!(cli.input_r1, Some(PathBuf::from("r1.fq")));
        assert_eq!(cli.basename, PathBuf::from("out"));
        assert_eq!(cli.lib, "SF");
    }

    #[test]
    fn documented_paired_invocation_parses_from_argv() {
        let cli = Cli::parse_from([
            "kmerseed", "-i", "ref.fa", "-R1", "r1.fq", "--R2", "r2.fq", "-o", "out", "-l", "ISF",
        ]);
        assert_eq!(cli.input_r1, Some(PathBuf::from("r1.fq")));
        assert_eq!(cli.input_r2, Some(PathBuf::from("r2.fq")));
    }
}
