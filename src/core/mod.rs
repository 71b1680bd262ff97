//! Core mapping engine: reference loading, k-mer indexing, seeding,
//! ungapped extension, pair/single resolution, work partitioning,
//! the worker pool, and output writers.

pub mod extend;
pub mod fastq;
pub mod gz;
pub mod index;
pub mod kmer;
pub mod output;
pub mod partition;
pub mod refdb;
pub mod resolve;
pub mod seed;
pub mod worker;
