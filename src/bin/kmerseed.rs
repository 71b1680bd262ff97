use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use kmerseed::cli::{Cli, Config};
use kmerseed::core::{index, partition, refdb, worker};

fn main() {
    // Catch and handle errors
    if let Err(e) = run() {
        eprintln!("{:?}", e);
        std::process::exit(1);
    }
    std::process::exit(0);
}

fn run() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    let (config, warnings) = Config::from_cli(cli)?;
    for w in &warnings {
        eprintln!("[Warning] {}", w.0);
    }
    config.print_params();

    println!("Start: Loading reference");
    let reference = refdb::load(&config.db, config.mask_lower, config.k)?;

    println!("Start: Building k-mer index");
    let index = index::build(&reference, config.k);

    println!("Start: Planning work partitions");
    let r1_path = config
        .input_r1
        .as_deref()
        .or(config.input_r2.as_deref())
        .context("at least one of -R1/-R2 is required")?;
    let r2_path = if config.lib.is_paired() {
        config.input_r2.as_deref()
    } else {
        None
    };
    let partitions = partition::plan(r1_path, r2_path, config.threads)
        .with_context(|| format!("partitioning {}", r1_path.display()))?;

    let pb = if config.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(partitions.len() as u64)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("       {bar:40} {pos}/{len} partitions [{elapsed_precise}]")
            .unwrap(),
    );

    println!("Start: Mapping reads");
    let outputs = worker::run(&config, &index, &reference, &partitions)
        .context("running worker pool")?;
    pb.set_position(partitions.len() as u64);
    pb.finish_and_clear();

    if let Some(p) = &outputs.r1 {
        println!("Wrote {}", p.display());
    }
    if let Some(p) = &outputs.r2 {
        println!("Wrote {}", p.display());
    }
    if let Some(p) = &outputs.bed {
        println!("Wrote {}", p.display());
    }
    if !config.quiet {
        eprintln!("Done in {:.2}s", start_time.elapsed().as_secs_f64());
    }

    Ok(())
}
