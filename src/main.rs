// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use the_sluice::blob::Blob;
use the_sluice::config::{Attach, ModuleConfig};
use the_sluice::engine::Pipeline;
use the_sluice::errors;
use the_sluice::modules::{BlobPrinter, CyclePump};
use the_sluice::tools::Cuckoo;
use the_sluice::traits::{Flow, Module};

const DEFAULT_CYCLES: usize = 10;

/// Scaling function shared through the service registry
type Scale = Arc<dyn Fn(usize) -> usize + Send + Sync>;

/// Exposes a `scale` service multiplying by `factor`
struct Scaler;

impl Module for Scaler {
    fn configure(&mut self, config: &mut ModuleConfig) -> errors::Result<()> {
        let factor: usize = config.get_or("factor", 2)?;
        config.expose(Arc::new(move |value: usize| value * factor) as Scale, "scale");
        Ok(())
    }
}

fn usage(program: &str) -> String {
    format!("Usage: {} [pipeline.toml] [cycles]", program)
}

/// Split the command line into an optional configuration file and a cycle count.
fn parse_args(args: &[String]) -> Result<(Option<String>, usize)> {
    let program = args.first().map_or("the-sluice", String::as_str);
    let mut config_file = None;
    let mut cycles = DEFAULT_CYCLES;
    for arg in args.iter().skip(1) {
        if arg == "-h" || arg == "--help" {
            println!("{}", usage(program));
            std::process::exit(0);
        }
        match arg.parse::<usize>() {
            Ok(count) => cycles = count,
            Err(_) if config_file.is_none() => config_file = Some(arg.clone()),
            Err(_) => anyhow::bail!("unexpected argument '{}'\n{}", arg, usage(program)),
        }
    }
    Ok((config_file, cycles))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let (config_file, cycles) = parse_args(&args)?;

    let mut builder = Pipeline::builder();
    if let Some(path) = &config_file {
        builder = builder.config_file(path);
    }
    let mut pipeline = builder
        .build()
        .with_context(|| format!("Failed to set up pipeline from {:?}", config_file))?;

    let services = pipeline.services().clone();
    pipeline.attach(Scaler, Attach::new())?;
    pipeline.attach(CyclePump::default(), Attach::named("pump"))?;
    pipeline.attach_fn(
        move |blob: Blob| {
            let scale = services.get::<Scale>("scale")?;
            let cycle = *blob.get::<usize>("cycle")?;
            let mut update = Blob::new();
            update.insert("scaled", scale(cycle));
            Ok(Flow::Continue(update))
        },
        Attach::named("scale").blob_keys(["cycle"]).timeit(true),
    )?;

    let mut progress = Cuckoo::new(Duration::from_secs(1), |cycle: usize| {
        tracing::info!(cycle, "Still draining");
    });
    pipeline.attach_fn(
        move |blob: Blob| {
            progress.call(*blob.get::<usize>("cycle")?);
            Ok(Flow::Continue(blob))
        },
        Attach::named("progress").only_if(["cycle"]),
    )?;
    pipeline.attach(
        BlobPrinter::default(),
        Attach::named("printer").every(3).param("prefix", "> "),
    )?;

    let closing = pipeline.drain(Some(cycles))?;
    println!("{}", closing);
    Ok(())
}
