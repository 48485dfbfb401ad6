// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use args::Args;
use clap::Parser;
use rga_resize::{
    driver::Rga,
    error::Operation,
    image::{Image, PixelFormat},
    resize::{resize_with, ResizeSession},
    Error as ResizeError,
};
use std::{
    error::Error,
    fmt,
    process::ExitCode,
    time::{Duration, Instant},
};
use tracing::{debug, info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

mod args;

/// Why the tool stopped; each variant has its own exit code.
#[derive(Debug)]
enum Failure {
    Usage(String),
    Load(Box<dyn Error>),
    Resize(ResizeError),
    Write(Box<dyn Error>),
}

impl Failure {
    fn exit_code(&self) -> u8 {
        match self {
            Failure::Usage(_) => 1,
            Failure::Load(_) => 2,
            Failure::Resize(err) => match err {
                ResizeError::NullPointer(_)
                | ResizeError::InvalidDimensions { .. }
                | ResizeError::UnsupportedFormat { .. }
                | ResizeError::BufferTooSmall { .. } => 1,
                ResizeError::Library { .. }
                | ResizeError::MissingSymbol { .. }
                | ResizeError::Import(_) => 3,
                ResizeError::Driver {
                    op: Operation::Check,
                    ..
                } => 4,
                ResizeError::Driver {
                    op: Operation::Resize,
                    ..
                }
                | ResizeError::NotInitialized => 5,
            },
            Failure::Write(_) => 6,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Failure::Usage(msg) => write!(f, "{}", msg),
            Failure::Load(e) => write!(f, "failed to load input: {}", e),
            Failure::Resize(e) => write!(f, "{}", e),
            Failure::Write(e) => write!(f, "failed to write output: {}", e),
        }
    }
}

impl From<ResizeError> for Failure {
    fn from(err: ResizeError) -> Self {
        Failure::Resize(err)
    }
}

/// Builds a layer only when `enabled`, handing back the error instead of
/// failing when it cannot be built.
fn optional_layer<L, E>(
    enabled: bool,
    build: impl FnOnce() -> Result<L, E>,
) -> (Option<L>, Option<E>) {
    if !enabled {
        return (None, None);
    }
    match build() {
        Ok(layer) => (Some(layer), None),
        Err(e) => (None, Some(e)),
    }
}

fn init_logging(args: &Args) -> Result<(), Box<dyn Error>> {
    let level = if args.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let stdout_log = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter);

    // keep the stderr log when the journal socket is missing
    let (journald, journald_error) = optional_layer(args.journald, tracing_journald::layer);
    let journald = journald.map(|layer| layer.with_filter(LevelFilter::INFO));

    let tracy = if args.tracy {
        tracy_client::Client::start();
        Some(tracing_tracy::TracyLayer::default().with_filter(LevelFilter::TRACE))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(stdout_log)
        .with(journald)
        .with(tracy)
        .try_init()?;

    if let Some(e) = journald_error {
        warn!("journald unavailable, logging to stderr only: {}", e);
    }
    Ok(())
}

/// Allocates the output image, half the input unless `--size` says
/// otherwise.
fn destination(args: &Args, src: &Image) -> Result<Image, Failure> {
    let (width, height) = match args.size.as_deref() {
        Some([width, height]) => (*width, *height),
        Some(other) => {
            return Err(Failure::Usage(format!(
                "--size takes a width and a height, got {:?}",
                other
            )));
        }
        None => (src.width() / 2, src.height() / 2),
    };
    Image::new(width, height, PixelFormat::Bgra8888)
        .map_err(|e| Failure::Usage(format!("invalid destination size: {}", e)))
}

/// Resizes `iterations` frames through one session and returns the mean
/// time per frame.
fn run_session(
    rga: &Rga,
    args: &Args,
    src: &Image,
    dst: &mut Image,
) -> Result<Duration, ResizeError> {
    let mut session = ResizeSession::new(rga).with_interpolation(args.interpolation.into());
    session.init(src.surface(), dst.surface_mut())?;

    let start = Instant::now();
    for _ in 0..args.iterations {
        session.frame()?;
        if let Some(client) = tracy_client::Client::running() {
            client.frame_mark();
        }
    }
    let elapsed = start.elapsed();
    debug!("session resized {} frames", session.frames());
    session.deinit();

    Ok(elapsed / args.iterations)
}

/// Adds the driver's own description of a failing status to the log.
fn explain(rga: &Rga, err: ResizeError) -> Failure {
    if let ResizeError::Driver { status, .. } = &err {
        if let Some(msg) = rga.strerror(*status) {
            debug!("driver reports: {}", msg.trim());
        }
    }
    Failure::Resize(err)
}

fn run(args: &Args) -> Result<(), Failure> {
    if args.info {
        let rga = Rga::with_library(&args.library)?;
        match rga.info() {
            Some(report) => println!("{}", report),
            None => println!("{} does not provide an information report", args.library),
        }
        return Ok(());
    }

    let (Some(input), Some(output)) = (args.input.as_deref(), args.output.as_deref()) else {
        return Err(Failure::Usage("input and output paths are required".to_owned()));
    };

    // decode straight to BGRA, the layout the RGA scales fastest
    let src = Image::load(input, PixelFormat::Bgra8888).map_err(Failure::Load)?;
    let mut dst = destination(args, &src)?;
    let rga = Rga::with_library(&args.library)?;
    debug!("resizing {} -> {}", src, dst);

    if args.iterations > 1 {
        let mean = run_session(&rga, args, &src, &mut dst).map_err(|e| explain(&rga, e))?;
        info!(
            "{} frames through session, {:.2?} per frame",
            args.iterations, mean
        );
    } else {
        let start = Instant::now();
        resize_with(
            &rga,
            src.surface(),
            dst.surface_mut(),
            args.interpolation.into(),
        )
        .map_err(|e| explain(&rga, e))?;
        debug!("one-shot resize took {:.2?}", start.elapsed());
    }

    dst.save(output, args.quality).map_err(Failure::Write)?;

    println!(
        "Resized {} ({}x{}) -> {} ({}x{})",
        input.display(),
        src.width(),
        src.height(),
        output.display(),
        dst.width(),
        dst.height()
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // --help and --version also arrive here
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            return ExitCode::from(code);
        }
    };

    if let Err(e) = init_logging(&args) {
        eprintln!("failed to initialize logging: {}", e);
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            eprintln!("Error: {}", failure);
            ExitCode::from(failure.exit_code())
        }
    }
}
