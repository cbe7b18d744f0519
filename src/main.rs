use std::process;
use std::sync::{Arc, Mutex};

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use pixelrain::animator::Animator;
use pixelrain::config::{Cli, Config};
use pixelrain::display::{DisplayOptions, DisplayRefresh, FrameSink};
use pixelrain::effects::rain::CodeRain;
use pixelrain::framestate::{lock, spawn_worker, FrameState, SharedFrame};
use pixelrain::olaoutput::OlaOutput;
use pixelrain::osc::OscReceiver;
use pixelrain::preview::TerminalPreview;
use pixelrain::random;

fn create_sinks(config: &Config) -> Result<Vec<Box<dyn FrameSink + Send>>, String> {
    let geometry = config.board.rain_params().geometry;
    let mut sinks: Vec<Box<dyn FrameSink + Send>> = Vec::new();

    if config.ola_enabled {
        let ola = OlaOutput::new(config.ola_addr, config.ola_universe, geometry.pixel_count())
            .map_err(|err| format!("Cannot set up OLA output: {}", err))?;
        sinks.push(Box::new(ola));
    }

    if config.preview {
        sinks.push(Box::new(TerminalPreview::new(geometry)?));
    }

    if sinks.is_empty() {
        log::warn!("No outputs configured, frames are computed but not shown");
    }
    Ok(sinks)
}

fn run(config: Config) -> Result<(), String> {
    let params = config.board.rain_params();
    let seed = config.seed.unwrap_or_else(random::clock_seed);
    log::info!("Board {:?}, seed {}", config.board, seed);

    let frame: SharedFrame = FrameState::shared(params.geometry.pixel_count());
    let options = Arc::new(Mutex::new(DisplayOptions::new(config.brightness)));

    let shutdown_frame = Arc::clone(&frame);
    ctrlc::set_handler(move || {
        log::info!("Shutting down");
        lock(&shutdown_frame).shutdown = true;
    })
    .map_err(|err| format!("Cannot install Ctrl-C handler: {}", err))?;

    let osc_receiver = match config.osc_listen {
        Some(addr) => Some(
            OscReceiver::new(addr, Arc::clone(&options), Arc::clone(&frame))
                .map_err(|err| format!("Cannot set up OSC: {}", err))?,
        ),
        None => None,
    };

    let mut display = DisplayRefresh::new(
        Arc::clone(&frame),
        Arc::clone(&options),
        create_sinks(&config)?,
        config.refresh_rate_hz,
    );

    let rain = CodeRain::new(params, StdRng::seed_from_u64(seed), Arc::clone(&frame));
    let mut animator = Animator::new(Box::new(rain), Arc::clone(&frame), config.tick_rate_hz);

    let mut handles = vec![
        spawn_worker("Rain", &frame, move || animator.run())?,
        spawn_worker("Display", &frame, move || display.run())?,
    ];
    if let Some(osc_receiver) = osc_receiver {
        handles.push(spawn_worker("OSC", &frame, move || osc_receiver.run())?);
    }

    let mut result = Ok(());
    for handle in handles {
        let name = handle.thread().name().unwrap_or("unnamed").to_string();
        if handle.join().is_err() {
            result = Err(format!("Thread {} panicked", name));
        }
    }
    result
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = match Config::load(&cli) {
        Ok(config) => config,
        Err(err) => {
            log::error!("{}", err);
            process::exit(2);
        }
    };

    if let Err(err) = run(config) {
        log::error!("{}", err);
        process::exit(1);
    }
}
