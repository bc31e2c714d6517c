use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};
use vsearch_experiment::{SearchDesign, Session, SessionOutcome};
use vsearch_render::load_font;
use vsearch_timing::{SystemClock, TimestampSource};
use winit::event_loop::EventLoop;

mod cli;
mod config;
mod logging;
mod simulate;
mod sink;
mod window;

use cli::{Cli, Command, SessionArgs};
use config::{load_or_init, AppConfig};
use simulate::{simulated_pair, ObserverParams, ScoringSink};
use sink::{write_session_info, JsonLinesSink, SessionInfo};
use window::{DisplayCommand, ExitOnDrop, SearchWindow, WindowRenderer, WindowResponses};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log);

    let config: AppConfig = load_or_init(&cli.config, AppConfig::default)?;
    let design = SearchDesign::new(config.experiment.clone())
        .with_context(|| format!("invalid experiment in {}", cli.config.display()))?;
    let seed = cli.seed.unwrap_or_else(rand::random);
    info!(
        seed,
        blocks = design.number_of_blocks(),
        trials_per_block = design.config().trials_per_block,
        "design ready"
    );

    match cli.command {
        Command::Preview { blocks } => preview(&design, seed, blocks),
        Command::Run(session) => {
            let data_dir = start_session(&config, &session, seed, "window")?;
            let outcome = run_window(&config, design, session.subject, data_dir, seed)?;
            report(outcome);
            Ok(())
        }
        Command::Simulate { session, observer } => {
            let data_dir = start_session(&config, &session, seed, "simulate")?;
            let outcome = run_simulation(&design, &session.subject, &data_dir, seed, observer.params())?;
            report(outcome);
            Ok(())
        }
    }
}

/// Resolves the data directory and writes the session info file.
fn start_session(config: &AppConfig, session: &SessionArgs, seed: u64, mode: &str) -> Result<PathBuf> {
    let data_dir = session
        .data_dir
        .clone()
        .unwrap_or_else(|| config.data_directory.clone());
    let info_path = write_session_info(
        &data_dir,
        &SessionInfo {
            subject: &session.subject,
            started_at: SystemClock.now_secs(),
            seed,
            mode,
            config: &config.experiment,
        },
    )?;
    info!(subject = %session.subject, path = %info_path.display(), "session info written");
    Ok(data_dir)
}

fn preview(design: &SearchDesign, seed: u64, blocks: usize) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(seed);
    let blocks = (0..blocks)
        .map(|_| design.assembler().build_block(&mut rng))
        .collect::<Result<Vec<_>, _>>()?;
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, &blocks)?;
    writeln!(out)?;
    Ok(())
}

fn run_simulation(
    design: &SearchDesign,
    subject: &str,
    data_dir: &Path,
    seed: u64,
    params: ObserverParams,
) -> Result<SessionOutcome> {
    // Separate stream so observer noise never shifts the generated trials
    let (mut display, mut observer) =
        simulated_pair(design, params, StdRng::seed_from_u64(seed.wrapping_add(1)));
    let file = JsonLinesSink::create(data_dir, &design.config().experiment_name, subject)?;
    let mut sink = ScoringSink::new(file);

    let outcome = Session::new(design, subject).run(
        &mut StdRng::seed_from_u64(seed),
        &mut display,
        &mut observer,
        &mut sink,
        &SystemClock,
    )?;

    sink.log_summary();
    let file = sink.into_inner();
    let idle_s = display.idle().as_secs_f64();
    info!(
        records = file.written(),
        idle_s,
        path = %file.path().display(),
        "simulation done"
    );
    Ok(outcome)
}

fn run_window(
    config: &AppConfig,
    design: SearchDesign,
    subject: String,
    data_dir: PathBuf,
    seed: u64,
) -> Result<SessionOutcome> {
    let event_loop = EventLoop::<DisplayCommand>::with_user_event().build()?;
    let proxy = event_loop.create_proxy();
    let (presented_tx, presented_rx) = mpsc::channel();
    let (keys_tx, keys_rx) = mpsc::channel();

    let font = config
        .display
        .font_path
        .as_deref()
        .map(load_font)
        .transpose()?;
    let quit_key = design.config().quit_key.clone();
    let mut app = SearchWindow::new(
        config.display.clone(),
        config.display.canvas_style(&config.experiment),
        font,
        presented_tx,
        keys_tx,
        quit_key.clone(),
    );

    let worker = thread::Builder::new()
        .name("session".into())
        .spawn(move || -> Result<SessionOutcome> {
            let _exit = ExitOnDrop::new(proxy.clone());
            let mut renderer = WindowRenderer::new(proxy, presented_rx);
            let mut responses = WindowResponses::new(keys_rx, quit_key);
            let mut sink =
                JsonLinesSink::create(&data_dir, &design.config().experiment_name, &subject)?;
            let outcome = Session::new(&design, subject.as_str()).run(
                &mut StdRng::seed_from_u64(seed),
                &mut renderer,
                &mut responses,
                &mut sink,
                &SystemClock,
            )?;
            Ok(outcome)
        })?;

    let looped = event_loop.run_app(&mut app);
    // Closes the window's channel ends so a worker blocked on them wakes up
    drop(app);
    let outcome = worker
        .join()
        .map_err(|_| anyhow!("session thread panicked"))?;
    looped?;
    outcome
}

fn report(outcome: SessionOutcome) {
    match outcome {
        SessionOutcome::Finished { trials } => info!(trials, "session finished"),
        SessionOutcome::Aborted {
            block,
            trial,
            trials,
        } => warn!(?block, ?trial, trials, "session aborted by participant"),
    }
}
