use anyhow::Context;
use clap::Parser;
use looper_player_core::{PlayerMessage, PlayerRunner};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::*;
use tracing_subscriber::EnvFilter;

mod cli;
mod input;
mod view;

use cli::Cli;
use input::{HELP, Input, parse_input};
use view::LyricView;

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "looper_player=trace,looper_player_core=trace,looper_lyric=trace"
    } else {
        "looper_player=info,looper_player_core=info,looper_lyric=warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_thread_names(true)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .init();

    std::panic::set_hook(Box::new(move |info| {
        error!("Fatal error occurred! Looper player will exit now.");
        error!("Error: {info}");
    }));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    info!("Looper player is starting!");

    let segments = looper_lyric::load_lrc(&cli.file)
        .with_context(|| format!("无法加载歌词文件: {}", cli.file.display()))?;
    if segments.is_empty() {
        warn!("no timed lines found in {}", cli.file.display());
    }

    let mut view = LyricView::new(segments.clone());
    print!("{}", view.render());
    println!("{HELP}");

    let runner = PlayerRunner::new(cli.player_config(), segments);
    let handle = runner.handle();
    let (evt_tx, mut evt_rx) = tokio::sync::mpsc::unbounded_channel();
    let runner_task = tokio::spawn(runner.run(move |evt| {
        let _ = evt_tx.send(evt);
    }));

    if let Some(index) = cli.start {
        handle.send(PlayerMessage::SelectSegment { index })?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    break;
                };
                match parse_input(&line) {
                    None => {}
                    Some(Input::Send(msg)) => handle.send(msg)?,
                    Some(Input::List) => print!("{}", view.render()),
                    Some(Input::Help) => println!("{HELP}"),
                    Some(Input::Quit) => break,
                    Some(Input::Unknown(cmd)) => println!("unknown command: {cmd} (h for help)"),
                }
            }
            evt = evt_rx.recv() => {
                let Some(evt) = evt else {
                    break;
                };
                if let Some(line) = view.apply(&evt) {
                    println!("{line}");
                }
            }
        }
    }

    if let Err(err) = handle.send(PlayerMessage::Close) {
        warn!("player already stopped: {err:?}");
    }
    runner_task.await?;
    info!("bye");
    Ok(())
}
