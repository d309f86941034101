use std::error::Error;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::thread;

use crossbeam::channel;
use quoridor_engine::{play_game, Difficulty, EngineConfig, GameRecord, SelfPlayConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let num_games: u64 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(10);
    let output_file = args
        .get(2)
        .map(String::as_str)
        .unwrap_or("selfplay_games.jsonl");
    let random_opening_plies: u32 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(4);
    let base_seed: u64 = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(0);
    let num_threads: usize = args.get(5).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
        thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
    });

    let engine = EngineConfig::from_env();
    let difficulty = Difficulty::clamped(engine.max_depth);
    info!(
        num_games,
        depth = difficulty.depth(),
        random_opening_plies,
        num_threads,
        "starting self-play"
    );

    let (jobs_tx, jobs_rx) = channel::unbounded::<u64>();
    let (out_tx, out_rx) = channel::unbounded::<(u64, GameRecord)>();
    for game in 0..num_games {
        jobs_tx.send(game)?;
    }
    drop(jobs_tx);

    thread::scope(|scope| {
        for _ in 0..num_threads.max(1) {
            let jobs_rx = jobs_rx.clone();
            let out_tx = out_tx.clone();
            scope.spawn(move || {
                for game in jobs_rx.iter() {
                    let config = SelfPlayConfig {
                        search: engine.searcher_config(),
                        player_one: difficulty,
                        player_two: difficulty,
                        random_opening_plies,
                        seed: base_seed.wrapping_add(game),
                        ..SelfPlayConfig::default()
                    };
                    if out_tx.send((game, play_game(&config))).is_err() {
                        break;
                    }
                }
            });
        }
    });
    drop(out_tx);

    let mut records: Vec<(u64, GameRecord)> = out_rx.iter().collect();
    records.sort_by_key(|(game, _)| *game);

    let mut writer = BufWriter::new(File::create(output_file)?);
    for (_, record) in &records {
        writeln!(writer, "{}", serde_json::to_string(record)?)?;
    }
    writer.flush()?;

    info!(games = records.len(), output_file, "self-play done");
    Ok(())
}
