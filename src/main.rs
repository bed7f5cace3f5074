use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use log::warn;
use serde_json::json;

use keyscore::config::Config;
use keyscore::engine::alignment::Aligner;
use keyscore::engine::{compare, errors, scoring};
use keyscore::keyboard::KeyboardLayout;
use keyscore::record::{RecordEvaluator, RecordKey};
use keyscore::replay::ReplayScript;
use keyscore::session::{SessionController, SessionMode};
use keyscore::store::{JsonStore, RecordRepository};
use keyscore::task::TaskId;

#[derive(Parser)]
#[command(name = "keyscore", version, about = "Typing assessment engine: diff, score and replay typing tests")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Highlight an input against its reference text
    Diff {
        #[arg(short, long)]
        target: String,
        #[arg(short, long)]
        input: String,
        #[arg(short, long, help = "Keyboard layout for adjacent-key errors (qwerty, dvorak, colemak)")]
        layout: Option<String>,
    },
    /// Score a finished input
    Score {
        #[arg(short, long)]
        target: String,
        #[arg(short, long)]
        input: String,
        #[arg(short, long, help = "Elapsed seconds")]
        seconds: f64,
        #[arg(long, help = "Total keystrokes, defaults to the input length")]
        keystrokes: Option<usize>,
        #[arg(long, default_value_t = 0)]
        backspaces: usize,
    },
    /// Play back a recorded session script and record the result
    Replay {
        script: PathBuf,
        #[command(flatten)]
        store: StoreArgs,
        #[arg(long, help = "Print the result without saving it")]
        dry_run: bool,
    },
    /// List recorded attempts for a task
    History(RecordArgs),
    /// Show the personal best for a task
    Best(RecordArgs),
    /// Delete every record for a task
    Forget {
        #[arg(long)]
        task: String,
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Print the effective configuration
    Config {
        #[arg(long, help = "Write the effective configuration to the config file")]
        write: bool,
    },
}

#[derive(Args)]
struct StoreArgs {
    #[arg(long, help = "Data directory, defaults to the configured data_dir")]
    store: Option<PathBuf>,
}

impl StoreArgs {
    fn open(&self, config: &Config) -> Result<JsonStore> {
        match &self.store {
            Some(dir) => JsonStore::with_base_dir(dir.clone()),
            None => JsonStore::from_config(config),
        }
    }
}

#[derive(Args)]
struct RecordArgs {
    #[arg(long)]
    task: String,
    #[arg(long, help = "Time attack records instead of standard")]
    time_attack: bool,
    #[command(flatten)]
    store: StoreArgs,
}

impl RecordArgs {
    fn key(&self) -> RecordKey {
        let mode = if self.time_attack {
            SessionMode::TimeAttack
        } else {
            SessionMode::Standard
        };
        RecordKey::new(TaskId::new(self.task.clone()), mode)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    let config = Config::load().unwrap_or_else(|e| {
        warn!("failed to load config, using defaults: {e}");
        Config::default()
    });

    match cli.command {
        Command::Diff {
            target,
            input,
            layout,
        } => {
            let aligner = Aligner::new(config.max_alignment_chars);
            let layout = KeyboardLayout::from_name(layout.as_deref().unwrap_or(&config.keyboard_layout));
            let comparison = compare::compare(&aligner, &input, &target)?;
            let breakdown = errors::analyze(&aligner, &layout, &input, &target)?;
            print_json(&json!({ "comparison": comparison, "errors": breakdown }))?;
        }
        Command::Score {
            target,
            input,
            seconds,
            keystrokes,
            backspaces,
        } => {
            if !seconds.is_finite() || seconds < 0.0 {
                bail!("seconds must be a non-negative number");
            }
            let keystrokes = keystrokes.unwrap_or_else(|| input.chars().count() + backspaces);
            let snapshot = scoring::score(&input, &target, seconds).with_keystrokes(keystrokes, backspaces);
            if let Err(e) = snapshot.validate(config.formula_tolerance) {
                warn!("{e}");
            }
            print_json(&snapshot)?;
        }
        Command::Replay {
            script,
            store,
            dry_run,
        } => {
            let script = ReplayScript::load(&script)?;
            let mut controller = SessionController::from_config(&config);
            let outcome = script.run(&mut controller, config.tick_rate())?;
            let Some(attempt) = outcome.result else {
                bail!("session was stopped before completion, nothing to record");
            };

            let evaluator = RecordEvaluator::from_config(&config);
            let finalized = if dry_run {
                evaluator.finalize(attempt, None, &[])
            } else {
                let mut repo = store.open(&config)?;
                evaluator.record(&mut repo, attempt)?
            };
            print_json(&finalized)?;
            for badge in &finalized.badges {
                eprintln!("earned: {}", badge.title());
            }
        }
        Command::History(args) => {
            let repo = args.store.open(&config)?;
            print_json(&repo.fetch_history(&args.key())?)?;
        }
        Command::Best(args) => {
            let repo = args.store.open(&config)?;
            match repo.fetch_best(&args.key())? {
                Some(best) => print_json(&best)?,
                None => println!("no record for {}", args.task),
            }
        }
        Command::Forget { task, store } => {
            let mut repo = store.open(&config)?;
            repo.delete_task(&TaskId::new(task.clone()))?;
            println!("deleted records for {task}");
        }
        Command::Config { write } => {
            if write {
                config.save()?;
            }
            print!(
                "{}",
                toml::to_string_pretty(&config).context("serializing config")?
            );
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
