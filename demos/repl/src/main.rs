//! Interactive demo: a tiny REPL with completion, hints and persisted
//! history. Run with `--keycodes` to enter the key-code diagnostic
//! mode instead.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use lino::builder::EditorBuilder;
use lino::complete::{word_at, Completer, Completions};
use lino::error::LinoError;
use lino::hint::{Hint, Hinter};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

const COMMANDS: [(&str, &str); 5] = [
    ("hello", "print a greeting"),
    ("history", "show accepted lines"),
    ("clear", "clear the screen"),
    ("mask", "toggle masked input"),
    ("exit", "leave the repl"),
];

struct Commands;

impl Completer for Commands {
    fn complete(&self, line: &str, cursor: usize, completions: &mut Completions) {
        let word = word_at(line, cursor);
        for (name, _) in COMMANDS.iter().filter(|(name, _)| name.starts_with(word)) {
            completions.add(*name);
        }
    }
}

impl Hinter for Commands {
    fn hint(&self, line: &str) -> Option<Hint> {
        let line = line.trim_start();
        if line.is_empty() {
            return None;
        }
        let (name, desc) = COMMANDS.iter().find(|(name, _)| name.starts_with(line))?;
        let rest = &name[line.len()..];
        Some(Hint::new(format!("{rest}  ({desc})")).color(90))
    }
}

fn history_path() -> PathBuf {
    env::var_os("LINO_HISTORY")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".lino_history"))
}

fn main() -> ExitCode {
    let _ = TermLogger::init(
        LevelFilter::Warn,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );

    let mut editor = EditorBuilder::new()
        .with_completer(Commands)
        .with_hinter(Commands)
        .with_history_max_len(1000)
        .build();

    if env::args().any(|arg| arg == "--keycodes") {
        if let Err(err) = editor.print_key_codes() {
            eprintln!("key-code mode failed: {err}");
            return ExitCode::FAILURE;
        }
        return ExitCode::SUCCESS;
    }

    let history = history_path();
    if let Err(err) = editor.history_load(&history) {
        log::debug!("no history loaded: {err}");
    }

    let mut masked = false;
    loop {
        let line = match editor.readline("lino> ") {
            Ok(line) => line,
            Err(LinoError::Cancelled) => continue,
            Err(LinoError::Eof) => break,
            Err(err) => {
                eprintln!("error: {err}");
                return ExitCode::FAILURE;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        editor.history_add(&line);

        match line.trim() {
            "hello" => println!("Hello, World!"),
            "history" => {
                for entry in editor.history().iter() {
                    println!("{entry}");
                }
            }
            "clear" => {
                if let Err(err) = editor.clear_screen() {
                    eprintln!("error: {err}");
                }
            }
            "mask" => {
                masked = !masked;
                editor.set_mask_mode(masked);
            }
            "exit" => break,
            other => println!("Read: '{other}'"),
        }
    }

    if let Err(err) = editor.history_save(&history) {
        eprintln!("failed to save history: {err}");
    }

    ExitCode::SUCCESS
}
