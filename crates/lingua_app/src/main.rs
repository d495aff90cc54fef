use std::io::BufRead;

use anyhow::{Context, Result};
use lingua_app::history_store::{default_data_dir, HistoryStore};
use lingua_app::logging;
use lingua_app::orchestrator::Orchestrator;
use lingua_core::{GenerateParams, TuningMode};
use lingua_engine::{ExportFormat, ServiceSettings};

const HELP: &str = "\
Type text to translate it (debounced, like typing into the input box).
Commands:
  :translate           translate the current text now
  :source CODE         set the source language (e.g. :source de)
  :target CODE         set the target language
  :auto on|off         toggle source-language auto-detection
  :tune auto           use automatic generation-parameter selection
  :tune B P N E        set beams / rep. penalty / ngram / encoder-ngram
  :swap                swap the language pair (and input/result)
  :file PATH           translate a file
  :export word|pdf|md  export the current result
  :history             show recent translations
  :clear-history       forget all recorded translations
  :cancel              cancel the running translation
  :quit";

fn main() -> Result<()> {
    logging::initialize(logging::LogDestination::File);

    let mut settings = ServiceSettings::default();
    if let Ok(base_url) = std::env::var("LINGUA_BASE_URL") {
        settings.base_url = base_url;
    }

    let data_dir = default_data_dir();
    let orchestrator = Orchestrator::new(
        settings,
        HistoryStore::new(data_dir.clone()),
        data_dir.clone(),
    )
    .context("failed to start the translation lifecycle")?;

    println!("{HELP}");
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read input")?;
        let trimmed = line.trim();

        if let Some(command) = trimmed.strip_prefix(':') {
            if !run_command(&orchestrator, command, &data_dir)? {
                break;
            }
        } else {
            orchestrator.text_changed(&line);
        }
    }
    Ok(())
}

/// Returns `false` when the user asked to quit.
fn run_command(
    orchestrator: &Orchestrator,
    command: &str,
    data_dir: &std::path::Path,
) -> Result<bool> {
    let mut words = command.split_whitespace();
    match (words.next().unwrap_or(""), words.next()) {
        ("quit", _) => return Ok(false),
        ("translate", _) => orchestrator.translate_clicked(),
        ("cancel", _) => orchestrator.cancel(),
        ("source", Some(code)) => orchestrator.source_changed(code),
        ("target", Some(code)) => orchestrator.target_changed(code),
        ("auto", Some(flag)) => orchestrator.set_auto_detect(flag == "on"),
        ("swap", _) => orchestrator.swap_languages(),
        ("tune", Some("auto")) => orchestrator.set_tuning(TuningMode::Auto),
        ("tune", Some(first)) => {
            let rest: Vec<&str> = words.collect();
            match parse_manual_params(first, &rest) {
                Some(params) => orchestrator.set_manual_params(params),
                None => println!("usage: :tune auto | :tune BEAMS PENALTY NGRAM ENC_NGRAM"),
            }
        }
        ("file", Some(path)) => match std::fs::read(path) {
            Ok(bytes) => {
                let name = std::path::Path::new(path)
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or(path)
                    .to_string();
                orchestrator.file_selected(&name, bytes);
            }
            Err(err) => println!("Could not read {path}: {err}"),
        },
        ("export", Some("word")) => orchestrator.export_document(ExportFormat::Word),
        ("export", Some("pdf")) => orchestrator.export_document(ExportFormat::Pdf),
        ("export", Some("md")) => orchestrator.export_markdown(data_dir),
        ("history", _) => {
            for entry in orchestrator.history_entries() {
                println!(
                    "[{}->{}] {} => {} ({}s)",
                    entry.source,
                    entry.target,
                    preview(&entry.text),
                    preview(&entry.result),
                    entry.cost_secs
                );
            }
        }
        ("clear-history", _) => orchestrator.clear_history(),
        _ => println!("{HELP}"),
    }
    Ok(true)
}

fn parse_manual_params(first: &str, rest: &[&str]) -> Option<GenerateParams> {
    if rest.len() != 3 {
        return None;
    }
    Some(GenerateParams {
        num_beams: first.parse().ok()?,
        repetition_penalty: rest[0].parse().ok()?,
        no_repeat_ngram_size: rest[1].parse().ok()?,
        encoder_no_repeat_ngram_size: rest[2].parse().ok()?,
    })
}

fn preview(text: &str) -> String {
    text.chars().take(40).collect()
}
