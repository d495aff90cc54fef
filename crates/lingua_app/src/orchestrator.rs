use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use chrono::Utc;
use lingua_core::{GenerateParams, HistoryEntry, HistoryLog, InputSnapshot, Reason, TuningMode};
use lingua_engine::{
    AtomicWriter, AutoGate, ExportFormat, LifecycleCommander, LifecycleEvent, LifecycleHandle,
    ServiceError, ServiceSettings,
};
use lingua_logging::{lingua_error, lingua_info, lingua_warn};

use crate::history_store::HistoryStore;

/// Current form state: what the input surface shows right now. The auto
/// gate reads this at fire time, so a gated fire always reflects the
/// latest keystrokes rather than the ones that scheduled it.
#[derive(Debug, Clone)]
pub struct FormState {
    pub text: String,
    pub result: String,
    pub auto_detect: bool,
    pub source: String,
    pub target: String,
    pub tuning: TuningMode,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            text: String::new(),
            result: String::new(),
            auto_detect: true,
            source: "en".to_string(),
            target: "zh".to_string(),
            tuning: TuningMode::Auto,
        }
    }
}

struct Session {
    form: FormState,
    history: HistoryLog,
    progress_line: Option<String>,
}

/// Binds the trigger surfaces (typing, language switches, swap, buttons,
/// file selection) to the task lifecycle, tagging each with its reason
/// code, and pumps lifecycle events back into the session.
pub struct Orchestrator {
    commander: LifecycleCommander,
    auto_gate: AutoGate,
    session: Arc<Mutex<Session>>,
    store: HistoryStore,
}

impl Orchestrator {
    pub fn new(
        settings: ServiceSettings,
        store: HistoryStore,
        export_dir: PathBuf,
    ) -> anyhow::Result<Self> {
        let handle = LifecycleHandle::new(settings.clone())?;
        let commander = handle.commander();
        let session = Arc::new(Mutex::new(Session {
            form: FormState::default(),
            history: store.load(),
            progress_line: None,
        }));

        let auto_gate = {
            let session = session.clone();
            let commander = commander.clone();
            AutoGate::new(&settings.gate, handle.runtime(), move || {
                let input = snapshot_of(&session.lock().expect("session lock").form);
                commander.request_translate(input, Reason::Auto);
            })
        };

        spawn_event_pump(handle, session.clone(), store.clone(), export_dir);

        Ok(Self {
            commander,
            auto_gate,
            session,
            store,
        })
    }

    /// Input text changed; shaped through debounce + throttle.
    pub fn text_changed(&self, text: &str) {
        self.session.lock().expect("session lock").form.text = text.to_string();
        self.auto_gate.call();
    }

    /// Explicit translate button: no gating.
    pub fn translate_clicked(&self) {
        self.request_now(Reason::Manual);
    }

    pub fn source_changed(&self, code: &str) {
        self.session.lock().expect("session lock").form.source = code.to_string();
        self.request_if_nonempty(Reason::LangChange);
    }

    pub fn target_changed(&self, code: &str) {
        self.session.lock().expect("session lock").form.target = code.to_string();
        self.request_if_nonempty(Reason::LangChange);
    }

    pub fn set_auto_detect(&self, enabled: bool) {
        self.session.lock().expect("session lock").form.auto_detect = enabled;
        self.request_if_nonempty(Reason::AutoDetectToggle);
    }

    pub fn set_tuning(&self, tuning: TuningMode) {
        self.session.lock().expect("session lock").form.tuning = tuning;
    }

    /// Swap the language pair; when a result exists the input and result
    /// swap too, so the swapped pair retranslates the former output.
    pub fn swap_languages(&self) {
        {
            let mut session = self.session.lock().expect("session lock");
            let form = &mut session.form;
            std::mem::swap(&mut form.source, &mut form.target);
            if !form.result.trim().is_empty() {
                std::mem::swap(&mut form.text, &mut form.result);
            }
        }
        self.request_if_nonempty(Reason::Swap);
    }

    pub fn file_selected(&self, file_name: &str, bytes: Vec<u8>) {
        let target = self
            .session
            .lock()
            .expect("session lock")
            .form
            .target
            .clone();
        self.commander
            .request_file_translate(file_name.to_string(), bytes, target);
    }

    pub fn cancel(&self) {
        self.commander.cancel();
    }

    /// Server-side Word/PDF export of the current result.
    pub fn export_document(&self, format: ExportFormat) {
        let result = self.result_text();
        if result.trim().is_empty() {
            return;
        }
        self.commander.export(format, result, "translation".to_string());
    }

    /// Markdown export needs no server round-trip.
    pub fn export_markdown(&self, export_dir: &std::path::Path) {
        let result = self.result_text();
        if result.trim().is_empty() {
            return;
        }
        let writer = AtomicWriter::new(export_dir);
        match writer.write("translation.md", &result) {
            Ok(path) => lingua_info!("Exported markdown to {:?}", path),
            Err(err) => lingua_error!("Markdown export failed: {}", err),
        }
    }

    pub fn result_text(&self) -> String {
        self.session.lock().expect("session lock").form.result.clone()
    }

    pub fn progress_line(&self) -> Option<String> {
        self.session
            .lock()
            .expect("session lock")
            .progress_line
            .clone()
    }

    pub fn history_entries(&self) -> Vec<HistoryEntry> {
        self.session
            .lock()
            .expect("session lock")
            .history
            .entries()
            .to_vec()
    }

    pub fn clear_history(&self) {
        self.session.lock().expect("session lock").history.clear();
        self.store.clear();
    }

    pub fn set_manual_params(&self, params: GenerateParams) {
        self.set_tuning(TuningMode::Manual(params));
    }

    fn request_now(&self, reason: Reason) {
        let input = snapshot_of(&self.session.lock().expect("session lock").form);
        self.commander.request_translate(input, reason);
    }

    fn request_if_nonempty(&self, reason: Reason) {
        let input = snapshot_of(&self.session.lock().expect("session lock").form);
        if input.text.trim().is_empty() {
            return;
        }
        self.commander.request_translate(input, reason);
    }
}

fn snapshot_of(form: &FormState) -> InputSnapshot {
    InputSnapshot {
        text: form.text.clone(),
        auto_detect: form.auto_detect,
        source: form.source.clone(),
        target: form.target.clone(),
        tuning: form.tuning.clone(),
    }
}

fn spawn_event_pump(
    handle: LifecycleHandle,
    session: Arc<Mutex<Session>>,
    store: HistoryStore,
    export_dir: PathBuf,
) {
    thread::spawn(move || loop {
        if let Some(event) = handle.try_recv() {
            apply_event(event, &session, &store, &export_dir);
        } else {
            thread::sleep(Duration::from_millis(20));
        }
    });
}

fn apply_event(
    event: LifecycleEvent,
    session: &Arc<Mutex<Session>>,
    store: &HistoryStore,
    export_dir: &std::path::Path,
) {
    match event {
        LifecycleEvent::Started { task_id } => {
            lingua_info!("translation task {} started", task_id);
            session.lock().expect("session lock").progress_line =
                Some("Translating...".to_string());
        }
        LifecycleEvent::Progress { view, .. } => {
            let line = format!(
                "Translating sentence {}/{} (elapsed {:.1}s, eta {:.1}s)",
                view.current_sentence, view.total_sentences, view.elapsed_secs, view.eta_secs
            );
            println!("{line}");
            session.lock().expect("session lock").progress_line = Some(line);
        }
        LifecycleEvent::Completed {
            job,
            result,
            cost_secs,
        } => {
            let cost = format!("{cost_secs:.2}");
            lingua_info!(
                "translation finished reason={} cost={}s",
                job.reason.as_str(),
                cost
            );
            println!("=> {result}");
            println!("(took {cost}s)");

            let mut session = session.lock().expect("session lock");
            session.form.result = result.clone();
            session.progress_line = None;
            session.history.push(HistoryEntry {
                text: job.text,
                result,
                source: job.manual_source,
                target: job.target,
                cost_secs: cost,
                recorded_utc: Utc::now().to_rfc3339(),
            });
            store.save(&session.history);
        }
        LifecycleEvent::Cancelled => {
            session.lock().expect("session lock").progress_line = None;
        }
        LifecycleEvent::Cleared => {
            let mut session = session.lock().expect("session lock");
            session.form.result.clear();
            session.progress_line = None;
        }
        LifecycleEvent::Failed { error } => {
            report_failure(&error);
            session.lock().expect("session lock").progress_line = None;
        }
        LifecycleEvent::Exported { file_name, bytes } => {
            let writer = AtomicWriter::new(export_dir);
            match writer.write_bytes(&file_name, &bytes) {
                Ok(path) => println!("Exported to {path:?}"),
                Err(err) => lingua_error!("Failed to write export {}: {}", file_name, err),
            }
        }
        LifecycleEvent::ExportFailed { error } => {
            lingua_warn!("export failed: {}", error);
            println!("Export failed.");
        }
    }
}

fn report_failure(error: &ServiceError) {
    lingua_error!("translation failed: {}", error);
    println!("Translation failed: {error}");
}
