use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use lingua_core::{sanitize_for_transport, InputSnapshot, Job, JobQueue, ProgressEstimator, Reason};
use lingua_logging::{lingua_debug, lingua_warn};
use tokio::sync::mpsc as async_mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::client::{HttpServiceClient, ServiceSettings, TranslationService};
use crate::types::{ExportFormat, LifecycleEvent, ServiceError, StartRequest, TaskId};

/// Commands accepted by the lifecycle driver.
enum Command {
    Translate { input: InputSnapshot, reason: Reason },
    TranslateFile {
        file_name: String,
        bytes: Vec<u8>,
        target: String,
    },
    Cancel,
    Export {
        format: ExportFormat,
        text: String,
        filename: String,
    },
}

/// Lifecycle phase of the single current task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Phase {
    #[default]
    Idle,
    Starting,
    Running,
    Completed,
    Cancelled,
    Failed,
}

/// What a runner reports back to the driver.
enum RunnerNote {
    Started { generation: u64 },
    Finished { generation: u64, outcome: TaskOutcome },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskOutcome {
    Completed,
    Failed,
}

/// Cloneable command sender; what trigger surfaces hold.
#[derive(Clone)]
pub struct LifecycleCommander {
    cmd_tx: async_mpsc::UnboundedSender<Command>,
}

impl LifecycleCommander {
    pub fn request_translate(&self, input: InputSnapshot, reason: Reason) {
        let _ = self.cmd_tx.send(Command::Translate { input, reason });
    }

    pub fn request_file_translate(&self, file_name: String, bytes: Vec<u8>, target: String) {
        let _ = self.cmd_tx.send(Command::TranslateFile {
            file_name,
            bytes,
            target,
        });
    }

    pub fn cancel(&self) {
        let _ = self.cmd_tx.send(Command::Cancel);
    }

    pub fn export(&self, format: ExportFormat, text: String, filename: String) {
        let _ = self.cmd_tx.send(Command::Export {
            format,
            text,
            filename,
        });
    }
}

/// Handle to the single-flight lifecycle driver.
///
/// Construction spawns a dedicated thread owning a tokio runtime; the
/// driver task on it is the only writer of lifecycle state. Dropping the
/// handle closes the command channel and winds the driver down.
pub struct LifecycleHandle {
    commander: LifecycleCommander,
    event_rx: mpsc::Receiver<LifecycleEvent>,
    runtime: tokio::runtime::Handle,
}

impl LifecycleHandle {
    pub fn new(settings: ServiceSettings) -> Result<Self, ServiceError> {
        let client = HttpServiceClient::new(&settings)?;
        Ok(Self::with_service(Arc::new(client), settings))
    }

    /// Seam for tests and alternative transports.
    pub fn with_service(service: Arc<dyn TranslationService>, settings: ServiceSettings) -> Self {
        let (cmd_tx, cmd_rx) = async_mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel();

        let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
        let handle = runtime.handle().clone();
        thread::spawn(move || {
            runtime.block_on(Driver::new(service, settings, event_tx, cmd_rx).run());
        });

        Self {
            commander: LifecycleCommander { cmd_tx },
            event_rx,
            runtime: handle,
        }
    }

    pub fn commander(&self) -> LifecycleCommander {
        self.commander.clone()
    }

    /// Runtime handle for timer-based collaborators (the rate gates).
    pub fn runtime(&self) -> tokio::runtime::Handle {
        self.runtime.clone()
    }

    pub fn request_translate(&self, input: InputSnapshot, reason: Reason) {
        self.commander.request_translate(input, reason);
    }

    pub fn request_file_translate(&self, file_name: String, bytes: Vec<u8>, target: String) {
        self.commander.request_file_translate(file_name, bytes, target);
    }

    pub fn cancel(&self) {
        self.commander.cancel();
    }

    pub fn export(&self, format: ExportFormat, text: String, filename: String) {
        self.commander.export(format, text, filename);
    }

    pub fn try_recv(&self) -> Option<LifecycleEvent> {
        self.event_rx.try_recv().ok()
    }
}

/// The one current task, as the driver tracks it.
struct CurrentTask {
    generation: u64,
    token: CancellationToken,
    /// Written by the runner once the server assigns an id; read by the
    /// driver at cancel time for the best-effort server-side stop.
    task_id: Arc<Mutex<Option<TaskId>>>,
    runner: tokio::task::JoinHandle<()>,
}

struct Driver {
    service: Arc<dyn TranslationService>,
    poll_interval: Duration,
    queue: JobQueue,
    phase: Phase,
    current: Option<CurrentTask>,
    generations: u64,
    event_tx: mpsc::Sender<LifecycleEvent>,
    cmd_rx: async_mpsc::UnboundedReceiver<Command>,
    note_tx: async_mpsc::UnboundedSender<RunnerNote>,
    note_rx: async_mpsc::UnboundedReceiver<RunnerNote>,
}

impl Driver {
    fn new(
        service: Arc<dyn TranslationService>,
        settings: ServiceSettings,
        event_tx: mpsc::Sender<LifecycleEvent>,
        cmd_rx: async_mpsc::UnboundedReceiver<Command>,
    ) -> Self {
        let (note_tx, note_rx) = async_mpsc::unbounded_channel();
        Self {
            service,
            poll_interval: settings.poll_interval,
            queue: JobQueue::new(),
            phase: Phase::Idle,
            current: None,
            generations: 0,
            event_tx,
            cmd_rx,
            note_tx,
            note_rx,
        }
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                command = self.cmd_rx.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    // All handles dropped: stop whatever is in flight.
                    None => {
                        self.cancel_current_task().await;
                        return;
                    }
                },
                Some(note) = self.note_rx.recv() => self.handle_note(note).await,
            }
        }
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Translate { input, reason } => self.handle_translate(input, reason).await,
            Command::TranslateFile {
                file_name,
                bytes,
                target,
            } => self.handle_translate_file(file_name, bytes, target).await,
            Command::Cancel => self.cancel_current_task().await,
            Command::Export {
                format,
                text,
                filename,
            } => self.handle_export(format, text, filename),
        }
    }

    async fn handle_translate(&mut self, input: InputSnapshot, reason: Reason) {
        let Some(job) = Job::from_snapshot(&input, reason) else {
            // Cleared input is the cancel path, not an error.
            self.cancel_current_task().await;
            self.emit(LifecycleEvent::Cleared);
            return;
        };

        lingua_debug!(
            "translate requested reason={} chars={}",
            job.reason.as_str(),
            job.text.chars().count()
        );
        if let Some(discarded) = self.queue.enqueue(job) {
            lingua_debug!("superseded pending job reason={}", discarded.reason.as_str());
        }

        // The new job wins: the old task is gone before the new one starts.
        if self.phase != Phase::Idle {
            self.cancel_current_task().await;
        }
        if let Some(job) = self.queue.drain() {
            self.start_task(job).await;
        }
    }

    async fn handle_translate_file(&mut self, file_name: String, bytes: Vec<u8>, target: String) {
        let job = Job::for_file(&file_name, &target);
        self.cancel_current_task().await;
        self.spawn_runner(job, StartKind::File { bytes }).await;
    }

    async fn start_task(&mut self, job: Job) {
        let request = StartRequest {
            text: sanitize_for_transport(&job.text),
            source: if job.auto_detect {
                None
            } else {
                Some(job.manual_source.clone())
            },
            target: job.target.clone(),
            generate: job.tuning.resolve(&job.text),
        };
        self.spawn_runner(job, StartKind::Text { request }).await;
    }

    async fn spawn_runner(&mut self, job: Job, start: StartKind) {
        // Idempotent: the translate path already cancelled, the queue-drain
        // path after completion has nothing to cancel.
        self.cancel_current_task().await;
        self.set_phase(Phase::Starting);

        self.generations += 1;
        let generation = self.generations;
        let token = CancellationToken::new();
        let task_id = Arc::new(Mutex::new(None));

        let ctx = RunnerContext {
            service: self.service.clone(),
            job,
            start,
            generation,
            token: token.clone(),
            shared_id: task_id.clone(),
            poll_interval: self.poll_interval,
            event_tx: self.event_tx.clone(),
            note_tx: self.note_tx.clone(),
        };
        let runner = tokio::spawn(run_task(ctx));
        self.current = Some(CurrentTask {
            generation,
            token,
            task_id,
            runner,
        });
    }

    /// Idempotent; safe to call from idle. The next start is not issued
    /// until the old runner has observed the cancellation and exited.
    async fn cancel_current_task(&mut self) {
        let Some(current) = self.current.take() else {
            return;
        };
        current.token.cancel();
        if current.runner.await.is_err() {
            lingua_warn!("task runner panicked during cancellation");
        }

        let task_id = current.task_id.lock().expect("task id lock").take();
        if let Some(task_id) = task_id {
            // Best-effort server-side stop; never awaited by the UI path.
            let service = self.service.clone();
            tokio::spawn(async move {
                if let Err(error) = service.cancel(&task_id).await {
                    lingua_warn!("server-side cancel failed for task {task_id}: {error}");
                }
            });
        }

        self.set_phase(Phase::Cancelled);
        self.emit(LifecycleEvent::Cancelled);
        self.set_phase(Phase::Idle);
    }

    async fn handle_note(&mut self, note: RunnerNote) {
        match note {
            RunnerNote::Started { generation } if self.is_current(generation) => {
                self.set_phase(Phase::Running);
            }
            RunnerNote::Finished {
                generation,
                outcome,
            } if self.is_current(generation) => {
                self.current = None;
                self.set_phase(match outcome {
                    TaskOutcome::Completed => Phase::Completed,
                    TaskOutcome::Failed => Phase::Failed,
                });
                self.set_phase(Phase::Idle);

                // Pick up any job that arrived while the task executed.
                if let Some(job) = self.queue.drain() {
                    self.start_task(job).await;
                }
            }
            // Stale note from a superseded runner; its poller is already
            // gone, nothing to do.
            _ => {}
        }
    }

    fn handle_export(&self, format: ExportFormat, text: String, filename: String) {
        let service = self.service.clone();
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            match service.export(format, &text, &filename).await {
                Ok(bytes) => {
                    let file_name = format!("{}.{}", filename, format.extension());
                    let _ = event_tx.send(LifecycleEvent::Exported { file_name, bytes });
                }
                Err(error) => {
                    lingua_warn!("export failed: {error}");
                    let _ = event_tx.send(LifecycleEvent::ExportFailed { error });
                }
            }
        });
    }

    fn is_current(&self, generation: u64) -> bool {
        self.current
            .as_ref()
            .is_some_and(|current| current.generation == generation)
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            lingua_debug!("lifecycle {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }

    fn emit(&self, event: LifecycleEvent) {
        let _ = self.event_tx.send(event);
    }
}

enum StartKind {
    Text { request: StartRequest },
    File { bytes: Vec<u8> },
}

struct RunnerContext {
    service: Arc<dyn TranslationService>,
    job: Job,
    start: StartKind,
    generation: u64,
    token: CancellationToken,
    shared_id: Arc<Mutex<Option<TaskId>>>,
    poll_interval: Duration,
    event_tx: mpsc::Sender<LifecycleEvent>,
    note_tx: async_mpsc::UnboundedSender<RunnerNote>,
}

/// One task from start call to terminal state. Runs as its own tokio task;
/// the driver's cancellation token is the only way to stop it early, and
/// the token is checked before every suspension point so a superseded
/// runner terminates without touching shared surfaces again.
async fn run_task(ctx: RunnerContext) {
    let RunnerContext {
        service,
        job,
        start,
        generation,
        token,
        shared_id,
        poll_interval,
        event_tx,
        note_tx,
    } = ctx;

    let start_call = async {
        match start {
            StartKind::Text { request } => service.start_translation(&request).await,
            StartKind::File { bytes } => {
                service
                    .start_file_translation(&job.text, bytes, &job.target)
                    .await
            }
        }
    };
    let started = tokio::select! {
        // Superseded while the start call was in flight: expected outcome,
        // not an error.
        _ = token.cancelled() => {
            lingua_debug!("start aborted before a task id was assigned");
            return;
        }
        started = start_call => started,
    };

    let task_id = match started {
        Ok(task_id) => task_id,
        Err(error) => {
            lingua_warn!("failed to start translation task: {error}");
            let _ = event_tx.send(LifecycleEvent::Failed { error });
            let _ = note_tx.send(RunnerNote::Finished {
                generation,
                outcome: TaskOutcome::Failed,
            });
            return;
        }
    };

    *shared_id.lock().expect("task id lock") = Some(task_id.clone());
    let started_at = Instant::now();
    let _ = note_tx.send(RunnerNote::Started { generation });
    let _ = event_tx.send(LifecycleEvent::Started {
        task_id: task_id.clone(),
    });

    let mut estimator = ProgressEstimator::new();
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first interval tick completes immediately; skip it so the first
    // poll happens one interval after start, as a timer would.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = token.cancelled() => return,
            _ = ticker.tick() => {}
        }

        let polled = tokio::select! {
            _ = token.cancelled() => return,
            polled = poll_once(service.as_ref(), &task_id, started_at, &mut estimator, &event_tx) => polled,
        };

        match polled {
            Ok(PollOutcome::Pending) => {}
            Ok(PollOutcome::Done { result }) => {
                let cost_secs = started_at.elapsed().as_secs_f64();
                let _ = event_tx.send(LifecycleEvent::Completed {
                    job,
                    result,
                    cost_secs,
                });
                let _ = note_tx.send(RunnerNote::Finished {
                    generation,
                    outcome: TaskOutcome::Completed,
                });
                return;
            }
            Err(error) => {
                lingua_warn!("poll failed for task {task_id}: {error}");
                let _ = event_tx.send(LifecycleEvent::Failed { error });
                let _ = note_tx.send(RunnerNote::Finished {
                    generation,
                    outcome: TaskOutcome::Failed,
                });
                return;
            }
        }
    }
}

enum PollOutcome {
    Pending,
    Done { result: String },
}

async fn poll_once(
    service: &dyn TranslationService,
    task_id: &str,
    started_at: Instant,
    estimator: &mut ProgressEstimator,
    event_tx: &mpsc::Sender<LifecycleEvent>,
) -> Result<PollOutcome, ServiceError> {
    let report = service.progress(task_id).await?;
    let view = estimator.sample(report.progress, report.total_sentences, started_at.elapsed());
    let _ = event_tx.send(LifecycleEvent::Progress {
        percent: report.progress,
        view,
    });

    let result = service.result(task_id).await?;
    if result.is_done() {
        return Ok(PollOutcome::Done {
            result: result.result.unwrap_or_default(),
        });
    }
    Ok(PollOutcome::Pending)
}
