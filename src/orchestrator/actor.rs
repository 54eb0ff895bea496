use super::{Command, OrchestratorConfig, Snapshot};
use crate::error::TranslationError;
use crate::language;
use crate::resolver::TranslationBackend;
use crate::speech::{SpeechRecognizer, SpeechSynthesizer, TranscriptAccumulator};
use crate::types::{Origin, TranslationRequest, TranslationResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Completions reported back to the orchestrator by its own spawned tasks.
pub(super) enum Internal {
    DebounceElapsed {
        timer: u64,
    },
    AutoSpeakDue {
        timer: u64,
    },
    Resolved {
        sequence_id: u64,
        outcome: Result<TranslationResult, TranslationError>,
    },
}

/// A cancelable one-shot timer.
///
/// Aborting the task may race with a fire already sitting in the queue, so
/// fires are also matched against the id of the currently pending timer.
struct Timer {
    id: u64,
    handle: JoinHandle<()>,
}

impl Timer {
    fn cancel(self) {
        self.handle.abort();
    }
}

struct PendingSpeech {
    timer: Timer,
    sequence_id: u64,
    text: String,
}

struct OrchestratorState {
    input_text: String,
    last_input_change_at: Instant,
    is_listening: bool,
    is_speaking: bool,
    pending_debounce: Option<Timer>,
    pending_auto_speak: Option<PendingSpeech>,
    last_sequence_id: u64,
    translated_text: String,
    origin: Option<Origin>,
    error: Option<String>,
    speech_error: Option<String>,
    is_translating: bool,
    source_lang: String,
    target_lang: String,
    transcript: TranscriptAccumulator,
}

pub(super) struct Orchestrator {
    config: OrchestratorConfig,
    backend: Arc<dyn TranslationBackend>,
    recognizer: Box<dyn SpeechRecognizer>,
    synthesizer: Box<dyn SpeechSynthesizer>,
    internal_tx: mpsc::UnboundedSender<Internal>,
    next_timer_id: u64,
    state: OrchestratorState,
}

impl Orchestrator {
    pub(super) fn new(
        config: OrchestratorConfig,
        backend: Arc<dyn TranslationBackend>,
        recognizer: Box<dyn SpeechRecognizer>,
        synthesizer: Box<dyn SpeechSynthesizer>,
        internal_tx: mpsc::UnboundedSender<Internal>,
    ) -> Self {
        let state = OrchestratorState {
            input_text: String::new(),
            last_input_change_at: Instant::now(),
            is_listening: false,
            is_speaking: false,
            pending_debounce: None,
            pending_auto_speak: None,
            last_sequence_id: 0,
            translated_text: String::new(),
            origin: None,
            error: None,
            speech_error: None,
            is_translating: false,
            source_lang: config.source_lang.clone(),
            target_lang: config.target_lang.clone(),
            transcript: TranscriptAccumulator::default(),
        };

        Self {
            config,
            backend,
            recognizer,
            synthesizer,
            internal_tx,
            next_timer_id: 0,
            state,
        }
    }

    pub(super) fn snapshot(&self) -> Snapshot {
        Snapshot {
            input_text: self.state.input_text.clone(),
            translated_text: self.state.translated_text.clone(),
            origin: self.state.origin,
            error: self.state.error.clone(),
            speech_error: self.state.speech_error.clone(),
            is_translating: self.state.is_translating,
            is_listening: self.state.is_listening,
            is_speaking: self.state.is_speaking,
            source_lang: self.state.source_lang.clone(),
            target_lang: self.state.target_lang.clone(),
        }
    }

    pub(super) async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut internal: mpsc::UnboundedReceiver<Internal>,
        snapshot_tx: watch::Sender<Snapshot>,
    ) {
        debug!("Orchestrator started");

        loop {
            tokio::select! {
                biased;
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(event) = internal.recv() => self.handle_internal(event),
            }

            let next = self.snapshot();
            snapshot_tx.send_if_modified(|current| {
                if *current == next {
                    false
                } else {
                    *current = next;
                    true
                }
            });
        }

        self.cancel_debounce();
        self.cancel_auto_speak();
        self.stop_listening();
        self.stop_speaking();
        debug!("Orchestrator stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::InputChanged(text) => self.set_input(text),
            Command::Transcript(update) => {
                let text = self.state.transcript.apply(&update);
                if !text.is_empty() {
                    self.set_input(text);
                }
            }
            Command::StartListening => self.start_listening(),
            Command::StopListening => self.stop_listening(),
            Command::ListeningEnded => self.state.is_listening = false,
            Command::ListeningFailed(reason) => {
                warn!("Speech recognition failed: {}", reason);
                self.state.is_listening = false;
                self.state.speech_error = Some(format!("Speech recognition error: {}", reason));
            }
            Command::SpeakTranslation => {
                if self.state.is_speaking {
                    self.stop_speaking();
                } else if !self.state.translated_text.is_empty() {
                    let text = self.state.translated_text.clone();
                    self.speak(&text);
                }
            }
            Command::StopSpeaking => self.stop_speaking(),
            Command::SpeechStarted => self.state.is_speaking = true,
            Command::SpeechEnded => self.state.is_speaking = false,
            Command::SwapLanguages => {
                self.interrupt();
                std::mem::swap(&mut self.state.source_lang, &mut self.state.target_lang);
                self.retranslate();
            }
            Command::SetSourceLang(lang) => {
                if lang != self.state.source_lang {
                    self.interrupt();
                    self.state.source_lang = lang;
                    self.retranslate();
                }
            }
            Command::SetTargetLang(lang) => {
                if lang != self.state.target_lang {
                    self.interrupt();
                    self.state.target_lang = lang;
                    self.retranslate();
                }
            }
            Command::Clear => {
                self.interrupt();
                self.cancel_debounce();
                self.invalidate_in_flight();
                self.state.transcript.reset();
                self.state.input_text.clear();
                self.state.translated_text.clear();
                self.state.origin = None;
                self.state.error = None;
            }
        }
    }

    fn handle_internal(&mut self, event: Internal) {
        match event {
            Internal::DebounceElapsed { timer } => {
                match self.state.pending_debounce.take() {
                    Some(pending) if pending.id == timer => self.trigger_translation(),
                    other => self.state.pending_debounce = other,
                }
            }
            Internal::AutoSpeakDue { timer } => self.auto_speak(timer),
            Internal::Resolved {
                sequence_id,
                outcome,
            } => self.accept(sequence_id, outcome),
        }
    }

    fn set_input(&mut self, text: String) {
        self.state.input_text = text;
        self.state.last_input_change_at = Instant::now();
        self.cancel_debounce();

        if self.state.input_text.trim().is_empty() {
            // Nothing to translate; anything still in flight is for older text
            self.invalidate_in_flight();
            self.state.translated_text.clear();
            self.state.origin = None;
            return;
        }

        let timer = self.start_timer(self.config.debounce, |timer| {
            Internal::DebounceElapsed { timer }
        });
        self.state.pending_debounce = Some(timer);
    }

    /// Re-run translation of the current input after a direction change.
    fn retranslate(&mut self) {
        self.cancel_debounce();
        self.invalidate_in_flight();
        if self.state.input_text.trim().is_empty() {
            return;
        }
        let timer = self.start_timer(self.config.debounce, |timer| {
            Internal::DebounceElapsed { timer }
        });
        self.state.pending_debounce = Some(timer);
    }

    fn trigger_translation(&mut self) {
        self.state.last_sequence_id += 1;
        let sequence_id = self.state.last_sequence_id;

        let request = match TranslationRequest::new(
            self.state.input_text.clone(),
            self.state.source_lang.clone(),
            self.state.target_lang.clone(),
        ) {
            Ok(request) => request,
            Err(e) => {
                self.state.is_translating = false;
                self.state.error = Some(e.to_string());
                return;
            }
        };

        debug!(
            "Translation #{} requested ({} -> {})",
            sequence_id, self.state.source_lang, self.state.target_lang
        );

        self.state.is_translating = true;
        self.state.error = None;

        let backend = Arc::clone(&self.backend);
        let internal_tx = self.internal_tx.clone();
        tokio::spawn(async move {
            let outcome = backend.resolve(&request).await;
            let _ = internal_tx.send(Internal::Resolved {
                sequence_id,
                outcome,
            });
        });
    }

    fn accept(&mut self, sequence_id: u64, outcome: Result<TranslationResult, TranslationError>) {
        if sequence_id != self.state.last_sequence_id {
            debug!(
                "Discarding stale translation #{} (latest is #{})",
                sequence_id, self.state.last_sequence_id
            );
            return;
        }

        self.state.is_translating = false;
        match outcome {
            Ok(result) => {
                debug!("Translation #{} accepted ({:?})", sequence_id, result.origin);
                self.state.translated_text = result.translated_text;
                self.state.origin = Some(result.origin);
                self.state.error = None;
                self.schedule_auto_speak(sequence_id);
            }
            Err(e) => {
                warn!("Translation #{} failed: {}", sequence_id, e);
                self.state.error = Some(format!("Translation failed: {}", e));
            }
        }
    }

    fn schedule_auto_speak(&mut self, sequence_id: u64) {
        self.cancel_auto_speak();
        let timer = self.start_timer(self.config.auto_speak_delay, |timer| {
            Internal::AutoSpeakDue { timer }
        });
        self.state.pending_auto_speak = Some(PendingSpeech {
            timer,
            sequence_id,
            text: self.state.translated_text.clone(),
        });
    }

    fn auto_speak(&mut self, timer: u64) {
        let pending = match self.state.pending_auto_speak.take() {
            Some(pending) if pending.timer.id == timer => pending,
            other => {
                self.state.pending_auto_speak = other;
                return;
            }
        };

        let idle = Instant::now().duration_since(self.state.last_input_change_at);
        let skip_reason = if pending.sequence_id != self.state.last_sequence_id {
            Some("superseded")
        } else if self.state.is_listening {
            Some("microphone active")
        } else if self.state.is_speaking {
            Some("already speaking")
        } else if idle < self.config.input_idle {
            Some("input still changing")
        } else {
            None
        };

        match skip_reason {
            Some(reason) => debug!(
                "Auto-speak for #{} skipped: {}",
                pending.sequence_id, reason
            ),
            None => self.speak(&pending.text),
        }
    }

    fn speak(&mut self, text: &str) {
        // Playback must never be captured by the microphone
        self.stop_listening();
        self.cancel_auto_speak();
        self.synthesizer
            .speak(text, language::speech_tag(&self.state.target_lang));
        self.state.is_speaking = true;
    }

    fn start_listening(&mut self) {
        if self.state.is_listening {
            return;
        }
        self.cancel_auto_speak();
        self.stop_speaking();
        self.state.speech_error = None;
        self.state.transcript.reset();
        self.set_input(String::new());
        self.recognizer
            .start(language::speech_tag(&self.state.source_lang));
        self.state.is_listening = true;
    }

    fn stop_listening(&mut self) {
        if self.state.is_listening {
            self.recognizer.stop();
            self.state.is_listening = false;
        }
    }

    fn stop_speaking(&mut self) {
        if self.state.is_speaking {
            self.synthesizer.stop();
            self.state.is_speaking = false;
        }
    }

    /// Stop both devices and drop any pending playback.
    fn interrupt(&mut self) {
        self.stop_listening();
        self.stop_speaking();
        self.cancel_auto_speak();
    }

    fn invalidate_in_flight(&mut self) {
        self.state.last_sequence_id += 1;
        self.state.is_translating = false;
    }

    fn cancel_debounce(&mut self) {
        if let Some(timer) = self.state.pending_debounce.take() {
            timer.cancel();
        }
    }

    fn cancel_auto_speak(&mut self) {
        if let Some(pending) = self.state.pending_auto_speak.take() {
            pending.timer.cancel();
        }
    }

    fn start_timer(&mut self, delay: Duration, fire: impl FnOnce(u64) -> Internal) -> Timer {
        self.next_timer_id += 1;
        let id = self.next_timer_id;
        let event = fire(id);
        let internal_tx = self.internal_tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = internal_tx.send(event);
        });
        Timer { id, handle }
    }
}
