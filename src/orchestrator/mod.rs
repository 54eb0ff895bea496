//! Live input orchestrator.
//!
//! Turns a noisy stream of input changes (keystrokes or speech transcripts)
//! into an ordered sequence of translation requests, shows only the result
//! of the latest one, and schedules speech playback so it never collides
//! with the microphone.
//!
//! ## Architecture
//!
//! ```text
//! UI / speech engines ─▸ Command ─┐
//!                                 ├─▸ Orchestrator task ─▸ Snapshot (watch)
//! timers / backend ─▸ Internal ───┘         │
//!                                           ├─▸ SpeechRecognizer start/stop
//!                                           └─▸ SpeechSynthesizer speak/stop
//! ```
//!
//! One task owns all state and handles one event at a time. Handlers never
//! await: remote calls and timers run as spawned tasks that report back on
//! the internal channel. Superseded results are recognized by comparing the
//! sequence id captured at request time against the current counter.

mod actor;
#[cfg(test)]
mod tests;

use crate::resolver::TranslationBackend;
use crate::speech::{SpeechRecognizer, SpeechSynthesizer, TranscriptUpdate};
use crate::types::{Origin, DEFAULT_SOURCE_LANG, DEFAULT_TARGET_LANG};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);
pub const DEFAULT_AUTO_SPEAK_DELAY: Duration = Duration::from_millis(700);
pub const DEFAULT_INPUT_IDLE: Duration = Duration::from_millis(900);

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Quiet period after the last input change before translating
    pub debounce: Duration,
    /// Delay between an accepted result and automatic playback
    pub auto_speak_delay: Duration,
    /// Minimum time since the last input change for automatic playback
    pub input_idle: Duration,
    pub source_lang: String,
    pub target_lang: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            auto_speak_delay: DEFAULT_AUTO_SPEAK_DELAY,
            input_idle: DEFAULT_INPUT_IDLE,
            source_lang: DEFAULT_SOURCE_LANG.to_string(),
            target_lang: DEFAULT_TARGET_LANG.to_string(),
        }
    }
}

/// Events accepted from the UI and from the speech engines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// The typed input changed
    InputChanged(String),
    /// The recognizer reported a new transcript
    Transcript(TranscriptUpdate),
    StartListening,
    StopListening,
    /// The recognizer stopped on its own
    ListeningEnded,
    /// The recognizer failed to start or aborted with an error
    ListeningFailed(String),
    /// Play the current translation, or stop playback if already speaking
    SpeakTranslation,
    StopSpeaking,
    /// The synthesizer began an utterance
    SpeechStarted,
    /// The synthesizer finished or failed an utterance
    SpeechEnded,
    SwapLanguages,
    SetSourceLang(String),
    SetTargetLang(String),
    Clear,
}

/// UI-visible state, published after every handled event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub input_text: String,
    pub translated_text: String,
    pub origin: Option<Origin>,
    pub error: Option<String>,
    /// Last microphone failure, cleared when listening starts again
    pub speech_error: Option<String>,
    pub is_translating: bool,
    pub is_listening: bool,
    pub is_speaking: bool,
    pub source_lang: String,
    pub target_lang: String,
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("orchestrator has shut down")]
pub struct OrchestratorClosed;

/// Cheap, cloneable front door to a running orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshot: watch::Receiver<Snapshot>,
}

impl OrchestratorHandle {
    pub fn send(&self, command: Command) -> Result<(), OrchestratorClosed> {
        self.commands.send(command).map_err(|_| OrchestratorClosed)
    }

    pub fn input_changed(&self, text: impl Into<String>) -> Result<(), OrchestratorClosed> {
        self.send(Command::InputChanged(text.into()))
    }

    pub fn transcript(&self, update: TranscriptUpdate) -> Result<(), OrchestratorClosed> {
        self.send(Command::Transcript(update))
    }

    pub fn start_listening(&self) -> Result<(), OrchestratorClosed> {
        self.send(Command::StartListening)
    }

    pub fn stop_listening(&self) -> Result<(), OrchestratorClosed> {
        self.send(Command::StopListening)
    }

    pub fn speak_translation(&self) -> Result<(), OrchestratorClosed> {
        self.send(Command::SpeakTranslation)
    }

    pub fn swap_languages(&self) -> Result<(), OrchestratorClosed> {
        self.send(Command::SwapLanguages)
    }

    pub fn clear(&self) -> Result<(), OrchestratorClosed> {
        self.send(Command::Clear)
    }

    /// Latest published state.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.borrow().clone()
    }

    /// A receiver that is notified whenever the published state changes.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot.clone()
    }
}

/// Start an orchestrator task on the current tokio runtime.
///
/// The task exits once every handle has been dropped, cancelling its timers
/// and stopping both speech devices.
pub fn spawn(
    config: OrchestratorConfig,
    backend: Arc<dyn TranslationBackend>,
    recognizer: Box<dyn SpeechRecognizer>,
    synthesizer: Box<dyn SpeechSynthesizer>,
) -> (OrchestratorHandle, JoinHandle<()>) {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (internal_tx, internal_rx) = mpsc::unbounded_channel();

    let orchestrator = actor::Orchestrator::new(config, backend, recognizer, synthesizer, internal_tx);
    let (snapshot_tx, snapshot_rx) = watch::channel(orchestrator.snapshot());

    let task = tokio::spawn(orchestrator.run(command_rx, internal_rx, snapshot_tx));

    (
        OrchestratorHandle {
            commands: command_tx,
            snapshot: snapshot_rx,
        },
        task,
    )
}
