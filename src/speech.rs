//! Seams to the speech engines.
//!
//! The recognizer and synthesizer are devices owned by the platform; the
//! orchestrator only sends them start/stop commands and receives their
//! events back through its handle.

use serde::{Deserialize, Serialize};
use tracing::info;

/// Speech-to-text engine (microphone capture).
pub trait SpeechRecognizer: Send {
    fn start(&mut self, speech_tag: &str);
    fn stop(&mut self);
}

/// Text-to-speech engine (speaker output).
pub trait SpeechSynthesizer: Send {
    fn speak(&mut self, text: &str, speech_tag: &str);
    fn stop(&mut self);
}

/// One recognition result as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptPiece {
    pub text: String,
    pub is_final: bool,
}

/// A transcript event: the engine's full current result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptUpdate {
    pub pieces: Vec<TranscriptPiece>,
    pub speech_tag: String,
}

impl TranscriptUpdate {
    pub fn interim(text: impl Into<String>, speech_tag: impl Into<String>) -> Self {
        Self {
            pieces: vec![TranscriptPiece {
                text: text.into(),
                is_final: false,
            }],
            speech_tag: speech_tag.into(),
        }
    }

    pub fn final_text(text: impl Into<String>, speech_tag: impl Into<String>) -> Self {
        Self {
            pieces: vec![TranscriptPiece {
                text: text.into(),
                is_final: true,
            }],
            speech_tag: speech_tag.into(),
        }
    }
}

/// Folds transcript updates into the text shown as input.
///
/// The displayed text is the latest final text followed by whatever is
/// still interim.
#[derive(Debug, Default, Clone)]
pub struct TranscriptAccumulator {
    final_text: String,
}

impl TranscriptAccumulator {
    pub fn reset(&mut self) {
        self.final_text.clear();
    }

    pub fn apply(&mut self, update: &TranscriptUpdate) -> String {
        let mut finals = String::new();
        let mut interim = String::new();
        for piece in &update.pieces {
            if piece.is_final {
                finals.push_str(&piece.text);
            } else {
                interim.push_str(&piece.text);
            }
        }

        if !finals.is_empty() {
            self.final_text = finals;
        }

        format!("{}{}", self.final_text, interim)
    }
}

/// Synthesizer that only logs, for environments without an audio device.
#[derive(Debug, Default)]
pub struct LoggingSynthesizer;

impl SpeechSynthesizer for LoggingSynthesizer {
    fn speak(&mut self, text: &str, speech_tag: &str) {
        info!("🔊 [{}] {}", speech_tag, text);
    }

    fn stop(&mut self) {
        info!("🔇 Speech stopped");
    }
}

/// Recognizer for environments without a microphone.
#[derive(Debug, Default)]
pub struct NoopRecognizer;

impl SpeechRecognizer for NoopRecognizer {
    fn start(&mut self, speech_tag: &str) {
        info!("Microphone capture is unavailable ({})", speech_tag);
    }

    fn stop(&mut self) {}
}
