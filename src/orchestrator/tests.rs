use super::*;
use crate::error::TranslationError;
use crate::speech::TranscriptPiece;
use crate::types::{TranslationRequest, TranslationResult};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::HashMap;
use std::sync::Mutex;

// ==================== Fakes ====================

/// Backend with per-text latency and replies; unknown texts answer
/// `<text>` after 50ms.
#[derive(Default)]
struct ScriptedBackend {
    replies: HashMap<String, (Duration, Result<String, TranslationError>)>,
    calls: Mutex<Vec<(String, String, String)>>,
}

impl ScriptedBackend {
    fn reply(mut self, text: &str, delay_ms: u64, reply: Result<&str, TranslationError>) -> Self {
        self.replies.insert(
            text.to_string(),
            (
                Duration::from_millis(delay_ms),
                reply.map(|s| s.to_string()),
            ),
        );
        self
    }

    fn calls(&self) -> Vec<(String, String, String)> {
        self.calls.lock().unwrap().clone()
    }

    fn texts(&self) -> Vec<String> {
        self.calls().into_iter().map(|(text, _, _)| text).collect()
    }
}

impl TranslationBackend for ScriptedBackend {
    fn resolve<'a>(
        &'a self,
        request: &'a TranslationRequest,
    ) -> BoxFuture<'a, Result<TranslationResult, TranslationError>> {
        async move {
            self.calls.lock().unwrap().push((
                request.text().to_string(),
                request.source_lang().to_string(),
                request.target_lang().to_string(),
            ));
            let (delay, reply) = self
                .replies
                .get(request.text())
                .cloned()
                .unwrap_or_else(|| (Duration::from_millis(50), Ok(format!("<{}>", request.text()))));

            tokio::time::sleep(delay).await;

            reply.map(|translated_text| TranslationResult {
                original_text: request.text().to_string(),
                translated_text,
                source_lang: request.source_lang().to_string(),
                target_lang: request.target_lang().to_string(),
                origin: Origin::Remote,
            })
        }
        .boxed()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DeviceCall {
    MicStart(String),
    MicStop,
    Speak(String, String),
    SpeechStop,
}

/// Records every command sent to either speech device, in order.
#[derive(Debug, Clone, Default)]
struct Devices(Arc<Mutex<Vec<DeviceCall>>>);

impl Devices {
    fn calls(&self) -> Vec<DeviceCall> {
        self.0.lock().unwrap().clone()
    }

    fn spoken(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                DeviceCall::Speak(text, _) => Some(text),
                _ => None,
            })
            .collect()
    }
}

impl SpeechRecognizer for Devices {
    fn start(&mut self, speech_tag: &str) {
        self.0
            .lock()
            .unwrap()
            .push(DeviceCall::MicStart(speech_tag.to_string()));
    }

    fn stop(&mut self) {
        self.0.lock().unwrap().push(DeviceCall::MicStop);
    }
}

impl SpeechSynthesizer for Devices {
    fn speak(&mut self, text: &str, speech_tag: &str) {
        self.0
            .lock()
            .unwrap()
            .push(DeviceCall::Speak(text.to_string(), speech_tag.to_string()));
    }

    fn stop(&mut self) {
        self.0.lock().unwrap().push(DeviceCall::SpeechStop);
    }
}

fn start(backend: ScriptedBackend) -> (OrchestratorHandle, Arc<ScriptedBackend>, Devices) {
    let backend = Arc::new(backend);
    let devices = Devices::default();
    let (handle, _task) = spawn(
        OrchestratorConfig::default(),
        backend.clone(),
        Box::new(devices.clone()),
        Box::new(devices.clone()),
    );
    (handle, backend, devices)
}

/// Advance the paused clock, letting the orchestrator process everything due.
async fn advance(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

fn upstream(message: &str) -> TranslationError {
    TranslationError::Upstream {
        status: Some(503),
        message: message.to_string(),
    }
}

// ==================== Debounce ====================

#[tokio::test(start_paused = true)]
async fn test_debounce_coalesces_rapid_input() {
    let (handle, backend, _devices) = start(ScriptedBackend::default());

    handle.input_changed("h").unwrap();
    advance(100).await;
    handle.input_changed("he").unwrap();
    advance(100).await;
    handle.input_changed("hello").unwrap();
    advance(400).await;

    // 400ms after the last change: still waiting
    assert!(backend.texts().is_empty());

    advance(200).await;
    assert_eq!(backend.texts(), vec!["hello"]);

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.translated_text, "<hello>");
    assert_eq!(snapshot.origin, Some(Origin::Remote));
    assert!(!snapshot.is_translating);
}

#[tokio::test(start_paused = true)]
async fn test_translating_flag_while_in_flight() {
    let (handle, _backend, _devices) =
        start(ScriptedBackend::default().reply("slow", 1000, Ok("SLOW")));

    handle.input_changed("slow").unwrap();
    advance(600).await;
    assert!(handle.snapshot().is_translating);

    advance(1000).await;
    let snapshot = handle.snapshot();
    assert!(!snapshot.is_translating);
    assert_eq!(snapshot.translated_text, "SLOW");
}

#[tokio::test(start_paused = true)]
async fn test_blank_input_clears_translation_without_request() {
    let (handle, backend, _devices) = start(ScriptedBackend::default());

    handle.input_changed("hello").unwrap();
    advance(600).await;
    assert_eq!(handle.snapshot().translated_text, "<hello>");

    handle.input_changed("   ").unwrap();
    advance(2000).await;

    assert_eq!(backend.texts(), vec!["hello"]);
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.translated_text, "");
    assert_eq!(snapshot.origin, None);
}

#[tokio::test(start_paused = true)]
async fn test_oversized_input_surfaces_validation_error() {
    let (handle, backend, _devices) = start(ScriptedBackend::default());

    handle.input_changed("あ".repeat(5001)).unwrap();
    advance(600).await;

    assert!(backend.texts().is_empty());
    let error = handle.snapshot().error.expect("error should be shown");
    assert!(error.contains("5000"));
}

// ==================== Sequencing ====================

#[tokio::test(start_paused = true)]
async fn test_late_result_never_overwrites_newer_one() {
    let (handle, backend, devices) = start(
        ScriptedBackend::default()
            .reply("first", 1000, Ok("FIRST"))
            .reply("second", 10, Ok("SECOND")),
    );

    // Request #1 issued at 500ms, resolves at 1500ms
    handle.input_changed("first").unwrap();
    advance(600).await;
    // Request #2 issued at 1100ms, resolves at 1110ms
    handle.input_changed("second").unwrap();
    advance(600).await;
    assert_eq!(handle.snapshot().translated_text, "SECOND");

    advance(1400).await;
    assert_eq!(backend.texts(), vec!["first", "second"]);
    assert_eq!(handle.snapshot().translated_text, "SECOND");
    assert_eq!(devices.spoken(), vec!["SECOND"]);
}

#[tokio::test(start_paused = true)]
async fn test_stale_error_is_discarded() {
    let (handle, _backend, _devices) = start(
        ScriptedBackend::default()
            .reply("first", 1000, Err(upstream("boom")))
            .reply("second", 10, Ok("SECOND")),
    );

    handle.input_changed("first").unwrap();
    advance(600).await;
    handle.input_changed("second").unwrap();
    advance(2000).await;

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.translated_text, "SECOND");
    assert_eq!(snapshot.error, None);
}

#[tokio::test(start_paused = true)]
async fn test_latest_error_is_shown_and_keeps_previous_translation() {
    let (handle, _backend, devices) =
        start(ScriptedBackend::default().reply("bad", 10, Err(upstream("unavailable"))));

    handle.input_changed("good").unwrap();
    advance(600).await;
    assert_eq!(handle.snapshot().translated_text, "<good>");

    handle.input_changed("bad").unwrap();
    advance(3000).await;

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.translated_text, "<good>");
    let error = snapshot.error.expect("error should be shown");
    assert!(error.contains("unavailable"));
    assert!(!snapshot.is_translating);
    // Only the earlier, accepted result was ever spoken
    assert!(devices.spoken().iter().all(|text| text == "<good>"));
}

#[tokio::test(start_paused = true)]
async fn test_new_request_clears_error() {
    let (handle, _backend, _devices) =
        start(ScriptedBackend::default().reply("bad", 10, Err(upstream("unavailable"))));

    handle.input_changed("bad").unwrap();
    advance(600).await;
    assert!(handle.snapshot().error.is_some());

    handle.input_changed("good").unwrap();
    advance(600).await;
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.error, None);
    assert_eq!(snapshot.translated_text, "<good>");
}

// ==================== Auto-speak ====================

#[tokio::test(start_paused = true)]
async fn test_auto_speak_after_settled_result() {
    let (handle, _backend, devices) = start(ScriptedBackend::default());

    // Result accepted at 550ms, auto-speak due at 1250ms
    handle.input_changed("hello").unwrap();
    advance(1200).await;
    assert!(devices.spoken().is_empty());

    advance(100).await;
    assert_eq!(
        devices.calls(),
        vec![DeviceCall::Speak("<hello>".to_string(), "en-US".to_string())]
    );
    assert!(handle.snapshot().is_speaking);
}

#[tokio::test(start_paused = true)]
async fn test_auto_speak_suppressed_by_recent_input() {
    let (handle, _backend, devices) = start(ScriptedBackend::default());

    handle.input_changed("hello").unwrap();
    advance(1000).await;
    // 250ms before the auto-speak fires
    handle.input_changed("hello!").unwrap();
    advance(1000).await;
    assert!(devices.spoken().is_empty());

    // "hello!" settles: request at 1500ms, result at 1550ms, speech at 2250ms
    advance(300).await;
    assert_eq!(devices.spoken(), vec!["<hello!>"]);
}

#[tokio::test(start_paused = true)]
async fn test_auto_speak_skipped_while_engine_is_speaking() {
    let (handle, _backend, devices) = start(ScriptedBackend::default());

    handle.input_changed("hello").unwrap();
    advance(700).await;
    handle.send(Command::SpeechStarted).unwrap();
    advance(1000).await;

    assert!(devices.spoken().is_empty());
    assert!(handle.snapshot().is_speaking);
}

#[tokio::test(start_paused = true)]
async fn test_starting_microphone_cancels_pending_auto_speak() {
    let (handle, _backend, devices) = start(ScriptedBackend::default());

    handle.input_changed("hello").unwrap();
    advance(800).await;
    handle.start_listening().unwrap();
    advance(3000).await;

    assert_eq!(devices.calls(), vec![DeviceCall::MicStart("ja-JP".to_string())]);
    let snapshot = handle.snapshot();
    assert!(snapshot.is_listening);
    assert_eq!(snapshot.input_text, "");
    assert_eq!(snapshot.translated_text, "");
}

#[tokio::test(start_paused = true)]
async fn test_auto_speak_never_fires_while_listening() {
    let (handle, backend, devices) = start(ScriptedBackend::default());

    handle.start_listening().unwrap();
    handle
        .transcript(TranscriptUpdate::final_text("こんにちは", "ja-JP"))
        .unwrap();
    advance(3000).await;

    assert_eq!(backend.texts(), vec!["こんにちは"]);
    assert_eq!(handle.snapshot().translated_text, "<こんにちは>");
    assert!(devices.spoken().is_empty());
}

// ==================== Microphone and playback ====================

#[tokio::test(start_paused = true)]
async fn test_manual_speak_stops_microphone_first() {
    let (handle, _backend, devices) = start(ScriptedBackend::default());

    handle.start_listening().unwrap();
    handle
        .transcript(TranscriptUpdate::final_text("こんにちは", "ja-JP"))
        .unwrap();
    advance(600).await;
    handle.speak_translation().unwrap();
    advance(10).await;

    assert_eq!(
        devices.calls(),
        vec![
            DeviceCall::MicStart("ja-JP".to_string()),
            DeviceCall::MicStop,
            DeviceCall::Speak("<こんにちは>".to_string(), "en-US".to_string()),
        ]
    );
    let snapshot = handle.snapshot();
    assert!(!snapshot.is_listening);
    assert!(snapshot.is_speaking);
}

#[tokio::test(start_paused = true)]
async fn test_manual_speak_bypasses_idle_check_and_toggles() {
    let (handle, _backend, devices) = start(ScriptedBackend::default());

    handle.input_changed("hello").unwrap();
    advance(600).await;
    // Input changed 600ms ago, well inside the idle window
    handle.speak_translation().unwrap();
    advance(10).await;
    assert_eq!(devices.spoken(), vec!["<hello>"]);

    handle.speak_translation().unwrap();
    advance(10).await;
    assert_eq!(devices.calls().last(), Some(&DeviceCall::SpeechStop));
    assert!(!handle.snapshot().is_speaking);

    // The auto-speak timer was cancelled by the manual playback
    advance(2000).await;
    assert_eq!(devices.spoken(), vec!["<hello>"]);
}

#[tokio::test(start_paused = true)]
async fn test_manual_speak_without_translation_is_noop() {
    let (handle, _backend, devices) = start(ScriptedBackend::default());

    handle.speak_translation().unwrap();
    advance(10).await;

    assert!(devices.calls().is_empty());
    assert!(!handle.snapshot().is_speaking);
}

#[tokio::test(start_paused = true)]
async fn test_starting_microphone_stops_playback() {
    let (handle, _backend, devices) = start(ScriptedBackend::default());

    handle.input_changed("hello").unwrap();
    advance(2000).await;
    assert!(handle.snapshot().is_speaking);

    handle.start_listening().unwrap();
    advance(10).await;

    assert_eq!(
        devices.calls()[1..].to_vec(),
        vec![
            DeviceCall::SpeechStop,
            DeviceCall::MicStart("ja-JP".to_string()),
        ]
    );
    let snapshot = handle.snapshot();
    assert!(snapshot.is_listening);
    assert!(!snapshot.is_speaking);
}

#[tokio::test(start_paused = true)]
async fn test_engine_events_update_flags() {
    let (handle, _backend, devices) = start(ScriptedBackend::default());

    handle.start_listening().unwrap();
    advance(10).await;
    handle.send(Command::ListeningEnded).unwrap();
    handle.send(Command::SpeechStarted).unwrap();
    advance(10).await;
    let snapshot = handle.snapshot();
    assert!(!snapshot.is_listening);
    assert!(snapshot.is_speaking);

    handle.send(Command::SpeechEnded).unwrap();
    advance(10).await;
    assert!(!handle.snapshot().is_speaking);
    // The engine stopped on its own; no stop command was sent
    assert_eq!(devices.calls(), vec![DeviceCall::MicStart("ja-JP".to_string())]);
}

#[tokio::test(start_paused = true)]
async fn test_listening_failure_is_displayed() {
    let (handle, _backend, _devices) = start(ScriptedBackend::default());

    handle.start_listening().unwrap();
    handle
        .send(Command::ListeningFailed("not-allowed".to_string()))
        .unwrap();
    advance(10).await;

    let snapshot = handle.snapshot();
    assert!(!snapshot.is_listening);
    assert_eq!(
        snapshot.speech_error.as_deref(),
        Some("Speech recognition error: not-allowed")
    );
    assert_eq!(snapshot.error, None);

    // A fresh session clears the banner
    handle.start_listening().unwrap();
    advance(10).await;
    let snapshot = handle.snapshot();
    assert!(snapshot.is_listening);
    assert_eq!(snapshot.speech_error, None);
}

#[tokio::test(start_paused = true)]
async fn test_transcript_shows_final_and_interim_text() {
    let (handle, _backend, _devices) = start(ScriptedBackend::default());

    handle.start_listening().unwrap();
    handle
        .transcript(TranscriptUpdate {
            pieces: vec![
                TranscriptPiece {
                    text: "おはよう".to_string(),
                    is_final: true,
                },
                TranscriptPiece {
                    text: "ござ".to_string(),
                    is_final: false,
                },
            ],
            speech_tag: "ja-JP".to_string(),
        })
        .unwrap();
    advance(10).await;

    assert_eq!(handle.snapshot().input_text, "おはようござ");
}

// ==================== Swap, language change, clear ====================

#[tokio::test(start_paused = true)]
async fn test_swap_stops_devices_and_retranslates() {
    let (handle, backend, devices) = start(ScriptedBackend::default());

    handle.input_changed("hello").unwrap();
    advance(2000).await;
    assert!(handle.snapshot().is_speaking);

    handle.swap_languages().unwrap();
    advance(10).await;
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.source_lang, "en");
    assert_eq!(snapshot.target_lang, "ja");
    assert!(!snapshot.is_speaking);
    assert_eq!(devices.calls().last(), Some(&DeviceCall::SpeechStop));

    advance(600).await;
    assert_eq!(
        backend.calls(),
        vec![
            ("hello".to_string(), "ja".to_string(), "en".to_string()),
            ("hello".to_string(), "en".to_string(), "ja".to_string()),
        ]
    );

    // Input has been idle for long enough; the re-translation is spoken in Japanese
    advance(1000).await;
    assert_eq!(
        devices.calls().last(),
        Some(&DeviceCall::Speak("<hello>".to_string(), "ja-JP".to_string()))
    );
}

#[tokio::test(start_paused = true)]
async fn test_swap_discards_in_flight_result() {
    let (handle, _backend, devices) =
        start(ScriptedBackend::default().reply("slow", 1000, Ok("SLOW")));

    // Request #1 (ja -> en) resolves at 1500ms
    handle.input_changed("slow").unwrap();
    advance(600).await;
    // The re-translation (en -> ja) is issued at 1100ms and resolves at 2100ms
    handle.swap_languages().unwrap();
    advance(1000).await;

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.translated_text, "");
    assert!(snapshot.is_translating);

    advance(4000).await;
    assert_eq!(handle.snapshot().translated_text, "SLOW");
    assert_eq!(devices.spoken(), vec!["SLOW"]);
    assert_eq!(
        devices.calls(),
        vec![DeviceCall::Speak("SLOW".to_string(), "ja-JP".to_string())]
    );
}

#[tokio::test(start_paused = true)]
async fn test_set_target_language_retranslates() {
    let (handle, backend, _devices) = start(ScriptedBackend::default());

    handle.input_changed("hello").unwrap();
    advance(600).await;
    handle.send(Command::SetTargetLang("de".to_string())).unwrap();
    advance(600).await;

    assert_eq!(
        backend.calls().last(),
        Some(&("hello".to_string(), "ja".to_string(), "de".to_string()))
    );
    assert_eq!(handle.snapshot().target_lang, "de");
}

#[tokio::test(start_paused = true)]
async fn test_setting_current_language_is_noop() {
    let (handle, backend, devices) = start(ScriptedBackend::default());

    handle.input_changed("hello").unwrap();
    advance(2000).await;
    assert!(handle.snapshot().is_speaking);

    handle.send(Command::SetSourceLang("ja".to_string())).unwrap();
    handle.send(Command::SetTargetLang("en".to_string())).unwrap();
    advance(2000).await;

    assert_eq!(backend.texts(), vec!["hello"]);
    assert!(handle.snapshot().is_speaking);
    assert_ne!(devices.calls().last(), Some(&DeviceCall::SpeechStop));
}

#[tokio::test(start_paused = true)]
async fn test_clear_resets_everything() {
    let (handle, _backend, devices) =
        start(ScriptedBackend::default().reply("slow", 1000, Ok("SLOW")));

    handle.input_changed("slow").unwrap();
    advance(600).await;
    handle.clear().unwrap();
    advance(5000).await;

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.input_text, "");
    assert_eq!(snapshot.translated_text, "");
    assert_eq!(snapshot.error, None);
    assert!(!snapshot.is_translating);
    assert!(devices.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_clear_stops_microphone_and_playback() {
    let (handle, _backend, devices) = start(ScriptedBackend::default());

    handle.input_changed("hello").unwrap();
    advance(2000).await;
    assert!(handle.snapshot().is_speaking);

    handle.clear().unwrap();
    advance(10).await;
    assert_eq!(devices.calls().last(), Some(&DeviceCall::SpeechStop));

    handle.start_listening().unwrap();
    handle.clear().unwrap();
    advance(10).await;
    assert_eq!(devices.calls().last(), Some(&DeviceCall::MicStop));
    assert!(!handle.snapshot().is_listening);
}

#[tokio::test(start_paused = true)]
async fn test_task_exits_when_handles_are_dropped() {
    let backend = Arc::new(ScriptedBackend::default());
    let devices = Devices::default();
    let (handle, task) = spawn(
        OrchestratorConfig::default(),
        backend,
        Box::new(devices.clone()),
        Box::new(devices.clone()),
    );

    handle.start_listening().unwrap();
    drop(handle);
    task.await.expect("task should exit cleanly");

    assert_eq!(
        devices.calls(),
        vec![DeviceCall::MicStart("ja-JP".to_string()), DeviceCall::MicStop]
    );
}
