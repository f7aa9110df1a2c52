//! End-to-end: events through the dispatcher, the real bridge client and a
//! counting in-process engine.

#![allow(unsafe_code, clippy::unwrap_used, clippy::expect_used)]

use std::{
    ffi::{CStr, CString, c_char},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use {
    async_trait::async_trait,
    ely_bridge::{BridgeClient, EngineAbi},
    ely_channels::{
        ChannelOutbound, CommandOption, Dispatcher, Disposition, InteractionEvent,
        InteractionOutbound, MessageEvent, Rejection, Result, Stage,
    },
    ely_common::Localizer,
    secrecy::Secret,
};

// ── Engine ──────────────────────────────────────────────────────────────────

/// Answers with a fixed reply (or null) and counts calls and releases.
struct CountingEngine {
    reply: Option<String>,
    calls: AtomicUsize,
    released: AtomicUsize,
    last_kind: Mutex<Option<String>>,
}

impl CountingEngine {
    fn new(reply: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.map(String::from),
            calls: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
            last_kind: Mutex::new(None),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

unsafe impl EngineAbi for CountingEngine {
    fn process(&self, kind: &CStr, _prompt: &CStr, _subject_id: &CStr, _api_key: &CStr) -> *mut c_char {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_kind.lock().unwrap() = Some(kind.to_string_lossy().into_owned());
        match &self.reply {
            Some(text) => CString::new(text.as_str()).unwrap().into_raw(),
            None => std::ptr::null_mut(),
        }
    }

    unsafe fn release(&self, reply: *mut c_char) {
        self.released.fetch_add(1, Ordering::SeqCst);
        drop(unsafe { CString::from_raw(reply) });
    }
}

// ── Platform ────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Platform {
    log: Mutex<Vec<String>>,
    fail_defer: bool,
}

impl Platform {
    fn push(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }

    fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChannelOutbound for Platform {
    async fn send_text(&self, channel_id: &str, text: &str) -> Result<()> {
        self.push(format!("send {channel_id}: {text}"));
        Ok(())
    }

    async fn send_typing(&self, channel_id: &str) -> Result<()> {
        self.push(format!("typing {channel_id}"));
        Ok(())
    }
}

#[async_trait]
impl InteractionOutbound for Platform {
    type Handle = u64;

    async fn respond(&self, handle: &u64, text: &str) -> Result<()> {
        self.push(format!("respond {handle}: {text}"));
        Ok(())
    }

    async fn defer(&self, handle: &u64) -> Result<()> {
        self.push(format!("defer {handle}"));
        if self.fail_defer {
            return Err(ely_channels::Error::external(
                "defer interaction",
                std::io::Error::other("interaction expired"),
            ));
        }
        Ok(())
    }

    async fn edit_response(&self, handle: &u64, text: &str) -> Result<()> {
        self.push(format!("edit {handle}: {text}"));
        Ok(())
    }

    async fn followup(&self, handle: &u64, text: &str, ephemeral: bool) -> Result<()> {
        self.push(format!("followup {handle} ephemeral={ephemeral}: {text}"));
        Ok(())
    }
}

// ── Helpers ─────────────────────────────────────────────────────────────────

fn dispatcher(engine: &Arc<CountingEngine>) -> Dispatcher {
    let engine: Arc<dyn EngineAbi> = Arc::clone(engine) as Arc<dyn EngineAbi>;
    let messages = Localizer::default();
    let bridge = BridgeClient::new(engine, messages.clone());
    Dispatcher::new(Arc::new(bridge), Secret::new("google-key".into()), messages)
}

fn message(content: &str, server_id: Option<&str>) -> MessageEvent {
    MessageEvent {
        content: content.into(),
        author_id: "42".into(),
        author_is_bot: false,
        channel_id: "7".into(),
        server_id: server_id.map(String::from),
    }
}

fn slash(name: &str, prompt: &str) -> InteractionEvent<u64> {
    InteractionEvent {
        name: name.into(),
        options: vec![CommandOption::new("prompt", prompt)],
        server_id: Some("900".into()),
        user_id: None,
        member_user_id: Some("42".into()),
        handle: 1,
    }
}

// ── Scenarios ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn blank_prompt_never_reaches_engine() {
    let engine = CountingEngine::new(Some("unused"));
    let platform = Platform::default();

    let d = dispatcher(&engine)
        .handle_message(&platform, message("!ely   ", None))
        .await;

    assert_eq!(d, Disposition::Rejected(Rejection::PromptMissing));
    assert_eq!(engine.calls(), 0);
    assert_eq!(platform.log().len(), 1);
    assert!(platform.log()[0].contains("Please provide a prompt"));
}

#[tokio::test]
async fn server_command_outside_server_never_reaches_engine() {
    let engine = CountingEngine::new(Some("unused"));
    let platform = Platform::default();

    dispatcher(&engine)
        .handle_message(&platform, message("!elyall hi", None))
        .await;

    assert_eq!(engine.calls(), 0);
    assert_eq!(platform.log(), vec![
        "send 7: The `!elyall` command can only be used in a server channel.".to_string()
    ]);
}

#[tokio::test]
async fn engine_error_is_prefixed_and_released() {
    let engine = CountingEngine::new(Some("Error: rate limited"));
    let platform = Platform::default();

    dispatcher(&engine)
        .handle_message(&platform, message("!ely hi", None))
        .await;

    assert_eq!(platform.log(), vec![
        "typing 7".to_string(),
        "send 7: Ely encountered a hiccup: Error: rate limited".to_string(),
    ]);
    assert_eq!(engine.calls(), 1);
    assert_eq!(engine.released(), 1);
    assert_eq!(engine.last_kind.lock().unwrap().as_deref(), Some("user"));
}

#[tokio::test]
async fn null_engine_reply_is_never_shown_raw() {
    let engine = CountingEngine::new(None);
    let platform = Platform::default();

    dispatcher(&engine)
        .handle_message(&platform, message("!elyall hi", Some("900")))
        .await;

    let log = platform.log();
    assert_eq!(log.len(), 2);
    assert_eq!(
        log[1],
        "send 7: Ely encountered a hiccup: Critical Error: the processing engine returned no response."
    );
    assert_eq!(engine.released(), 0);
    assert_eq!(engine.last_kind.lock().unwrap().as_deref(), Some("server"));
}

#[tokio::test]
async fn long_interaction_reply_is_edited_with_inline_notice() {
    let engine = CountingEngine::new(Some("r".repeat(2500).as_str()));
    let platform = Platform::default();

    let d = dispatcher(&engine)
        .handle_interaction(&platform, slash("ely", "tell me everything"))
        .await;

    let log = platform.log();
    assert_eq!(log.len(), 2, "no followup expected: {log:?}");
    assert_eq!(log[0], "defer 1");
    let edited = log[1].strip_prefix("edit 1: ").unwrap();
    assert!(edited.chars().count() <= 2000);
    let (primary, notice) = edited.split_once('\n').unwrap();
    let body = primary.strip_suffix("...").unwrap();
    assert!(body.chars().count() <= 1990);
    assert_eq!(notice, "(Message truncated due to length)");

    assert!(matches!(d, Disposition::Deferred(r) if r.final_stage() == Stage::EditOk));
    assert_eq!(engine.released(), 1);
}

#[tokio::test]
async fn failed_acknowledgment_sends_one_followup_and_no_edit() {
    let engine = CountingEngine::new(Some("unused"));
    let platform = Platform {
        fail_defer: true,
        ..Default::default()
    };

    dispatcher(&engine)
        .handle_interaction(&platform, slash("elyall", "hi"))
        .await;

    assert_eq!(platform.log(), vec![
        "defer 1".to_string(),
        "followup 1 ephemeral=true: Error: Failed to properly acknowledge command.".to_string(),
    ]);
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn concurrent_events_release_every_reply_once() {
    let engine = CountingEngine::new(Some("pong"));
    let dispatcher = dispatcher(&engine);
    let platform = Arc::new(Platform::default());

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let dispatcher = dispatcher.clone();
            let platform = Arc::clone(&platform);
            tokio::spawn(async move {
                dispatcher
                    .handle_message(platform.as_ref(), message(&format!("!ely ping {i}"), None))
                    .await
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(engine.calls(), 16);
    assert_eq!(engine.released(), 16);
}
