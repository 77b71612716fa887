//! Chat-level scenarios driven through the command dispatcher.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use zonehub_allocation::MemoryZoneAllocator;
use zonehub_core::config::AppConfig;
use zonehub_core::events::DomainEvent;
use zonehub_core::traits::Clock;
use zonehub_core::types::{ChatId, ChatRef, UserRef};
use zonehub_service::{BoardFormatter, CommandDispatcher, SessionGate, StaticAdminDirectory};

const GROUP: i64 = -1_001_234;

/// Clock that follows Tokio's paused time.
#[derive(Debug)]
struct TokioClock {
    origin: tokio::time::Instant,
    base: DateTime<Utc>,
}

impl Clock for TokioClock {
    fn now(&self) -> DateTime<Utc> {
        self.base + chrono::Duration::from_std(self.origin.elapsed()).unwrap()
    }
}

struct Harness {
    dispatcher: CommandDispatcher,
    events: broadcast::Receiver<DomainEvent>,
    config: AppConfig,
}

impl Harness {
    fn new() -> Self {
        let mut config = AppConfig::default();
        config.session.creator = "@boss".to_string();
        config.session.admins = vec!["@mod".to_string()];

        let clock: Arc<dyn Clock> = Arc::new(TokioClock {
            origin: tokio::time::Instant::now(),
            base: DateTime::<Utc>::from_timestamp(1_780_000_000, 0).unwrap(),
        });
        let (tx, events) = broadcast::channel(64);
        let gate = SessionGate::new(
            Arc::new(MemoryZoneAllocator::new(config.board.zone_count)),
            &config.session,
            &config.rotation,
            Arc::clone(&clock),
            tx,
        );
        let dispatcher = CommandDispatcher::new(
            Arc::new(gate),
            Arc::new(StaticAdminDirectory::from_config(&config.session)),
            BoardFormatter::new(&config.board, &config.rotation, &config.presentation),
            clock,
        );
        Self {
            dispatcher,
            events,
            config,
        }
    }

    async fn say(&self, who: &str, text: &str) -> Vec<String> {
        self.dispatcher
            .handle(ChatRef::group(GROUP), &UserRef::new(10, Some(who)), text)
            .await
    }

    fn broadcasts(&mut self) -> Vec<(ChatId, String)> {
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            if let Some(rendered) = self.dispatcher.render_event(&event) {
                out.push(rendered);
            }
        }
        out
    }
}

#[tokio::test(start_paused = true)]
async fn full_session_with_automatic_rotation() {
    let mut h = Harness::new();

    let replies = h.say("boss", "/autorizar").await;
    assert_eq!(replies.len(), 1);
    assert!(replies[0].contains(&GROUP.to_string()));

    let replies = h.say("mod", "/abrirlista").await;
    assert_eq!(replies[0], "List opened.");
    assert!(replies[1].contains("Next rotation in: 120 minutes"));

    h.say("alice", "/z1").await;
    for who in ["bob", "carol", "dave", "erin"] {
        h.say(who, "/espera").await;
    }
    let replies = h.say("carol", "/exit").await;
    assert_eq!(replies[0], "You left successfully.");
    let replies = h.say("frank", "/tomarlibre").await;
    assert_eq!(replies[0], "@frank took a free waitlist slot");
    assert!(replies[1].ends_with("Waitlist:\n@bob\n@frank\n@dave\n\n@erin"));

    let replies = h.say("alice", "/cambiar @erin").await;
    assert_eq!(replies[0], "Swapped @alice and @erin");
    assert!(replies[1].contains("Zone 1: @erin"));

    tokio::time::sleep(h.config.rotation.period() + Duration::from_secs(1)).await;

    let broadcasts = h.broadcasts();
    assert_eq!(broadcasts.len(), 1);
    let (chat, text) = &broadcasts[0];
    assert_eq!(*chat, ChatId(GROUP));
    assert!(text.starts_with("Automatic rotation done"));
    assert!(text.contains("Zone 1: @bob\nZone 2: @frank\nZone 3: @dave\n"));
    assert!(text.ends_with("Waitlist:\n@alice"));
}

#[tokio::test(start_paused = true)]
async fn rejections_are_reported_in_order_of_checks() {
    let mut h = Harness::new();

    assert_eq!(
        h.say("alice", "/z1").await,
        vec!["This bot is not authorized at the moment.".to_string()]
    );
    assert_eq!(
        h.say("alice", "/authorize").await,
        vec!["Only the creator can authorize the bot.".to_string()]
    );

    h.say("boss", "/authorize").await;
    assert_eq!(
        h.say("alice", "/z1").await,
        vec!["The list is closed. An admin must open it with /open.".to_string()]
    );
    assert_eq!(
        h.say("alice", "/cerrar").await,
        vec!["The list is already closed.".to_string()]
    );

    h.say("boss", "/open").await;
    h.say("alice", "/z1").await;
    assert_eq!(
        h.say("bob", "/z1").await,
        vec!["Zone 1 is already taken.".to_string()]
    );
    assert_eq!(
        h.say("alice", "/espera").await,
        vec!["@alice is already at zone 1. Use /exit first.".to_string()]
    );
    assert_eq!(
        h.say("bob", "/swap @carol @dave").await,
        vec!["Only administrators can swap other users.".to_string()]
    );

    let other_chat = h
        .dispatcher
        .handle(ChatRef::group(-5), &UserRef::new(11, Some("bob")), "/lista")
        .await;
    assert_eq!(
        other_chat,
        vec!["This bot is not authorized in this chat.".to_string()]
    );

    assert!(h.broadcasts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn rules_help_and_chat_id() {
    let h = Harness::new();
    h.say("boss", "/authorize").await;

    let rules = h.say("alice", "/reglas").await;
    assert!(rules[0].starts_with("Zone rules:"));

    let help = h.say("alice", "/comandos").await;
    assert!(help[0].contains("/z3 [@user]"));
    assert!(help[0].contains("/exitz3"));

    assert_eq!(
        h.say("alice", "/chatid").await,
        vec!["Only administrators can query the chat id.".to_string()]
    );
    assert_eq!(
        h.say("mod", "/chatid@ZoneBot").await,
        vec![format!("Chat id: {GROUP}\nStatus: AUTHORIZED")]
    );
}
