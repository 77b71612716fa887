//! Routes chat messages through the session gate and renders the replies.

use std::sync::Arc;

use tracing::{debug, info, warn};

use zonehub_core::events::{DomainEvent, EventPayload, RotationEvent};
use zonehub_core::result::ZoneResult;
use zonehub_core::traits::{AdminDirectory, Clock};
use zonehub_core::types::{ChatId, ChatRef, Identity, Snapshot, UserRef};

use crate::commands::{Command, CommandTable, Invocation};
use crate::formatter::BoardFormatter;
use crate::gate::{CommandContext, SessionGate};

/// What the transport should send back for one message.
enum Reply {
    /// A confirmation, followed by the board.
    Board(Snapshot),
    /// A confirmation only.
    Confirmation,
    /// Free text.
    Text(String),
}

/// Turns chat messages into gate calls and replies.
#[derive(Debug)]
pub struct CommandDispatcher {
    table: CommandTable,
    gate: Arc<SessionGate>,
    admins: Arc<dyn AdminDirectory>,
    formatter: BoardFormatter,
    clock: Arc<dyn Clock>,
}

impl CommandDispatcher {
    /// Creates a dispatcher with a command table sized to the gate's board.
    pub fn new(
        gate: Arc<SessionGate>,
        admins: Arc<dyn AdminDirectory>,
        formatter: BoardFormatter,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            table: CommandTable::new(gate.zone_count()),
            gate,
            admins,
            formatter,
            clock,
        }
    }

    /// The command table in use.
    pub fn table(&self) -> &CommandTable {
        &self.table
    }

    /// The gate commands are routed through.
    pub fn gate(&self) -> &Arc<SessionGate> {
        &self.gate
    }

    /// Handles one message and returns the replies to send, in order.
    ///
    /// Plain text and unknown commands produce no reply.
    pub async fn handle(&self, chat: ChatRef, user: &UserRef, text: &str) -> Vec<String> {
        let Some(invocation) = Invocation::parse(text) else {
            return Vec::new();
        };
        let Some(bound) = self.table.bind(&invocation) else {
            debug!(command = %invocation.name, "Ignoring unknown command");
            return Vec::new();
        };

        let ctx = CommandContext::new(chat, user.clone(), self.resolve_admin(chat.id, user).await);
        let caller = ctx.identity();

        let command = match bound {
            Ok(command) => command,
            Err(usage) => {
                // Every command with arguments works on the board.
                let err = match self.gate.ensure_board_open(&ctx).await {
                    Ok(()) => usage,
                    Err(rejected) => rejected,
                };
                return vec![self.formatter.error(&err)];
            }
        };

        debug!(
            chat = %chat.id,
            caller = %caller,
            command = %invocation.name,
            "Dispatching command"
        );

        match self.execute(&ctx, &command).await {
            Ok(Reply::Board(snapshot)) => {
                let board = self.formatter.board(&snapshot, self.clock.now());
                match self.formatter.confirmation(&command, &caller) {
                    Some(line) => vec![line, board],
                    None => vec![board],
                }
            }
            Ok(Reply::Confirmation) => self
                .formatter
                .confirmation(&command, &caller)
                .into_iter()
                .collect(),
            Ok(Reply::Text(text)) => vec![text],
            Err(err) => {
                info!(
                    chat = %chat.id,
                    caller = %caller,
                    command = %invocation.name,
                    reason = %err,
                    "Command rejected"
                );
                vec![self.formatter.error(&err)]
            }
        }
    }

    /// Text to post for a domain event, and the chat to post it to.
    pub fn render_event(&self, event: &DomainEvent) -> Option<(ChatId, String)> {
        match &event.payload {
            EventPayload::Rotation(RotationEvent::Rotated {
                chat: Some(chat),
                snapshot,
            }) => Some((
                *chat,
                self.formatter.rotation_broadcast(snapshot, event.timestamp),
            )),
            _ => None,
        }
    }

    async fn execute(&self, ctx: &CommandContext, command: &Command) -> ZoneResult<Reply> {
        let gate = &self.gate;
        let reply = match command {
            Command::Authorize => {
                gate.authorize(ctx).await?;
                Reply::Text(self.formatter.authorized(ctx.chat.id))
            }
            Command::Deauthorize => {
                gate.deauthorize(ctx).await?;
                Reply::Confirmation
            }
            Command::Open => Reply::Board(gate.open(ctx).await?),
            Command::Close => {
                gate.close(ctx).await?;
                Reply::Confirmation
            }
            Command::Show => Reply::Board(gate.show(ctx).await?),
            Command::Join { zone, target } => {
                Reply::Board(gate.join(ctx, *zone, target.clone()).await?)
            }
            Command::Leave { zone } => Reply::Board(gate.leave(ctx, *zone).await?),
            Command::JoinWaitlist { target } => {
                Reply::Board(gate.join_waitlist(ctx, target.clone()).await?)
            }
            Command::ReclaimFree => Reply::Board(gate.reclaim_free(ctx).await?),
            Command::Exit { target } => Reply::Board(gate.exit(ctx, target.clone()).await?),
            Command::Swap { first, second } => {
                Reply::Board(gate.swap(ctx, first.clone(), second.clone()).await?)
            }
            Command::Rules => {
                gate.ensure_authorized(ctx).await?;
                Reply::Text(self.formatter.rules())
            }
            Command::Help => {
                gate.ensure_authorized(ctx).await?;
                Reply::Text(self.formatter.help(&self.table))
            }
            Command::ChatStatus => {
                let status = gate.chat_status(ctx).await?;
                Reply::Text(self.formatter.chat_status(&status))
            }
        };
        Ok(reply)
    }

    async fn resolve_admin(&self, chat: ChatId, user: &UserRef) -> bool {
        if self.gate.is_creator(&Identity::from_user(user)) {
            return true;
        }
        match self.admins.is_admin(chat, user).await {
            Ok(is_admin) => is_admin,
            Err(e) => {
                warn!(chat = %chat, user_id = user.id, "Admin lookup failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use tokio::sync::broadcast;
    use zonehub_allocation::MemoryZoneAllocator;
    use zonehub_core::config::{BoardConfig, PresentationConfig, RotationConfig, SessionConfig};

    use crate::admin::StaticAdminDirectory;

    const GROUP: i64 = -500;

    #[derive(Debug)]
    struct FixedClock;

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2026, 1, 10, 18, 0, 0).unwrap()
        }
    }

    fn dispatcher() -> CommandDispatcher {
        let session = SessionConfig {
            creator: "@boss".to_string(),
            admins: vec!["@mod".to_string()],
            ..SessionConfig::default()
        };
        let clock: Arc<dyn Clock> = Arc::new(FixedClock);
        let (tx, _rx) = broadcast::channel(8);
        let gate = SessionGate::new(
            Arc::new(MemoryZoneAllocator::new(3)),
            &session,
            &RotationConfig::default(),
            Arc::clone(&clock),
            tx,
        );
        CommandDispatcher::new(
            Arc::new(gate),
            Arc::new(StaticAdminDirectory::from_config(&session)),
            BoardFormatter::new(
                &BoardConfig::default(),
                &RotationConfig::default(),
                &PresentationConfig::default(),
            ),
            clock,
        )
    }

    async fn say(d: &CommandDispatcher, who: &str, text: &str) -> Vec<String> {
        d.handle(ChatRef::group(GROUP), &UserRef::new(7, Some(who)), text)
            .await
    }

    #[tokio::test]
    async fn test_plain_text_and_unknown_commands_are_silent() {
        let d = dispatcher();
        assert!(say(&d, "alice", "hello").await.is_empty());
        assert!(say(&d, "alice", "/dance").await.is_empty());
    }

    #[tokio::test]
    async fn test_join_replies_with_confirmation_and_board() {
        let d = dispatcher();
        say(&d, "boss", "/autorizar").await;
        say(&d, "mod", "/abrir").await;

        let replies = say(&d, "alice", "/z2").await;
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0], "@alice assigned to zone 2");
        assert!(replies[1].contains("Zone 2: @alice"));
    }

    #[tokio::test]
    async fn test_rejection_is_rendered() {
        let d = dispatcher();
        assert_eq!(
            say(&d, "alice", "/lista").await,
            vec!["This bot is not authorized at the moment.".to_string()]
        );
        say(&d, "boss", "/authorize").await;
        assert_eq!(
            say(&d, "alice", "/open").await,
            vec!["Only administrators can open the list.".to_string()]
        );
    }

    #[tokio::test]
    async fn test_usage_error_for_bad_target() {
        let d = dispatcher();
        say(&d, "boss", "/authorize").await;
        say(&d, "boss", "/open").await;
        let replies = say(&d, "alice", "/exit bob").await;
        assert_eq!(replies, vec!["Usage: /exit [@user]".to_string()]);
    }

    #[tokio::test]
    async fn test_session_rejections_come_before_usage() {
        let d = dispatcher();
        let private = d
            .handle(ChatRef::private(7), &UserRef::new(7, Some("alice")), "/exit bob")
            .await;
        assert_eq!(
            private,
            vec!["This bot does not work in private messages.".to_string()]
        );
        assert_eq!(
            say(&d, "alice", "/swap").await,
            vec!["This bot is not authorized at the moment.".to_string()]
        );

        say(&d, "boss", "/authorize").await;
        assert_eq!(
            say(&d, "alice", "/z1 bob").await,
            vec!["The list is closed. An admin must open it with /open.".to_string()]
        );

        say(&d, "boss", "/open").await;
        let elsewhere = d
            .handle(ChatRef::group(-77), &UserRef::new(8, Some("alice")), "/exitz1 now")
            .await;
        assert_eq!(
            elsewhere,
            vec!["This bot is not authorized in this chat.".to_string()]
        );
        assert_eq!(
            say(&d, "alice", "/exitz1 now").await,
            vec!["Usage: /exitz1".to_string()]
        );
    }

    #[tokio::test]
    async fn test_close_replies_with_confirmation_only() {
        let d = dispatcher();
        say(&d, "boss", "/authorize").await;
        say(&d, "boss", "/open").await;
        assert_eq!(
            say(&d, "mod", "/cerrarlista").await,
            vec!["List closed.".to_string()]
        );
    }

    #[tokio::test]
    async fn test_private_chat_rejected() {
        let d = dispatcher();
        let replies = d
            .handle(ChatRef::private(7), &UserRef::new(7, Some("boss")), "/authorize")
            .await;
        assert_eq!(
            replies,
            vec!["This bot does not work in private messages.".to_string()]
        );
    }

    #[tokio::test]
    async fn test_render_rotation_event() {
        let d = dispatcher();
        let snapshot = Snapshot {
            zones: Vec::new(),
            waitlist: Vec::new(),
            last_rotation_at: Some(FixedClock.now()),
            is_open: true,
        };
        let event = DomainEvent::rotation(
            FixedClock.now(),
            RotationEvent::Rotated {
                chat: Some(ChatId(GROUP)),
                snapshot,
            },
        );
        let (chat, text) = d.render_event(&event).unwrap();
        assert_eq!(chat, ChatId(GROUP));
        assert!(text.starts_with("Automatic rotation done\n\n"));
    }
}
