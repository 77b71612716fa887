//! Session gate: the single authorized chat and its privilege rules.
//!
//! Every command takes the session lock for its whole duration, and the
//! rotation hook takes the same lock, so board commands, timer fires, and
//! timer re-arming are serialized against each other.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, MutexGuard, broadcast};
use tracing::{info, warn};

use zonehub_core::config::{RotationConfig, SessionConfig};
use zonehub_core::error::ZoneError;
use zonehub_core::events::{DomainEvent, SessionEvent};
use zonehub_core::result::ZoneResult;
use zonehub_core::traits::{Clock, RotationTarget, ZoneAllocator};
use zonehub_core::types::{ChatId, ChatRef, Identity, Snapshot, UserRef, ZoneOrdinal};
use zonehub_worker::{RotationJob, RotationScheduler};

/// Who sent a command, from where, and with which privileges.
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// The chat the command arrived from.
    pub chat: ChatRef,
    /// The sender.
    pub caller: UserRef,
    /// Whether the sender administers the chat.
    pub is_admin: bool,
}

impl CommandContext {
    /// Create a command context.
    pub fn new(chat: ChatRef, caller: UserRef, is_admin: bool) -> Self {
        Self {
            chat,
            caller,
            is_admin,
        }
    }

    /// The sender's identity.
    pub fn identity(&self) -> Identity {
        Identity::from_user(&self.caller)
    }
}

/// Result of a chat id query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatStatus {
    /// The chat that asked.
    pub chat: ChatId,
    /// Whether it is the authorized chat.
    pub authorized: bool,
}

#[derive(Debug, Default)]
struct SessionState {
    authorized_chat: Option<ChatId>,
}

/// Rotation capability handed to the scheduler.
#[derive(Debug, Clone)]
struct SessionRotation {
    session: Arc<Mutex<SessionState>>,
    allocator: Arc<dyn ZoneAllocator>,
}

#[async_trait]
impl RotationTarget for SessionRotation {
    async fn rotate(&self, now: DateTime<Utc>) -> ZoneResult<Snapshot> {
        let session = self.session.lock().await;
        if session.authorized_chat.is_none() {
            return Err(ZoneError::NotAuthorized);
        }
        self.allocator.rotate(now).await
    }

    async fn broadcast_chat(&self) -> Option<ChatId> {
        self.session.lock().await.authorized_chat
    }
}

/// Authorizes one chat at a time and drives the board on its behalf.
#[derive(Debug)]
pub struct SessionGate {
    session: Arc<Mutex<SessionState>>,
    allocator: Arc<dyn ZoneAllocator>,
    scheduler: RotationScheduler,
    clock: Arc<dyn Clock>,
    events: broadcast::Sender<DomainEvent>,
    creator: Option<Identity>,
    config: SessionConfig,
}

impl SessionGate {
    /// Creates an unauthorized gate over `allocator`, with its own rotation timer.
    pub fn new(
        allocator: Arc<dyn ZoneAllocator>,
        session_config: &SessionConfig,
        rotation_config: &RotationConfig,
        clock: Arc<dyn Clock>,
        events: broadcast::Sender<DomainEvent>,
    ) -> Self {
        let session = Arc::new(Mutex::new(SessionState::default()));
        let target = SessionRotation {
            session: Arc::clone(&session),
            allocator: Arc::clone(&allocator),
        };
        let job = RotationJob::new(Arc::new(target), Arc::clone(&clock), events.clone());
        let scheduler = RotationScheduler::new(job, rotation_config.period());

        let creator = Identity::from_handle(&session_config.creator);
        if creator.is_none() {
            warn!(
                creator = %session_config.creator,
                "Configured creator is not a valid @handle; nobody can authorize"
            );
        }

        Self {
            session,
            allocator,
            scheduler,
            clock,
            events,
            creator,
            config: session_config.clone(),
        }
    }

    /// Number of zones on the board.
    pub fn zone_count(&self) -> u8 {
        self.allocator.zone_count()
    }

    /// Whether `who` is the configured creator.
    pub fn is_creator(&self, who: &Identity) -> bool {
        self.creator.as_ref() == Some(who)
    }

    /// The currently authorized chat.
    pub async fn authorized_chat(&self) -> Option<ChatId> {
        self.session.lock().await.authorized_chat
    }

    /// Whether the rotation timer is live.
    pub async fn rotation_armed(&self) -> bool {
        self.scheduler.is_armed().await
    }

    /// Authorizes the sender's chat, clears all placements, and (re)arms the timer.
    pub async fn authorize(&self, ctx: &CommandContext) -> ZoneResult<Snapshot> {
        reject_private(ctx)?;
        self.ensure_creator(ctx, "authorize the bot")?;

        let mut session = self.session.lock().await;
        session.authorized_chat = Some(ctx.chat.id);
        let snapshot = self.allocator.clear_placements().await;
        self.scheduler.arm().await;
        drop(session);

        info!(chat = %ctx.chat.id, "Chat authorized");
        self.publish(SessionEvent::Authorized {
            chat: ctx.chat.id,
            by: ctx.identity(),
        });
        Ok(snapshot)
    }

    /// Clears the authorized chat, resets the board, and disarms the timer.
    pub async fn deauthorize(&self, ctx: &CommandContext) -> ZoneResult<Snapshot> {
        reject_private(ctx)?;
        self.ensure_creator(ctx, "deauthorize the bot")?;

        let mut session = self.session.lock().await;
        if let Some(chat) = session.authorized_chat {
            if chat != ctx.chat.id {
                return Err(ZoneError::WrongChat { chat: ctx.chat.id });
            }
        }
        let previous = session.authorized_chat.take();
        let snapshot = self.allocator.reset().await;
        self.scheduler.disarm().await;
        drop(session);

        info!(chat = ?previous, "Chat deauthorized");
        self.publish(SessionEvent::Deauthorized {
            chat: previous,
            by: ctx.identity(),
        });
        Ok(snapshot)
    }

    /// Opens the list, stamps the rotation clock, and re-arms the timer.
    pub async fn open(&self, ctx: &CommandContext) -> ZoneResult<Snapshot> {
        let session = self.authorized(ctx).await?;
        if self.allocator.snapshot().await.is_open {
            return Err(ZoneError::AlreadyOpen);
        }
        ensure_admin(ctx, "open the list")?;

        let snapshot = self.allocator.open(self.clock.now()).await?;
        self.scheduler.arm().await;
        drop(session);

        self.publish(SessionEvent::ListOpened {
            chat: ctx.chat.id,
            by: ctx.identity(),
        });
        Ok(snapshot)
    }

    /// Closes the list, clears every placement, and disarms the timer.
    pub async fn close(&self, ctx: &CommandContext) -> ZoneResult<Snapshot> {
        let session = self.authorized(ctx).await?;
        if !self.allocator.snapshot().await.is_open {
            return Err(ZoneError::AlreadyClosed);
        }
        ensure_admin(ctx, "close the list")?;

        let snapshot = self.allocator.close().await?;
        self.scheduler.disarm().await;
        drop(session);

        self.publish(SessionEvent::ListClosed {
            chat: ctx.chat.id,
            by: ctx.identity(),
        });
        Ok(snapshot)
    }

    /// Current board.
    pub async fn show(&self, ctx: &CommandContext) -> ZoneResult<Snapshot> {
        let _session = self.authorized(ctx).await?;
        self.ensure_open().await?;
        Ok(self.allocator.snapshot().await)
    }

    /// Places the sender, or `target`, in `zone`.
    pub async fn join(
        &self,
        ctx: &CommandContext,
        zone: ZoneOrdinal,
        target: Option<Identity>,
    ) -> ZoneResult<Snapshot> {
        let _session = self.authorized(ctx).await?;
        self.ensure_open().await?;
        self.ensure_zone(zone)?;
        let who = self.resolve_target(ctx, target, self.config.remote_join_requires_admin)?;
        self.allocator.join(zone, &who).await
    }

    /// Removes the sender from `zone`.
    pub async fn leave(&self, ctx: &CommandContext, zone: ZoneOrdinal) -> ZoneResult<Snapshot> {
        let _session = self.authorized(ctx).await?;
        self.ensure_open().await?;
        self.ensure_zone(zone)?;
        self.allocator.leave(zone, &ctx.identity()).await
    }

    /// Appends the sender, or `target` when an admin asks, to the waitlist.
    pub async fn join_waitlist(
        &self,
        ctx: &CommandContext,
        target: Option<Identity>,
    ) -> ZoneResult<Snapshot> {
        let _session = self.authorized(ctx).await?;
        self.ensure_open().await?;
        let who = match target {
            Some(other) => {
                ensure_admin(ctx, "add other users to the waitlist")?;
                other
            }
            None => ctx.identity(),
        };
        self.allocator.join_waitlist(&who).await
    }

    /// Puts the sender into the front-most free waitlist entry.
    pub async fn reclaim_free(&self, ctx: &CommandContext) -> ZoneResult<Snapshot> {
        let _session = self.authorized(ctx).await?;
        self.ensure_open().await?;
        self.allocator.reclaim_free(&ctx.identity()).await
    }

    /// Removes the sender, or `target`, from its zone or waitlist entry.
    pub async fn exit(
        &self,
        ctx: &CommandContext,
        target: Option<Identity>,
    ) -> ZoneResult<Snapshot> {
        let _session = self.authorized(ctx).await?;
        self.ensure_open().await?;
        let who = self.resolve_target(ctx, target, self.config.remote_exit_requires_admin)?;
        self.allocator.exit(&who).await
    }

    /// Swaps the sender with `first`, or `first` with `second`.
    ///
    /// Naming two distinct identities needs admin rights.
    pub async fn swap(
        &self,
        ctx: &CommandContext,
        first: Identity,
        second: Option<Identity>,
    ) -> ZoneResult<Snapshot> {
        let _session = self.authorized(ctx).await?;
        self.ensure_open().await?;
        let (a, b) = match second {
            Some(second) => {
                if first != second {
                    ensure_admin(ctx, "swap other users")?;
                }
                (first, second)
            }
            None => (ctx.identity(), first),
        };
        self.allocator.swap(&a, &b).await
    }

    /// Checks that the sender's chat is the authorized one.
    pub async fn ensure_authorized(&self, ctx: &CommandContext) -> ZoneResult<()> {
        self.authorized(ctx).await.map(|_| ())
    }

    /// Checks that the sender's chat is the authorized one and the list is open.
    ///
    /// Board commands with malformed arguments report these rejections before
    /// their usage line.
    pub async fn ensure_board_open(&self, ctx: &CommandContext) -> ZoneResult<()> {
        let _session = self.authorized(ctx).await?;
        self.ensure_open().await
    }

    /// Reports the sender's chat id and whether it is authorized. Admin only.
    pub async fn chat_status(&self, ctx: &CommandContext) -> ZoneResult<ChatStatus> {
        reject_private(ctx)?;
        ensure_admin(ctx, "query the chat id")?;
        let session = self.session.lock().await;
        Ok(ChatStatus {
            chat: ctx.chat.id,
            authorized: session.authorized_chat == Some(ctx.chat.id),
        })
    }

    /// Stops the rotation timer; used on process shutdown.
    pub async fn shutdown(&self) {
        if self.scheduler.disarm().await {
            info!("Rotation timer stopped for shutdown");
        }
    }

    async fn authorized(&self, ctx: &CommandContext) -> ZoneResult<MutexGuard<'_, SessionState>> {
        reject_private(ctx)?;
        let session = self.session.lock().await;
        match session.authorized_chat {
            None => Err(ZoneError::NotAuthorized),
            Some(chat) if chat != ctx.chat.id => {
                warn!(chat = %ctx.chat.id, authorized = %chat, "Command from unauthorized chat");
                Err(ZoneError::WrongChat { chat: ctx.chat.id })
            }
            Some(_) => Ok(session),
        }
    }

    async fn ensure_open(&self) -> ZoneResult<()> {
        if self.allocator.snapshot().await.is_open {
            Ok(())
        } else {
            Err(ZoneError::ListClosed)
        }
    }

    fn ensure_zone(&self, zone: ZoneOrdinal) -> ZoneResult<()> {
        if zone.get() <= self.zone_count() {
            Ok(())
        } else {
            Err(ZoneError::usage(format!(
                "zone must be between 1 and {}",
                self.zone_count()
            )))
        }
    }

    fn ensure_creator(&self, ctx: &CommandContext, action: &str) -> ZoneResult<()> {
        let who = ctx.identity();
        if self.is_creator(&who) {
            Ok(())
        } else {
            warn!(who = %who, action = action, "Creator-only action refused");
            Err(ZoneError::creator_required(action))
        }
    }

    fn resolve_target(
        &self,
        ctx: &CommandContext,
        target: Option<Identity>,
        requires_admin: bool,
    ) -> ZoneResult<Identity> {
        let caller = ctx.identity();
        match target {
            Some(other) if other != caller => {
                if requires_admin {
                    ensure_admin(ctx, "act on other users")?;
                }
                Ok(other)
            }
            _ => Ok(caller),
        }
    }

    fn publish(&self, event: SessionEvent) {
        let _ = self
            .events
            .send(DomainEvent::session(self.clock.now(), event));
    }
}

fn reject_private(ctx: &CommandContext) -> ZoneResult<()> {
    if ctx.chat.is_private() {
        warn!(who = %ctx.identity(), "Private message refused");
        return Err(ZoneError::PrivateChat);
    }
    Ok(())
}

fn ensure_admin(ctx: &CommandContext, action: &str) -> ZoneResult<()> {
    if ctx.is_admin {
        Ok(())
    } else {
        warn!(who = %ctx.identity(), action = action, "Admin-only action refused");
        Err(ZoneError::admin_required(action))
    }
}
