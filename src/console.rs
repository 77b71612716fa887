//! Line-oriented console transport.
//!
//! Each input line is `<chat_id> <@user> <message text>`. Negative chat ids
//! are groups and positive ids are private chats. A user without a public
//! handle is written `#<user id>`. Replies and rotation broadcasts are
//! written as `[<chat_id>] <text>` blocks.

use std::future::Future;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast;

use zonehub_core::error::AppError;
use zonehub_core::events::DomainEvent;
use zonehub_core::types::{ChatId, ChatRef, UserRef};
use zonehub_service::CommandDispatcher;

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleMessage {
    pub chat: ChatRef,
    pub user: UserRef,
    pub text: String,
}

/// Parses `<chat_id> <@user|#id> <text>`. Returns `None` for malformed lines.
pub fn parse_line(line: &str) -> Option<ConsoleMessage> {
    let mut parts = line.trim().splitn(3, char::is_whitespace);
    let chat_id: i64 = parts.next()?.parse().ok()?;
    let user_token = parts.next()?;
    let text = parts.next().unwrap_or("").trim().to_string();

    let chat = if chat_id < 0 {
        ChatRef::group(chat_id)
    } else {
        ChatRef::private(chat_id)
    };
    let user = if let Some(name) = user_token.strip_prefix('@') {
        let id = if chat.is_private() { chat_id } else { 0 };
        UserRef::new(id, Some(name))
    } else {
        let id = user_token.strip_prefix('#')?.parse().ok()?;
        UserRef::new(id, None)
    };

    Some(ConsoleMessage { chat, user, text })
}

/// Runs the console loop until EOF or `shutdown` resolves.
pub async fn run<R, W, S>(
    dispatcher: &CommandDispatcher,
    mut events: broadcast::Receiver<DomainEvent>,
    input: R,
    mut output: W,
    shutdown: S,
) -> Result<(), AppError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    S: Future<Output = ()>,
{
    let mut lines = input.lines();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Shutdown signal received");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    tracing::info!("Console input closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let Some(message) = parse_line(&line) else {
                    tracing::warn!(line = %line, "Malformed console line, expected '<chat_id> <@user> <text>'");
                    continue;
                };
                let replies = dispatcher
                    .handle(message.chat, &message.user, &message.text)
                    .await;
                for reply in replies {
                    write_block(&mut output, message.chat.id, &reply).await?;
                }
            }
            event = events.recv() => match event {
                Ok(event) => {
                    if let Some((chat, text)) = dispatcher.render_event(&event) {
                        write_block(&mut output, chat, &text).await?;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Console fell behind on events");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::debug!("Event bus closed");
                    break;
                }
            },
        }
    }

    output.flush().await?;
    Ok(())
}

async fn write_block<W: AsyncWrite + Unpin>(
    output: &mut W,
    chat: ChatId,
    text: &str,
) -> Result<(), AppError> {
    output
        .write_all(format!("[{chat}] {text}\n\n").as_bytes())
        .await?;
    output.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use tokio::io::BufReader;
    use zonehub_allocation::MemoryZoneAllocator;
    use zonehub_core::config::AppConfig;
    use zonehub_core::traits::{Clock, SystemClock};
    use zonehub_service::{BoardFormatter, SessionGate, StaticAdminDirectory};

    #[test]
    fn test_parse_group_line() {
        let message = parse_line("-100 @alice /z1 @bob").unwrap();
        assert_eq!(message.chat, ChatRef::group(-100));
        assert_eq!(message.user.username.as_deref(), Some("alice"));
        assert_eq!(message.text, "/z1 @bob");
    }

    #[test]
    fn test_parse_private_and_anonymous() {
        let message = parse_line("42 #42 /lista").unwrap();
        assert!(message.chat.is_private());
        assert_eq!(message.user, UserRef::new(42, None));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(parse_line("hello"), None);
        assert_eq!(parse_line("-1 alice /z1"), None);
    }

    #[tokio::test]
    async fn test_run_until_eof() {
        let mut config = AppConfig::default();
        config.session.creator = "@boss".to_string();

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let (tx, rx) = broadcast::channel(16);
        let gate = Arc::new(SessionGate::new(
            Arc::new(MemoryZoneAllocator::new(config.board.zone_count)),
            &config.session,
            &config.rotation,
            Arc::clone(&clock),
            tx,
        ));
        let dispatcher = CommandDispatcher::new(
            Arc::clone(&gate),
            Arc::new(StaticAdminDirectory::from_config(&config.session)),
            BoardFormatter::new(&config.board, &config.rotation, &config.presentation),
            clock,
        );

        let input = BufReader::new("-7 @boss /authorize\n-7 @boss /open\n-7 @amy /z3\n".as_bytes());
        let mut output = Vec::new();
        run(&dispatcher, rx, input, &mut output, std::future::pending())
            .await
            .unwrap();
        gate.shutdown().await;

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("[-7] Bot authorized for this chat."));
        assert!(text.contains("[-7] @amy assigned to zone 3"));
        assert!(text.contains("Zone 3: @amy"));
    }
}
