//! Command table and command-line parsing.
//!
//! The table is data: one [`CommandSpec`] per command, generated zone
//! commands included, each listing its aliases. Parsing a message yields an
//! [`Invocation`]; binding it against the table checks the arguments and
//! yields a typed [`Command`].

use std::collections::HashMap;

use zonehub_core::error::ZoneError;
use zonehub_core::result::ZoneResult;
use zonehub_core::types::{Identity, ZoneOrdinal};

/// What a command does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Authorize the current chat.
    Authorize,
    /// Clear the authorized chat.
    Deauthorize,
    /// Open the list.
    Open,
    /// Close the list.
    Close,
    /// Show the board.
    Show,
    /// Take a zone.
    Join(ZoneOrdinal),
    /// Leave a zone.
    Leave(ZoneOrdinal),
    /// Join the waitlist.
    JoinWaitlist,
    /// Take the front-most free waitlist slot.
    ReclaimFree,
    /// Leave the zone or waitlist.
    Exit,
    /// Swap placements.
    Swap,
    /// Print the rules.
    Rules,
    /// Print the command menu.
    Help,
    /// Print the chat id.
    ChatStatus,
}

/// Who a command is meant for; used to group the help text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Audience {
    /// Any participant.
    Users,
    /// Chat administrators.
    Admins,
    /// The configured creator.
    Creator,
    /// Diagnostics.
    Utilities,
}

impl Audience {
    /// Help section title.
    pub fn title(self) -> &'static str {
        match self {
            Self::Users => "Users",
            Self::Admins => "Admins",
            Self::Creator => "Creator",
            Self::Utilities => "Utilities",
        }
    }
}

/// One entry in the command table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Primary name, without the leading `/`.
    pub name: String,
    /// Alternative names.
    pub aliases: Vec<String>,
    /// Bound operation.
    pub operation: Operation,
    /// Argument synopsis shown in help, empty for none.
    pub arguments: &'static str,
    /// One-line description.
    pub summary: String,
    /// Help section.
    pub audience: Audience,
}

impl CommandSpec {
    fn new(
        name: impl Into<String>,
        aliases: &[&str],
        operation: Operation,
        arguments: &'static str,
        summary: impl Into<String>,
        audience: Audience,
    ) -> Self {
        Self {
            name: name.into(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            operation,
            arguments,
            summary: summary.into(),
            audience,
        }
    }

    /// Every name this command answers to.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

/// A command with its arguments checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Authorize,
    Deauthorize,
    Open,
    Close,
    Show,
    Join {
        zone: ZoneOrdinal,
        target: Option<Identity>,
    },
    Leave {
        zone: ZoneOrdinal,
    },
    JoinWaitlist {
        target: Option<Identity>,
    },
    ReclaimFree,
    Exit {
        target: Option<Identity>,
    },
    Swap {
        first: Identity,
        second: Option<Identity>,
    },
    Rules,
    Help,
    ChatStatus,
}

/// A `/name args...` message split into parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Lower-cased command name, without `/` or `@bot` suffix.
    pub name: String,
    /// Whitespace-separated arguments.
    pub args: Vec<String>,
}

impl Invocation {
    /// Parses a message. Returns `None` for anything that is not a command.
    pub fn parse(text: &str) -> Option<Self> {
        let mut tokens = text.split_whitespace();
        let head = tokens.next()?.strip_prefix('/')?;
        let name = head.split_once('@').map_or(head, |(name, _bot)| name);
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_ascii_lowercase(),
            args: tokens.map(str::to_string).collect(),
        })
    }

    fn handles(&self, usage: &str) -> ZoneResult<Vec<Identity>> {
        self.args
            .iter()
            .map(|arg| Identity::from_handle(arg).ok_or_else(|| ZoneError::usage(usage)))
            .collect()
    }

    fn no_args(&self, usage: &str) -> ZoneResult<()> {
        if self.args.is_empty() {
            Ok(())
        } else {
            Err(ZoneError::usage(usage))
        }
    }

    fn optional_handle(&self, usage: &str) -> ZoneResult<Option<Identity>> {
        let mut handles = self.handles(usage)?;
        match handles.len() {
            0 | 1 => Ok(handles.pop()),
            _ => Err(ZoneError::usage(usage)),
        }
    }
}

/// Name-indexed command table.
#[derive(Debug, Clone)]
pub struct CommandTable {
    specs: Vec<CommandSpec>,
    index: HashMap<String, usize>,
}

impl CommandTable {
    /// Builds the table for a board with `zone_count` zones.
    pub fn new(zone_count: u8) -> Self {
        let mut specs = Vec::new();

        for number in 1..=zone_count {
            let Some(zone) = ZoneOrdinal::new(number) else {
                continue;
            };
            specs.push(CommandSpec::new(
                format!("z{number}"),
                &[],
                Operation::Join(zone),
                "[@user]",
                format!("Take zone {number}, or place @user there"),
                Audience::Users,
            ));
        }
        for number in 1..=zone_count {
            let Some(zone) = ZoneOrdinal::new(number) else {
                continue;
            };
            specs.push(CommandSpec::new(
                format!("exitz{number}"),
                &[],
                Operation::Leave(zone),
                "",
                format!("Leave zone {number}"),
                Audience::Users,
            ));
        }

        use Audience::*;
        use Operation as Op;
        specs.extend([
            CommandSpec::new("wait", &["espera"], Op::JoinWaitlist, "", "Join the waitlist", Users),
            CommandSpec::new("exit", &["exitlista"], Op::Exit, "[@user]", "Leave your zone or waitlist slot, or remove @user", Users),
            CommandSpec::new("swap", &["cambiar"], Op::Swap, "@user [@user2]", "Swap places with @user, or swap two users", Users),
            CommandSpec::new("takefree", &["tomarlibre"], Op::ReclaimFree, "", "Take the first free waitlist slot", Users),
            CommandSpec::new("list", &["lista"], Op::Show, "", "Show the board", Users),
            CommandSpec::new("rules", &["reglas"], Op::Rules, "", "Show the rules", Users),
            CommandSpec::new("commands", &["comandos"], Op::Help, "", "Show this menu", Users),
            CommandSpec::new("open", &["abrir", "abrirlista"], Op::Open, "", "Open the list", Admins),
            CommandSpec::new("close", &["cerrar", "cerrarlista"], Op::Close, "", "Close the list", Admins),
            CommandSpec::new("authorize", &["autorizar"], Op::Authorize, "", "Activate the bot in this chat", Creator),
            CommandSpec::new("deauthorize", &["desautorizar"], Op::Deauthorize, "", "Deactivate the bot", Creator),
            CommandSpec::new("chatid", &[], Op::ChatStatus, "", "Show this chat's id", Utilities),
        ]);

        let index = specs
            .iter()
            .enumerate()
            .flat_map(|(i, spec)| spec.names().map(move |name| (name.to_string(), i)))
            .collect();

        Self { specs, index }
    }

    /// All commands, zone commands first.
    pub fn specs(&self) -> &[CommandSpec] {
        &self.specs
    }

    /// Finds a command by primary name or alias.
    pub fn lookup(&self, name: &str) -> Option<&CommandSpec> {
        self.index.get(name).map(|&i| &self.specs[i])
    }

    /// Resolves an invocation to a typed command.
    ///
    /// Returns `None` for unknown commands and a `Usage` error for bad
    /// arguments.
    pub fn bind(&self, invocation: &Invocation) -> Option<ZoneResult<Command>> {
        let spec = self.lookup(&invocation.name)?;
        let usage = if spec.arguments.is_empty() {
            format!("/{}", invocation.name)
        } else {
            format!("/{} {}", invocation.name, spec.arguments)
        };

        let command = match spec.operation {
            Operation::Join(zone) => invocation
                .optional_handle(&usage)
                .map(|target| Command::Join { zone, target }),
            Operation::Exit => invocation
                .optional_handle(&usage)
                .map(|target| Command::Exit { target }),
            Operation::JoinWaitlist => invocation
                .optional_handle(&format!("/{} [@user]", invocation.name))
                .map(|target| Command::JoinWaitlist { target }),
            Operation::Swap => invocation.handles(&usage).and_then(|handles| {
                let mut handles = handles.into_iter();
                match (handles.next(), handles.next(), handles.next()) {
                    (Some(first), second, None) => Ok(Command::Swap { first, second }),
                    _ => Err(ZoneError::usage(usage.as_str())),
                }
            }),
            Operation::Leave(zone) => invocation.no_args(&usage).map(|()| Command::Leave { zone }),
            // Commands without arguments ignore trailing text.
            Operation::Authorize => Ok(Command::Authorize),
            Operation::Deauthorize => Ok(Command::Deauthorize),
            Operation::Open => Ok(Command::Open),
            Operation::Close => Ok(Command::Close),
            Operation::Show => Ok(Command::Show),
            Operation::ReclaimFree => Ok(Command::ReclaimFree),
            Operation::Rules => Ok(Command::Rules),
            Operation::Help => Ok(Command::Help),
            Operation::ChatStatus => Ok(Command::ChatStatus),
        };
        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(handle: &str) -> Identity {
        Identity::from_handle(handle).unwrap()
    }

    fn bind(text: &str) -> Option<ZoneResult<Command>> {
        let table = CommandTable::new(3);
        Invocation::parse(text).and_then(|inv| table.bind(&inv))
    }

    #[test]
    fn test_parse_strips_bot_suffix_and_case() {
        let inv = Invocation::parse("/Z2@ZoneBot  @alice").unwrap();
        assert_eq!(inv.name, "z2");
        assert_eq!(inv.args, vec!["@alice".to_string()]);
    }

    #[test]
    fn test_parse_ignores_plain_text() {
        assert_eq!(Invocation::parse("hello there"), None);
        assert_eq!(Invocation::parse(""), None);
        assert_eq!(Invocation::parse("/ z1"), None);
    }

    #[test]
    fn test_zone_commands_are_generated() {
        let table = CommandTable::new(5);
        assert!(table.lookup("z5").is_some());
        assert!(table.lookup("exitz5").is_some());
        assert!(table.lookup("z6").is_none());
    }

    #[test]
    fn test_aliases_resolve_to_same_spec() {
        let table = CommandTable::new(3);
        for (alias, primary) in [
            ("espera", "wait"),
            ("cambiar", "swap"),
            ("exitlista", "exit"),
            ("tomarlibre", "takefree"),
            ("abrirlista", "open"),
            ("cerrar", "close"),
            ("lista", "list"),
            ("reglas", "rules"),
            ("comandos", "commands"),
            ("autorizar", "authorize"),
            ("desautorizar", "deauthorize"),
        ] {
            assert_eq!(table.lookup(alias), table.lookup(primary), "{alias}");
        }
    }

    #[test]
    fn test_bind_join_with_target() {
        assert_eq!(
            bind("/z1 @bob"),
            Some(Ok(Command::Join {
                zone: ZoneOrdinal::new(1).unwrap(),
                target: Some(id("@bob"))
            }))
        );
    }

    #[test]
    fn test_bind_rejects_non_handle_target() {
        assert!(matches!(bind("/exit bob"), Some(Err(ZoneError::Usage { .. }))));
        assert!(matches!(
            bind("/z1 @a @b"),
            Some(Err(ZoneError::Usage { .. }))
        ));
    }

    #[test]
    fn test_bind_swap_arity() {
        assert_eq!(
            bind("/cambiar @a"),
            Some(Ok(Command::Swap {
                first: id("@a"),
                second: None
            }))
        );
        assert_eq!(
            bind("/swap @a @b"),
            Some(Ok(Command::Swap {
                first: id("@a"),
                second: Some(id("@b"))
            }))
        );
        assert!(matches!(bind("/swap"), Some(Err(ZoneError::Usage { .. }))));
        assert!(matches!(
            bind("/swap @a @b @c"),
            Some(Err(ZoneError::Usage { .. }))
        ));
    }

    #[test]
    fn test_unknown_command_is_none() {
        assert_eq!(bind("/dance"), None);
        assert_eq!(bind("/z4"), None);
    }
}
