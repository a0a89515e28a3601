//! Command table and first-match dispatch.

use core::fmt;

use gcode_proto::{Packet, ParamError, MAX_COMMAND_SIZE};
use heapless::{String, Vec};

/// Default number of command slots in a table.
pub const MAX_COMMANDS: usize = 32;

type Token = String<{ MAX_COMMAND_SIZE - 1 }>;

/// A dispatched packet as seen by a handler.
///
/// The packet is only borrowed for the duration of the call; its storage is
/// reused for the next packet.
#[derive(Debug, Clone, Copy)]
pub struct Request<'a> {
    command: Option<&'a str>,
    packet: &'a Packet,
}

impl<'a> Request<'a> {
    /// Wrap a packet together with the token it matched.
    #[must_use]
    pub fn new(command: Option<&'a str>, packet: &'a Packet) -> Self {
        Self { command, packet }
    }

    /// Matched command token, or `None` when the default handler runs.
    #[inline]
    #[must_use]
    pub fn command(&self) -> Option<&'a str> {
        self.command
    }

    /// The raw packet.
    #[inline]
    #[must_use]
    pub fn packet(&self) -> &'a Packet {
        self.packet
    }

    /// Read a numeric parameter from the packet.
    #[inline]
    pub fn value(&self, name: &str) -> Result<f32, ParamError> {
        self.packet.value(name)
    }

    /// Read a numeric parameter truncated to an integer.
    #[inline]
    pub fn int_value(&self, name: &str) -> Result<i32, ParamError> {
        self.packet.int_value(name)
    }
}

/// Handler invoked for a dispatched packet.
///
/// `C` is the application context handed to [`crate::Engine::poll`], e.g. the
/// motor controller the command acts on. Closures and functions with the
/// matching signature implement this trait:
///
/// ```
/// use gcode_core::{CommandHandler, Request};
///
/// struct Axis { target: f32 }
///
/// fn move_to(axis: &mut Axis, req: &Request<'_>) {
///     if let Ok(x) = req.value("X") {
///         axis.target = x;
///     }
/// }
///
/// let handler: &dyn CommandHandler<Axis> = &move_to;
/// ```
pub trait CommandHandler<C> {
    /// Act on a packet routed to this handler.
    fn handle(&self, ctx: &mut C, request: &Request<'_>);
}

impl<C, F> CommandHandler<C> for F
where
    F: Fn(&mut C, &Request<'_>),
{
    #[inline]
    fn handle(&self, ctx: &mut C, request: &Request<'_>) {
        self(ctx, request)
    }
}

/// Error returned by [`CommandTable::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterError {
    /// Token longer than `MAX_COMMAND_SIZE - 1` bytes.
    TokenTooLong,
    /// No free slot left in the table.
    TableFull,
}

impl fmt::Display for RegisterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TokenTooLong => write!(f, "command token too long"),
            Self::TableFull => write!(f, "command table full"),
        }
    }
}

/// Which handler, if any, received a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Dispatch {
    /// The entry at this registration index matched.
    Matched(usize),
    /// No entry matched; the default handler ran.
    Default,
    /// No entry matched and there is no default handler.
    Dropped,
}

struct CommandEntry<'h, C> {
    token: Token,
    handler: &'h dyn CommandHandler<C>,
}

/// Ordered (token, handler) list plus an optional default handler.
///
/// Entries are append-only. Tokens are compared by exact equality with the
/// packet's first token and the earliest registration wins.
pub struct CommandTable<'h, C, const N: usize = MAX_COMMANDS> {
    entries: Vec<CommandEntry<'h, C>, N>,
    default: Option<&'h dyn CommandHandler<C>>,
}

impl<'h, C, const N: usize> Default for CommandTable<'h, C, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'h, C, const N: usize> CommandTable<'h, C, N> {
    /// Create an empty table with no default handler.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            default: None,
        }
    }

    /// Add a command.
    ///
    /// An empty `token` sets the default handler instead of adding an entry.
    /// Duplicate tokens are accepted; only the first one is ever dispatched.
    ///
    /// # Errors
    ///
    /// Returns [`RegisterError::TokenTooLong`] for tokens over
    /// `MAX_COMMAND_SIZE - 1` bytes and [`RegisterError::TableFull`] when all
    /// `N` slots are taken.
    pub fn register(
        &mut self,
        token: &str,
        handler: &'h dyn CommandHandler<C>,
    ) -> Result<(), RegisterError> {
        if token.is_empty() {
            self.set_default(handler);
            return Ok(());
        }

        let mut slot = Token::new();
        slot.push_str(token).map_err(|()| RegisterError::TokenTooLong)?;

        self.entries
            .push(CommandEntry {
                token: slot,
                handler,
            })
            .map_err(|_| RegisterError::TableFull)
    }

    /// Set the handler for packets no entry matches.
    pub fn set_default(&mut self, handler: &'h dyn CommandHandler<C>) {
        self.default = Some(handler);
    }

    /// Number of registered entries, not counting the default handler.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries are registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a default handler is set.
    #[inline]
    #[must_use]
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Index and token of the first entry matching `command`.
    #[must_use]
    pub fn lookup(&self, command: &[u8]) -> Option<(usize, &str)> {
        self.entries
            .iter()
            .position(|entry| entry.token.as_bytes() == command)
            .map(|index| (index, self.entries[index].token.as_str()))
    }

    /// Dispatch a packet to at most one handler.
    ///
    /// On a match `acknowledge` runs first, then the entry's handler. The
    /// handler runs even if the acknowledgement failed; that error is
    /// returned afterwards. The default handler gets no acknowledgement.
    pub fn dispatch<E>(
        &self,
        ctx: &mut C,
        packet: &Packet,
        acknowledge: impl FnOnce() -> Result<(), E>,
    ) -> Result<Dispatch, E> {
        if let Some((index, token)) = self.lookup(packet.command()) {
            let acked = acknowledge();
            self.entries[index]
                .handler
                .handle(ctx, &Request::new(Some(token), packet));
            return acked.map(|()| Dispatch::Matched(index));
        }

        match self.default {
            Some(handler) => {
                handler.handle(ctx, &Request::new(None, packet));
                Ok(Dispatch::Default)
            }
            None => Ok(Dispatch::Dropped),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use core::cell::RefCell;
    use core::convert::Infallible;
    use std::format;
    use std::string::String;
    use std::vec::Vec;

    type Calls = Vec<String>;

    fn handler_a(calls: &mut Calls, req: &Request<'_>) {
        calls.push(format!("A {:?}", req.command()));
    }

    fn handler_b(calls: &mut Calls, req: &Request<'_>) {
        calls.push(format!("B {:?}", req.command()));
    }

    fn fallback(calls: &mut Calls, req: &Request<'_>) {
        calls.push(format!("default {:?}", req.packet().as_str()));
    }

    fn packet(line: &str) -> Packet {
        Packet::try_from(line).unwrap()
    }

    fn no_ack() -> Result<(), Infallible> {
        Ok(())
    }

    #[test]
    fn test_first_match_wins() {
        let (a, b) = (handler_a, handler_b);
        let mut table: CommandTable<'_, Calls> = CommandTable::new();
        table.register("G0", &a).unwrap();
        table.register("G0", &b).unwrap();

        let mut calls = Calls::new();
        let result = table.dispatch(&mut calls, &packet("G0 X5\n"), no_ack);
        assert_eq!(result, Ok(Dispatch::Matched(0)));
        assert_eq!(calls, ["A Some(\"G0\")"]);
    }

    #[test]
    fn test_exact_token_match() {
        let (a, b) = (handler_a, handler_b);
        let mut table: CommandTable<'_, Calls> = CommandTable::new();
        table.register("M1", &a).unwrap();
        table.register("M10", &b).unwrap();

        let mut calls = Calls::new();
        table.dispatch(&mut calls, &packet("M10\n"), no_ack).unwrap();
        table.dispatch(&mut calls, &packet("M1 A3\n"), no_ack).unwrap();
        assert_eq!(calls, ["B Some(\"M10\")", "A Some(\"M1\")"]);
    }

    #[test]
    fn test_unmatched_goes_to_default() {
        let (a, d) = (handler_a, fallback);
        let mut table: CommandTable<'_, Calls> = CommandTable::new();
        table.register("G0", &a).unwrap();
        table.register("", &d).unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.has_default());

        let mut calls = Calls::new();
        let result = table.dispatch(&mut calls, &packet("G9 X1\n"), no_ack);
        assert_eq!(result, Ok(Dispatch::Default));
        assert_eq!(calls, ["default Some(\"G9 X1\\n\")"]);
    }

    #[test]
    fn test_unmatched_without_default_is_dropped() {
        let a = handler_a;
        let mut table: CommandTable<'_, Calls> = CommandTable::new();
        table.register("G0", &a).unwrap();

        let mut calls = Calls::new();
        let result = table.dispatch(&mut calls, &packet("G9\n"), no_ack);
        assert_eq!(result, Ok(Dispatch::Dropped));
        assert!(calls.is_empty());
    }

    #[test]
    fn test_acknowledge_runs_only_on_match() {
        let (a, d) = (handler_a, fallback);
        let mut table: CommandTable<'_, Calls> = CommandTable::new();
        table.register("G0", &a).unwrap();
        table.set_default(&d);

        let mut acks = 0;
        let mut calls = Calls::new();
        table
            .dispatch(&mut calls, &packet("G0\n"), || -> Result<(), Infallible> {
                acks += 1;
                Ok(())
            })
            .unwrap();
        table
            .dispatch(&mut calls, &packet("G1\n"), || -> Result<(), Infallible> {
                acks += 1;
                Ok(())
            })
            .unwrap();
        assert_eq!(acks, 1);
        assert_eq!(calls.len(), 2);
    }

    #[test]
    fn test_failed_acknowledge_still_runs_handler() {
        let a = handler_a;
        let mut table: CommandTable<'_, Calls> = CommandTable::new();
        table.register("G0", &a).unwrap();

        let mut calls = Calls::new();
        let result = table.dispatch(&mut calls, &packet("G0\n"), || Err("write failed"));
        assert_eq!(result, Err("write failed"));
        assert_eq!(calls.len(), 1);
    }

    #[test]
    fn test_token_too_long() {
        let a = handler_a;
        let mut table: CommandTable<'_, Calls> = CommandTable::new();
        assert_eq!(table.register("M100", &a), Ok(()));
        assert_eq!(table.register("M1000", &a), Err(RegisterError::TokenTooLong));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_table_full() {
        let a = handler_a;
        let mut table: CommandTable<'_, Calls, 2> = CommandTable::new();
        table.register("G0", &a).unwrap();
        table.register("G1", &a).unwrap();
        assert_eq!(table.register("G2", &a), Err(RegisterError::TableFull));

        // Default handler does not take a slot
        assert_eq!(table.register("", &a), Ok(()));
    }

    #[test]
    fn test_lookup() {
        let a = handler_a;
        let mut table: CommandTable<'_, Calls> = CommandTable::new();
        table.register("G0", &a).unwrap();
        table.register("G5", &a).unwrap();
        assert_eq!(table.lookup(b"G5"), Some((1, "G5")));
        assert_eq!(table.lookup(b"G"), None);
    }

    struct Counter(core::cell::Cell<u32>);

    impl CommandHandler<Calls> for Counter {
        fn handle(&self, _: &mut Calls, _: &Request<'_>) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_struct_handler() {
        let counter = Counter(core::cell::Cell::new(0));
        let mut table: CommandTable<'_, Calls> = CommandTable::new();
        table.register("M0", &counter).unwrap();

        let mut calls = Calls::new();
        table.dispatch(&mut calls, &packet("M0\n"), no_ack).unwrap();
        table.dispatch(&mut calls, &packet("M0\n"), no_ack).unwrap();
        assert_eq!(counter.0.get(), 2);
    }

    struct Logger<'a>(&'a RefCell<Vec<&'static str>>);

    impl CommandHandler<Calls> for Logger<'_> {
        fn handle(&self, _: &mut Calls, _: &Request<'_>) {
            self.0.borrow_mut().push("handler");
        }
    }

    #[test]
    fn test_acknowledge_precedes_handler() {
        let log = RefCell::new(Vec::new());
        let logger = Logger(&log);
        let mut table: CommandTable<'_, Calls> = CommandTable::new();
        table.register("G1", &logger).unwrap();

        let mut calls = Calls::new();
        let result = table.dispatch(&mut calls, &packet("G1 X2\n"), || -> Result<(), Infallible> {
            log.borrow_mut().push("ack");
            Ok(())
        });
        assert_eq!(result, Ok(Dispatch::Matched(0)));
        assert_eq!(*log.borrow(), ["ack", "handler"]);
    }
}
