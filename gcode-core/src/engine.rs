//! Engine: connects a transport to the command table.

use core::fmt;

use gcode_proto::{
    encode_command, encode_error_reply, FrameStatus, Packet, ParamError, SerializeError,
};

use crate::command::{CommandHandler, CommandTable, Dispatch, RegisterError, MAX_COMMANDS};
use crate::config::EngineConfig;
use crate::framing::{FrameEvent, Framer};
use crate::transport::{Clock, Transport};

/// Poll-driven protocol engine.
///
/// Each [`Engine::poll`] reads at most one byte from the transport, advances
/// framing and, when a packet completes, runs the checksum gate and either
/// dispatches the packet or replies with an error code.
///
/// `C` is the context handed to every handler; `N` bounds the number of
/// registered commands.
///
/// # Error Handling
///
/// Framing and checksum failures are reported to the sender and through the
/// returned [`FrameStatus`]; they are never fatal. Transport errors are
/// returned as-is and polling can simply continue afterwards.
pub struct Engine<'h, T, K, C, const N: usize = MAX_COMMANDS> {
    transport: T,
    clock: K,
    config: EngineConfig,
    framer: Framer,
    commands: CommandTable<'h, C, N>,
    status: FrameStatus,
}

impl<'h, T, K, C, const N: usize> Engine<'h, T, K, C, N>
where
    T: Transport,
    K: Clock,
{
    /// Create an engine with an empty command table.
    pub fn new(transport: T, clock: K, config: EngineConfig) -> Self {
        Self {
            transport,
            clock,
            config,
            framer: Framer::new(config.packet_timeout_us),
            commands: CommandTable::new(),
            status: FrameStatus::None,
        }
    }

    /// Register a command handler. An empty token sets the default handler.
    ///
    /// # Errors
    ///
    /// See [`CommandTable::register`].
    pub fn register(
        &mut self,
        token: &str,
        handler: &'h dyn CommandHandler<C>,
    ) -> Result<(), RegisterError> {
        self.commands.register(token, handler)
    }

    /// Set the handler for packets no registered command matches.
    pub fn set_default(&mut self, handler: &'h dyn CommandHandler<C>) {
        self.commands.set_default(handler);
    }

    /// Run one step.
    ///
    /// Returns the status produced by this step; [`FrameStatus::None`] while
    /// no packet has completed.
    ///
    /// # Errors
    ///
    /// Returns the transport error if reading a byte or writing a reply
    /// failed. A handler has already run when a reply write fails.
    pub fn poll(&mut self, ctx: &mut C) -> Result<FrameStatus, T::Error> {
        let now = self.clock.now_micros();
        self.status = FrameStatus::None;

        let status = match self.framer.poll(&mut self.transport, now)? {
            FrameEvent::Pending => FrameStatus::None,
            FrameEvent::Overflow => FrameStatus::Overflow,
            FrameEvent::Complete => {
                trace!("packet complete: {}", self.framer.packet());
                self.config.gate(self.framer.packet())
            }
        };

        self.finish(ctx, status)
    }

    /// Handle a complete line that arrived outside the transport.
    ///
    /// The line is gated, dispatched and replied to exactly as if it had
    /// been framed from the transport. Any packet in flight is abandoned.
    ///
    /// # Errors
    ///
    /// Returns the transport error if writing the reply failed.
    pub fn submit(&mut self, ctx: &mut C, line: &[u8]) -> Result<FrameStatus, T::Error> {
        let status = match self.framer.load(line) {
            Ok(()) => self.config.gate(self.framer.packet()),
            Err(_) => FrameStatus::Overflow,
        };
        self.finish(ctx, status)
    }

    fn finish(&mut self, ctx: &mut C, status: FrameStatus) -> Result<FrameStatus, T::Error> {
        self.status = status;
        if status == FrameStatus::Ready {
            let dispatch = self.dispatch(ctx)?;
            debug!("dispatched: {}", dispatch);
        } else if status.is_error() {
            warn!("packet rejected: {}", status);
            self.reply_error(status)?;
        }
        Ok(status)
    }

    fn dispatch(&mut self, ctx: &mut C) -> Result<Dispatch, T::Error> {
        let Self {
            transport,
            config,
            framer,
            commands,
            ..
        } = self;
        let reply = config.valid_reply;
        commands.dispatch(ctx, framer.packet(), || transport.write_line(reply))
    }

    fn reply_error(&mut self, status: FrameStatus) -> Result<(), T::Error> {
        match encode_error_reply(self.config.error_reply, status) {
            Ok(reply) => self.transport.write_line(&reply),
            Err(_) => {
                warn!("error reply prefix too long, sending it bare");
                self.transport.write_line(self.config.error_reply)
            }
        }
    }

    /// Write an outgoing command line.
    ///
    /// A ` *<checksum>` field is appended when checksums are enabled.
    ///
    /// # Errors
    ///
    /// Returns [`SendError::Encode`] if the line cannot be encoded and
    /// [`SendError::Transport`] if the write failed.
    pub fn send(&mut self, command: &str) -> Result<(), SendError<T::Error>> {
        let line =
            encode_command(command, self.config.outgoing_checksum()).map_err(SendError::Encode)?;
        self.transport
            .write_line(&line)
            .map_err(SendError::Transport)
    }

    /// Status produced by the most recent poll or submit.
    #[inline]
    pub fn status(&self) -> FrameStatus {
        self.status
    }

    /// The current packet.
    ///
    /// Only meaningful right after a poll returned a completed status; the
    /// next poll clears it.
    #[inline]
    pub fn packet(&self) -> &Packet {
        self.framer.packet()
    }

    /// Whether the current packet's command is `token`.
    pub fn check(&self, token: &str) -> bool {
        self.framer.packet().is_command(token)
    }

    /// Read a numeric parameter from the current packet.
    pub fn value(&self, name: &str) -> Result<f32, ParamError> {
        self.framer.packet().value(name)
    }

    /// Read an integer parameter from the current packet.
    pub fn int_value(&self, name: &str) -> Result<i32, ParamError> {
        self.framer.packet().int_value(name)
    }

    /// Settings the engine was created with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The registered commands.
    pub fn commands(&self) -> &CommandTable<'h, C, N> {
        &self.commands
    }

    /// Get a reference to the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get a mutable reference to the transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Get a reference to the clock.
    pub fn clock(&self) -> &K {
        &self.clock
    }

    /// Decompose the engine into its transport and clock.
    pub fn into_parts(self) -> (T, K) {
        (self.transport, self.clock)
    }
}

/// Error type for [`Engine::send`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SendError<E> {
    /// The command could not be encoded.
    Encode(SerializeError),
    /// Error from the transport.
    Transport(E),
}

impl<E: fmt::Debug> fmt::Display for SendError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode(e) => write!(f, "encode failed: {}", e),
            Self::Transport(e) => write!(f, "transport error: {:?}", e),
        }
    }
}
