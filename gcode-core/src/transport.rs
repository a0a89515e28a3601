//! Byte-stream transport and monotonic clock traits.

use core::fmt::Debug;

/// Duplex byte stream the engine polls.
///
/// Implementations must not block: [`Transport::available`] and
/// [`Transport::read_byte`] are called once per engine poll from the
/// application's control loop.
pub trait Transport {
    /// Error reported by the underlying port.
    type Error: Debug;

    /// Number of bytes that can be read without blocking.
    fn available(&mut self) -> Result<usize, Self::Error>;

    /// Read one byte, or `None` if nothing was available after all.
    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error>;

    /// Write one line; the implementation appends the line terminator.
    fn write_line(&mut self, line: &str) -> Result<(), Self::Error>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Error = T::Error;

    #[inline]
    fn available(&mut self) -> Result<usize, Self::Error> {
        T::available(self)
    }

    #[inline]
    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        T::read_byte(self)
    }

    #[inline]
    fn write_line(&mut self, line: &str) -> Result<(), Self::Error> {
        T::write_line(self, line)
    }
}

/// Monotonic time source with microsecond resolution.
pub trait Clock {
    /// Microseconds since an arbitrary fixed origin.
    fn now_micros(&self) -> u64;
}

impl<K: Clock + ?Sized> Clock for &K {
    #[inline]
    fn now_micros(&self) -> u64 {
        K::now_micros(self)
    }
}

/// [`Clock`] backed by `std::time::Instant`, for host tools and tests.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for StdClock {
    fn now_micros(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_micros()).unwrap_or(u64::MAX)
    }
}

/// [`Transport`] over an `embedded-io` serial port.
///
/// Works with any blocking port that can report whether a read would block,
/// such as a buffered UART.
///
/// ```ignore
/// let uart = BufferedUart::new(/* ... */);
/// let transport = IoTransport::new(uart);
/// ```
#[cfg(feature = "embedded-io")]
pub struct IoTransport<P> {
    port: P,
}

#[cfg(feature = "embedded-io")]
impl<P> IoTransport<P> {
    /// Wrap a serial port.
    #[must_use]
    pub fn new(port: P) -> Self {
        Self { port }
    }

    /// Get a reference to the port.
    pub fn port(&self) -> &P {
        &self.port
    }

    /// Get a mutable reference to the port.
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Return the wrapped port.
    pub fn into_inner(self) -> P {
        self.port
    }
}

#[cfg(feature = "embedded-io")]
impl<P> Transport for IoTransport<P>
where
    P: embedded_io::Read + embedded_io::ReadReady + embedded_io::Write,
{
    type Error = P::Error;

    fn available(&mut self) -> Result<usize, Self::Error> {
        Ok(usize::from(self.port.read_ready()?))
    }

    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        let mut byte = [0u8; 1];
        match self.port.read(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }

    fn write_line(&mut self, line: &str) -> Result<(), Self::Error> {
        self.port.write_all(line.as_bytes())?;
        self.port.write_all(&[gcode_proto::LINE_TERMINATOR])?;
        self.port.flush()
    }
}
