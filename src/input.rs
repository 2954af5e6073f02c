//! Byte sources consulted by the `,` instruction.
//!
//! A source hands out one byte per call, or `Ok(None)` once it has nothing
//! left. The engine asks exactly once per executed `,`, so bytes are
//! consumed in program order.

use std::io::{self, Read};

/// Something `,` can read from.
pub trait ByteSource {
    /// Next byte, `Ok(None)` when exhausted.
    fn next_byte(&mut self) -> io::Result<Option<u8>>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        (**self).next_byte()
    }
}

/// Pulls single bytes from any [`Read`] (stdin, files, byte slices).
#[derive(Debug)]
pub struct ReadSource<R> {
    reader: R,
}

impl<R: Read> ReadSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl ReadSource<io::Stdin> {
    pub fn stdin() -> Self {
        Self::new(io::stdin())
    }
}

impl<R: Read> ByteSource for ReadSource<R> {
    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

/// Adapts a closure returning `None` at end of input.
pub struct FromFn<F>(F);

/// Build a [`ByteSource`] from a closure.
///
/// ```
/// use bf_tape::input::{from_fn, ByteSource};
///
/// let mut bytes = b"ok".iter().copied();
/// let mut source = from_fn(move || bytes.next());
/// assert_eq!(source.next_byte().unwrap(), Some(b'o'));
/// ```
pub fn from_fn<F>(f: F) -> FromFn<F>
where
    F: FnMut() -> Option<u8>,
{
    FromFn(f)
}

impl<F> ByteSource for FromFn<F>
where
    F: FnMut() -> Option<u8>,
{
    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        Ok((self.0)())
    }
}

/// A source with no bytes at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct Empty;

impl ByteSource for Empty {
    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(None)
    }
}
