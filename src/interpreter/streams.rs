//! Input/Output Streams
//!
//! The interpreter's active output sink and input source. Pipes and
//! redirections swap these out for the duration of one sub-evaluation and
//! put the previous stream back afterwards.

use std::io::{self, Cursor, Read, Write};

/// Where command output goes.
pub enum OutputSink {
    /// The process's standard output
    Stdout,
    /// In-memory capture (pipes, embedding)
    Buffer(Vec<u8>),
    /// Any other writer, typically a redirected file
    Stream(Box<dyn Write>),
}

impl OutputSink {
    /// An empty in-memory capture.
    pub fn buffer() -> Self {
        OutputSink::Buffer(Vec::new())
    }

    /// Captured bytes; empty for the other variants.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            OutputSink::Buffer(bytes) => bytes,
            _ => Vec::new(),
        }
    }
}

impl Default for OutputSink {
    fn default() -> Self {
        OutputSink::Stdout
    }
}

impl Write for OutputSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputSink::Stdout => io::stdout().write(buf),
            OutputSink::Buffer(bytes) => {
                bytes.extend_from_slice(buf);
                Ok(buf.len())
            }
            OutputSink::Stream(writer) => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputSink::Stdout => io::stdout().flush(),
            OutputSink::Buffer(_) => Ok(()),
            OutputSink::Stream(writer) => writer.flush(),
        }
    }
}

/// Where commands read input from.
pub enum InputSource {
    /// The process's standard input
    Stdin,
    /// Output of the left side of a pipe
    Buffer(Cursor<Vec<u8>>),
    /// Any other reader, typically a redirected file
    Stream(Box<dyn Read>),
}

impl InputSource {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        InputSource::Buffer(Cursor::new(bytes))
    }

    /// True when input comes from a pipe or a file rather than the terminal.
    pub fn is_redirected(&self) -> bool {
        !matches!(self, InputSource::Stdin)
    }

    /// Drain the remaining input.
    pub fn read_all(&mut self) -> io::Result<Vec<u8>> {
        let mut content = Vec::new();
        self.read_to_end(&mut content)?;
        Ok(content)
    }
}

impl Default for InputSource {
    fn default() -> Self {
        InputSource::Stdin
    }
}

impl Read for InputSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            InputSource::Stdin => io::stdin().read(buf),
            InputSource::Buffer(cursor) => cursor.read(buf),
            InputSource::Stream(reader) => reader.read(buf),
        }
    }
}
