//! We use this mocking module in unit tests to emulate the instrument end of the serial
//! link.
//!
//! The mock is scripted: each call to `write` starts a new exchange and arms the next
//! queued response (or silence, if the queue is empty), which subsequent `read` calls
//! then serve byte by byte. An exhausted response yields `Ok(0)`, which the driver's
//! receive loop treats the same way as a serial timeout.

use std::collections::VecDeque;
use std::io;

pub struct MockSerial {
    /// Everything the driver has written, newline-terminated command after command.
    written: Vec<u8>,
    /// Scripted responses, one per exchange, oldest first.
    responses: VecDeque<Vec<u8>>,
    /// Response currently being served.
    current: Vec<u8>,
    position: usize,
    /// Set by `write`, consumed by the first `read` of the exchange.
    armed: bool,
    fail_writes: bool,
}

impl MockSerial {
    pub fn new() -> Self {
        Self {
            written: Vec::new(),
            responses: VecDeque::new(),
            current: Vec::new(),
            position: 0,
            armed: false,
            fail_writes: false,
        }
    }

    /// Queue a terminated response for the next unanswered exchange.
    pub fn queue_response(&mut self, text: &str) {
        let mut bytes = text.as_bytes().to_vec();
        bytes.extend_from_slice(b"\r\n");
        self.responses.push_back(bytes);
    }

    /// Queue an exchange the instrument does not answer, e.g. a pure write command.
    pub fn queue_silence(&mut self) {
        self.responses.push_back(Vec::new());
    }

    /// Queue raw bytes without a terminator, to exercise the timeout path.
    pub fn queue_raw(&mut self, bytes: &[u8]) {
        self.responses.push_back(bytes.to_vec());
    }

    /// The commands written so far, one string per terminated line.
    pub fn written_lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.written)
            .split_terminator('\n')
            .map(str::to_string)
            .collect()
    }

    /// Make every subsequent write fail.
    pub fn set_write_error(&mut self, fail: bool) {
        self.fail_writes = fail;
    }
}

impl io::Write for MockSerial {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "simulated write failure"));
        }
        self.written.extend_from_slice(buf);
        self.armed = true;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Read for MockSerial {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.armed {
            self.current = self.responses.pop_front().unwrap_or_default();
            self.position = 0;
            self.armed = false;
        }
        if self.position >= self.current.len() {
            // Nothing (more) to say; the driver treats this like a timed-out read.
            return Ok(0);
        }
        let available = self.current.len() - self.position;
        let count = buf.len().min(available);
        buf[..count].copy_from_slice(&self.current[self.position..self.position + count]);
        self.position += count;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};

    #[test]
    fn records_written_lines() {
        let mut mock = MockSerial::new();
        mock.write_all(b"*IDN?\n").unwrap();
        mock.write_all(b"SYSTem:REMote\n").unwrap();
        assert_eq!(mock.written_lines(), vec!["*IDN?", "SYSTem:REMote"]);
    }

    #[test]
    fn serves_one_response_per_exchange() {
        let mut mock = MockSerial::new();
        mock.queue_response("first");
        mock.queue_response("second");

        let mut buf = [0u8; 32];
        mock.write_all(b"A?\n").unwrap();
        let n = mock.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"first\r\n");

        mock.write_all(b"B?\n").unwrap();
        let n = mock.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"second\r\n");
    }

    #[test]
    fn empty_queue_reads_as_silence() {
        let mut mock = MockSerial::new();
        let mut buf = [0u8; 8];
        mock.write_all(b"SYSTem:BEEPer:IMMediate\n").unwrap();
        assert_eq!(mock.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn silence_does_not_consume_later_responses() {
        let mut mock = MockSerial::new();
        mock.queue_silence();
        mock.queue_response("answer");

        let mut buf = [0u8; 16];
        mock.write_all(b"*CLS\n").unwrap();
        assert_eq!(mock.read(&mut buf).unwrap(), 0);

        mock.write_all(b"Q?\n").unwrap();
        let n = mock.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"answer\r\n");
    }

    #[test]
    fn write_error_simulation() {
        let mut mock = MockSerial::new();
        mock.set_write_error(true);
        assert!(mock.write_all(b"*RST\n").is_err());
        assert!(mock.written_lines().is_empty());
    }
}
