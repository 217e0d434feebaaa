//! Scripted in-memory transport and shared fixtures for codec tests.

use std::collections::VecDeque;
use std::io::{self, Read, Write};

use chrono::{TimeZone, Utc};

use crate::navigation::NavigationPacket;

/// Records every write and answers each read with the next scripted reply.
#[derive(Debug, Default)]
pub(crate) struct ScriptedTransport {
    replies: VecDeque<Vec<u8>>,
    pub written: Vec<Vec<u8>>,
    fail_writes: bool,
}

impl ScriptedTransport {
    pub fn new<I, R>(replies: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[u8]>,
    {
        Self {
            replies: replies.into_iter().map(|r| r.as_ref().to_vec()).collect(),
            ..Default::default()
        }
    }

    /// Transport whose writes always fail.
    pub fn broken() -> Self {
        Self {
            fail_writes: true,
            ..Default::default()
        }
    }

    pub fn push_reply(&mut self, reply: impl AsRef<[u8]>) {
        self.replies.push_back(reply.as_ref().to_vec());
    }
}

impl Read for ScriptedTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let reply = self
            .replies
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no scripted reply"))?;
        let count = reply.len().min(buf.len());
        buf[..count].copy_from_slice(&reply[..count]);
        Ok(count)
    }
}

impl Write for ScriptedTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "connection reset"));
        }
        self.written.push(buf.to_vec());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Fix used by the locked golden frames.
pub(crate) fn reference_packet() -> NavigationPacket {
    let time = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
    NavigationPacket::new(123_456_789_012_345, time, 55.7558, 37.6173)
}

/// Copy of `bytes` with one byte inverted.
pub(crate) fn flip_byte(bytes: &[u8], index: usize) -> Vec<u8> {
    let mut flipped = bytes.to_vec();
    flipped[index] ^= 0xFF;
    flipped
}
