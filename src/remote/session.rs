//! The three mixer interactions: device info, fader moves, meter stream.

use std::io;
use std::time::{Duration, Instant};

use thiserror::Error;

use super::transport::Transport;
use crate::meter::{MeterBlob, MeterError};
use crate::osc::{self, OscError, OscMessage, OscType};

/// How long to wait for the single `/info` reply.
const INFO_REPLY_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("transport: {0}")]
    Transport(#[from] io::Error),

    #[error("osc: {0}")]
    Osc(#[from] OscError),

    #[error("meter: {0}")]
    Meter(#[from] MeterError),

    #[error("no blob argument in meter message {addr}")]
    MissingBlob { addr: String },
}

/// Drives one mixer over an injected transport. The session borrows the
/// transport for each call and keeps no other state between calls.
pub struct MixerSession<T: Transport> {
    transport: T,
    meter_feed: String,
}

impl<T: Transport> MixerSession<T> {
    pub fn new(transport: T, meter_feed: impl Into<String>) -> Self {
        MixerSession {
            transport,
            meter_feed: meter_feed.into(),
        }
    }

    /// Asks the mixer for its identity. The reply is returned as decoded;
    /// interpreting its arguments is the caller's business.
    pub fn query_info(&self) -> Result<OscMessage, SessionError> {
        let request = OscMessage::new("/info", vec![]);
        self.transport.send(&osc::encoder::encode(&request))?;

        let datagram = self.transport.receive(INFO_REPLY_TIMEOUT)?;
        Ok(osc::decoder::decode(&datagram)?)
    }

    /// Moves one channel fader: 0.0 is -inf dB, 1.0 is full scale. The
    /// level is forwarded untouched; the mixer owns the valid range. The
    /// mixer sends no acknowledgement.
    pub fn set_channel_fader(&self, channel: u8, level: f32) -> Result<(), SessionError> {
        let request = OscMessage::new(
            format!("/ch/{:02}/mix/fader", channel),
            vec![OscType::Float(level)],
        );
        self.transport.send(&osc::encoder::encode(&request))?;
        Ok(())
    }

    /// Subscribes to the meter feed and returns a stream of channel-1
    /// loudness samples. The stream ends when `duration` has elapsed or
    /// the transport fails; it cannot be restarted, subscribe again for a
    /// fresh one.
    pub fn subscribe_meters(&self, duration: Duration) -> Result<MeterStream<'_, T>, SessionError> {
        let request = OscMessage::new(
            "/meters",
            vec![OscType::String(self.meter_feed.clone())],
        );
        self.transport.send(&osc::encoder::encode(&request))?;

        Ok(MeterStream {
            session: self,
            deadline: Instant::now() + duration,
            done: false,
        })
    }

    /// Decodes one inbound datagram during a meter subscription. `None`
    /// means the datagram was valid but not meter traffic.
    fn decode_meter_update(&self, datagram: &[u8]) -> Result<Option<i16>, SessionError> {
        let message = osc::decoder::decode(datagram)?;
        if message.addr != self.meter_feed {
            if crate::is_debug_enabled() {
                println!("[meters] ignoring {}", message.addr);
            }
            return Ok(None);
        }

        let blob = message
            .args
            .iter()
            .find_map(|arg| match arg {
                OscType::Blob(bytes) => Some(bytes),
                _ => None,
            })
            .ok_or_else(|| SessionError::MissingBlob {
                addr: message.addr.clone(),
            })?;

        let blob = MeterBlob::decode(blob)?;
        if let Some(mismatch) = blob.length_mismatch() {
            eprintln!("[meters] {}", mismatch);
        }
        Ok(Some(blob.loudness_of_channel_1()?))
    }
}

/// Lazy, finite stream of channel-1 loudness samples. A decode problem on
/// one datagram surfaces as an `Err` item and the stream keeps going; a
/// transport failure ends it after surfacing the error.
pub struct MeterStream<'a, T: Transport> {
    session: &'a MixerSession<T>,
    deadline: Instant,
    done: bool,
}

impl<T: Transport> Iterator for MeterStream<'_, T> {
    type Item = Result<i16, SessionError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let remaining = self.deadline.checked_duration_since(Instant::now())?;

            let datagram = match self.session.transport.receive(remaining) {
                Ok(datagram) => datagram,
                Err(err)
                    if err.kind() == io::ErrorKind::WouldBlock
                        || err.kind() == io::ErrorKind::TimedOut =>
                {
                    // The deadline check above ends the stream once the
                    // subscription window has passed.
                    continue;
                }
                Err(err) => {
                    self.done = true;
                    return Some(Err(err.into()));
                }
            };

            match self.session.decode_meter_update(&datagram) {
                Ok(Some(sample)) => return Some(Ok(sample)),
                Ok(None) => continue,
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;
    use crate::osc::encoder;

    /// Transport fed from a script: records every send, replays queued
    /// receive results, then times out.
    struct ScriptedTransport {
        sent: RefCell<Vec<Vec<u8>>>,
        inbound: RefCell<VecDeque<io::Result<Vec<u8>>>>,
    }

    impl ScriptedTransport {
        fn new(inbound: Vec<io::Result<Vec<u8>>>) -> Self {
            ScriptedTransport {
                sent: RefCell::new(Vec::new()),
                inbound: RefCell::new(inbound.into()),
            }
        }
    }

    impl Transport for ScriptedTransport {
        fn send(&self, buf: &[u8]) -> io::Result<()> {
            self.sent.borrow_mut().push(buf.to_vec());
            Ok(())
        }

        fn receive(&self, _timeout: Duration) -> io::Result<Vec<u8>> {
            self.inbound
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(io::Error::new(io::ErrorKind::TimedOut, "script drained")))
        }
    }

    fn meter_datagram(samples: &[i16]) -> Vec<u8> {
        let mut payload = Vec::new();
        payload.extend_from_slice(&(samples.len() as u32).to_le_bytes());
        for s in samples {
            payload.extend_from_slice(&s.to_le_bytes());
        }
        encoder::encode(&OscMessage::new(
            "/meters/1",
            vec![OscType::Blob({
                let mut blob = ((payload.len()) as u32).to_be_bytes().to_vec();
                blob.extend_from_slice(&payload);
                blob
            })],
        ))
    }

    fn session(inbound: Vec<io::Result<Vec<u8>>>) -> MixerSession<ScriptedTransport> {
        MixerSession::new(ScriptedTransport::new(inbound), "/meters/1")
    }

    #[test]
    fn query_info_round_trip() {
        let reply = OscMessage::new(
            "/info",
            vec![
                OscType::String("V2.07".into()),
                OscType::String("XR12".into()),
            ],
        );
        let session = session(vec![Ok(encoder::encode(&reply))]);

        let decoded = session.query_info().unwrap();
        assert_eq!(decoded, reply);
        assert_eq!(
            session.transport.sent.borrow()[0],
            b"/info\0\0\0,\0\0\0".to_vec()
        );
    }

    #[test]
    fn fader_command_wire_format() {
        let session = session(vec![]);
        session.set_channel_fader(1, 1.0).unwrap();

        let sent = session.transport.sent.borrow();
        let mut expected = b"/ch/01/mix/fader\0\0\0\0,f\0\0".to_vec();
        expected.extend_from_slice(&[0x3f, 0x80, 0x00, 0x00]);
        assert_eq!(sent[0], expected);
    }

    #[test]
    fn fader_channel_number_is_zero_padded() {
        let session = session(vec![]);
        session.set_channel_fader(12, 0.0).unwrap();
        assert!(session.transport.sent.borrow()[0].starts_with(b"/ch/12/mix/fader\0"));
    }

    #[test]
    fn meter_stream_yields_samples_until_drained() {
        let session = session(vec![
            Ok(meter_datagram(&[-100, 50, 0])),
            Ok(meter_datagram(&[-2000])),
        ]);

        let mut stream = session.subscribe_meters(Duration::from_millis(20)).unwrap();
        assert_eq!(stream.next().unwrap().unwrap(), -100);
        assert_eq!(stream.next().unwrap().unwrap(), -2000);
        // Script drained: the stream times out until the deadline passes.
        assert!(stream.next().is_none());
        assert!(stream.next().is_none());

        // The subscription request went out first.
        let sent = session.transport.sent.borrow();
        let request = osc::decoder::decode(&sent[0]).unwrap();
        assert_eq!(request.addr, "/meters");
        assert_eq!(request.args, vec![OscType::String("/meters/1".into())]);
    }

    #[test]
    fn foreign_addresses_are_skipped_not_errors() {
        let unrelated = encoder::encode(&OscMessage::new("/xremote", vec![]));
        let session = session(vec![
            Ok(unrelated),
            Ok(meter_datagram(&[-300])),
        ]);

        let mut stream = session.subscribe_meters(Duration::from_millis(20)).unwrap();
        assert_eq!(stream.next().unwrap().unwrap(), -300);
    }

    #[test]
    fn bad_datagram_is_an_error_item_not_the_end() {
        let session = session(vec![
            Ok(vec![0xff, 0xff, 0xff, 0xff]),
            Ok(meter_datagram(&[-1234])),
        ]);

        let mut stream = session.subscribe_meters(Duration::from_millis(20)).unwrap();
        assert!(matches!(
            stream.next().unwrap(),
            Err(SessionError::Osc(_))
        ));
        assert_eq!(stream.next().unwrap().unwrap(), -1234);
    }

    #[test]
    fn transport_failure_ends_the_stream() {
        let session = session(vec![
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "closed")),
        ]);

        let mut stream = session.subscribe_meters(Duration::from_secs(5)).unwrap();
        assert!(matches!(
            stream.next().unwrap(),
            Err(SessionError::Transport(_))
        ));
        assert!(stream.next().is_none());
    }

    #[test]
    fn meter_message_without_blob_is_an_error_item() {
        let bogus = encoder::encode(&OscMessage::new(
            "/meters/1",
            vec![OscType::Int(1)],
        ));
        let session = session(vec![Ok(bogus), Ok(meter_datagram(&[-5]))]);

        let mut stream = session.subscribe_meters(Duration::from_millis(20)).unwrap();
        assert!(matches!(
            stream.next().unwrap(),
            Err(SessionError::MissingBlob { .. })
        ));
        assert_eq!(stream.next().unwrap().unwrap(), -5);
    }
}
