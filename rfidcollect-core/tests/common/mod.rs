//! Common test doubles for integration tests
//!
//! This module provides:
//! - A scripted uplink standing in for WiFi + HTTP client
//! - A delay that records instead of sleeping
//! - A scripted tag reader
//! - Engine/collector constructors wired to the doubles

#![allow(dead_code)]

use std::collections::VecDeque;

use rfidcollect_core::{
    collector::{Collector, CollectorConfig},
    delivery::{DeliveryConfig, DeliveryEngine},
    diagnostics::MemorySink,
    observation::TagId,
    time::FixedClock,
    traits::{Delay, NetworkStatus, ResponseCode, Session, TagReader, Transport},
};

/// Endpoint used by every test engine
pub const ENDPOINT: &str = "http://10.14.11.141:3000/api/data";

/// Stamp reported by the default test clock
pub const STAMP: &str = "2025-04-09T16:31:22";

/// What the next attempt should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scripted {
    /// `begin_session` fails
    SessionFail,
    /// Session opens; `post` returns this code
    Code(i32),
}

/// One POST as seen by the uplink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub endpoint: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Transport + network status driven by a script
///
/// Each attempt pops the next scripted outcome; an empty script answers
/// with `fallback`.
#[derive(Debug)]
pub struct ScriptedUplink {
    connected: bool,
    script: VecDeque<Scripted>,
    fallback: Scripted,
    pub attempts: usize,
    pub sessions_closed: usize,
    pub requests: Vec<Request>,
}

impl ScriptedUplink {
    /// Connected uplink answering 200 unless scripted otherwise
    pub fn online() -> Self {
        Self {
            connected: true,
            script: VecDeque::new(),
            fallback: Scripted::Code(200),
            attempts: 0,
            sessions_closed: 0,
            requests: Vec::new(),
        }
    }

    /// Uplink with no network path
    pub fn offline() -> Self {
        Self { connected: false, ..Self::online() }
    }

    /// Queue outcomes for the next attempts
    pub fn script(mut self, outcomes: &[Scripted]) -> Self {
        self.script.extend(outcomes.iter().copied());
        self
    }

    /// Outcome once the script runs out
    pub fn fallback(mut self, outcome: Scripted) -> Self {
        self.fallback = outcome;
        self
    }

    /// Append outcomes to the script
    pub fn push(&mut self, outcomes: &[Scripted]) {
        self.script.extend(outcomes.iter().copied());
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    pub fn set_fallback(&mut self, outcome: Scripted) {
        self.fallback = outcome;
    }

    /// `IdPubela` values of every POST, in order
    pub fn posted_tags(&self) -> Vec<String> {
        self.requests
            .iter()
            .map(|r| {
                let json: serde_json::Value = serde_json::from_str(&r.body).unwrap();
                json["IdPubela"].as_str().unwrap().to_string()
            })
            .collect()
    }

    fn next(&mut self) -> Scripted {
        self.script.pop_front().unwrap_or(self.fallback)
    }
}

pub struct ScriptedSession<'a> {
    uplink: &'a mut ScriptedUplink,
    endpoint: String,
    headers: Vec<(String, String)>,
    code: i32,
}

impl Session for ScriptedSession<'_> {
    fn add_header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_string(), value.to_string()));
    }

    fn post(&mut self, body: &[u8]) -> ResponseCode {
        self.uplink.requests.push(Request {
            endpoint: self.endpoint.clone(),
            headers: self.headers.clone(),
            body: String::from_utf8(body.to_vec()).unwrap(),
        });
        ResponseCode(self.code)
    }

    fn end(self) {
        self.uplink.sessions_closed += 1;
    }
}

impl Transport for ScriptedUplink {
    type Session<'a> = ScriptedSession<'a>;
    type Error = ();

    fn begin_session(&mut self, endpoint: &str) -> Result<Self::Session<'_>, Self::Error> {
        self.attempts += 1;
        match self.next() {
            Scripted::SessionFail => Err(()),
            Scripted::Code(code) => Ok(ScriptedSession {
                uplink: self,
                endpoint: endpoint.to_string(),
                headers: Vec::new(),
                code,
            }),
        }
    }
}

impl NetworkStatus for ScriptedUplink {
    fn is_connected(&self) -> bool {
        self.connected
    }
}

/// Delay that records each requested wait
#[derive(Debug, Default)]
pub struct RecordingDelay {
    pub waits: Vec<u32>,
}

impl Delay for RecordingDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.waits.push(ms);
    }
}

/// One scripted reader poll
#[derive(Debug, Clone, Copy)]
pub enum Read {
    Tag(&'static str),
    Idle,
    Fault,
}

/// Reader replaying a fixed sequence, then idling
#[derive(Debug, Default)]
pub struct ScriptedReader {
    reads: VecDeque<Read>,
}

impl ScriptedReader {
    pub fn new(reads: &[Read]) -> Self {
        Self { reads: reads.iter().copied().collect() }
    }

    pub fn push(&mut self, read: Read) {
        self.reads.push_back(read);
    }
}

impl TagReader for ScriptedReader {
    type Error = ();

    fn poll_tag(&mut self) -> nb::Result<TagId, Self::Error> {
        match self.reads.pop_front().unwrap_or(Read::Idle) {
            Read::Tag(raw) => Ok(TagId::new(raw).unwrap()),
            Read::Idle => Err(nb::Error::WouldBlock),
            Read::Fault => Err(nb::Error::Other(())),
        }
    }
}

pub type TestEngine<const N: usize = 20> =
    DeliveryEngine<ScriptedUplink, FixedClock, RecordingDelay, MemorySink, N>;

pub type TestCollector<const N: usize = 20> =
    Collector<ScriptedReader, ScriptedUplink, FixedClock, RecordingDelay, MemorySink, N>;

/// Engine with the default retry policy and a synced clock
pub fn engine<const N: usize>(uplink: ScriptedUplink) -> TestEngine<N> {
    engine_with(DeliveryConfig::new(ENDPOINT).unwrap(), uplink, FixedClock::new(STAMP))
}

pub fn engine_with<const N: usize>(
    config: DeliveryConfig,
    uplink: ScriptedUplink,
    clock: FixedClock,
) -> TestEngine<N> {
    DeliveryEngine::new(config, uplink, clock, RecordingDelay::default(), MemorySink::new())
}

pub fn collector<const N: usize>(
    reads: &[Read],
    uplink: ScriptedUplink,
    config: CollectorConfig,
) -> TestCollector<N> {
    Collector::new(ScriptedReader::new(reads), engine(uplink), config)
}
