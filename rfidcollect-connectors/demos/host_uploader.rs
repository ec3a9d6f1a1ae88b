//! Host uploader: tag ids on stdin, one POST per new tag
//!
//! ```text
//! RFIDCOLLECT_ENDPOINT=http://10.14.11.141:3000/api/data \
//! RUST_LOG=rfidcollect=debug \
//!     cargo run -p rfidcollect-connectors --example host_uploader < reads.txt
//! ```
//!
//! Optional: `RFIDCOLLECT_TIMEOUT_MS`, `RFIDCOLLECT_COLLECTION_ID`.
//! Exits once stdin closes and the offline buffer is empty or the network
//! is down.

use std::io::BufRead;
use std::time::{Duration, Instant};

use rfidcollect_connectors::{ChannelTagReader, ConnectorError, HttpConfig, HttpUplink};
use rfidcollect_core::collector::{Collector, CollectorConfig, TagOutcome};
use rfidcollect_core::constants::READ_DELAY_MS;
use rfidcollect_core::delivery::{DeliveryConfig, DeliveryEngine};
use rfidcollect_core::diagnostics::LogSink;
use rfidcollect_core::time::{StdDelay, SystemClock};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const IDLE_POLL: Duration = Duration::from_millis(50);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rfidcollect=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let http = HttpConfig::from_env()?;
    let mut delivery = DeliveryConfig::new(&http.endpoint)?;
    if let Ok(id) = std::env::var("RFIDCOLLECT_COLLECTION_ID") {
        delivery = delivery.with_collection_id(&id)?;
    }

    let uplink = HttpUplink::new(http)?;
    let link = uplink.link();
    let engine: DeliveryEngine<_, _, _, _> =
        DeliveryEngine::new(delivery, uplink, SystemClock::deployment(), StdDelay, LogSink);

    let (tx, reader) = ChannelTagReader::channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    let mut collector = Collector::new(reader, engine, CollectorConfig::default());
    let started = Instant::now();
    let mut faults = 0;

    loop {
        let now_ms = started.elapsed().as_millis() as u64;
        let report = collector.poll(now_ms);

        if report.tag != TagOutcome::ReaderFault {
            faults = 0;
        }

        match report.tag {
            TagOutcome::Idle | TagOutcome::Suppressed(_) => std::thread::sleep(IDLE_POLL),
            TagOutcome::Accepted(..) | TagOutcome::Lost(..) => {
                std::thread::sleep(Duration::from_millis(u64::from(READ_DELAY_MS)));
            }
            // A malformed line faults once; a closed stdin faults on every poll
            TagOutcome::ReaderFault if faults < 3 => faults += 1,
            TagOutcome::ReaderFault => {
                if collector.engine().pending() > 0 && link.is_up() {
                    collector.engine_mut().drain_offline();
                }
                break;
            }
        }
    }

    let stats = collector.engine().stats();
    println!(
        "attempts={} delivered={} buffered={} drained={} dropped={} pending={}",
        stats.attempts,
        stats.delivered,
        stats.buffered,
        stats.drained,
        stats.dropped,
        collector.engine().pending(),
    );

    if collector.engine().pending() > 0 {
        return Err(Box::new(ConnectorError::NotConnected));
    }
    Ok(())
}
