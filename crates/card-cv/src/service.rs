//! Event-driven recognition on a single worker thread
//!
//! Each "new composite available" event is submitted to one consumer. When
//! the worker picks up work it keeps only the newest pending composite, so
//! recognition passes never overlap and stale screenshots are dropped.

use crate::detection::{MatchResult, RecognitionEngine};
use crate::traits::SlotSink;
use crate::Result;
use card_core::SlotLayout;
use log::{debug, error, info};
use opencv::core::Mat;
use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

/// One presentation sink per slot, registered once.
#[derive(Default)]
pub struct SinkRegistry {
    sinks: HashMap<SlotLayout, Box<dyn SlotSink>>,
}

impl SinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the sink for `slot`, replacing any previous one.
    pub fn register(&mut self, slot: SlotLayout, sink: impl SlotSink + 'static) -> &mut Self {
        self.sinks.insert(slot, Box::new(sink));
        self
    }

    /// Hand each result to the sink of its slot. Returns how many were delivered.
    pub fn dispatch(&mut self, results: &[MatchResult<'_>]) -> usize {
        let mut delivered = 0;
        for result in results {
            match self.sinks.get_mut(&result.slot) {
                Some(sink) => {
                    sink.show(result);
                    delivered += 1;
                }
                None => debug!("no sink registered for slot {}", result.slot),
            }
        }
        delivered
    }
}

/// Owns a recognition engine on a dedicated thread.
pub struct RecognitionService {
    sender: Option<Sender<Mat>>,
    worker: Option<JoinHandle<()>>,
}

impl RecognitionService {
    pub fn spawn(engine: RecognitionEngine, mut sinks: SinkRegistry) -> Result<Self> {
        let (sender, receiver) = mpsc::channel::<Mat>();

        let worker = thread::Builder::new()
            .name("card-recognition".to_string())
            .spawn(move || {
                while let Ok(first) = receiver.recv() {
                    let (composite, dropped) = take_latest(&receiver, first);
                    if dropped > 0 {
                        debug!("coalesced {} stale composites", dropped);
                    }

                    match engine.recognize(&composite) {
                        Ok(results) => {
                            sinks.dispatch(&results);
                        }
                        Err(e) => error!("recognition pass failed: {}", e),
                    }
                }
                info!("recognition worker stopped");
            })?;

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
        })
    }

    /// Queue a grayscale composite. Returns `false` if the worker has stopped.
    pub fn submit(&self, composite: Mat) -> bool {
        self.sender
            .as_ref()
            .map(|sender| sender.send(composite).is_ok())
            .unwrap_or(false)
    }

    /// Stop accepting work, let the worker finish, and wait for it.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("recognition worker panicked");
            }
        }
    }
}

impl Drop for RecognitionService {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Drain everything already queued behind `first`, keeping the newest.
fn take_latest<T>(receiver: &Receiver<T>, first: T) -> (T, usize) {
    let mut latest = first;
    let mut dropped = 0;
    while let Ok(newer) = receiver.try_recv() {
        latest = newer;
        dropped += 1;
    }
    (latest, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::MatchSummary;
    use crate::template::FeatureMatcher;
    use crate::testing;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_take_latest_coalesces() {
        let (sender, receiver) = mpsc::channel();
        for i in 1..=3 {
            sender.send(i).unwrap();
        }

        let first = receiver.recv().unwrap();
        assert_eq!(take_latest(&receiver, first), (3, 2));

        sender.send(7).unwrap();
        let first = receiver.recv().unwrap();
        assert_eq!(take_latest(&receiver, first), (7, 0));
    }

    #[test]
    fn test_dispatch_by_slot() -> Result<()> {
        let matcher = FeatureMatcher::default();
        let (catalog, cards) = testing::catalog(&matcher, 5)?;
        let engine = RecognitionEngine::new(catalog, matcher)?;
        let composite = testing::to_mat(&testing::composite([
            &cards[0], &cards[1], &cards[2], &cards[3], &cards[4],
        ]));
        let results = engine.recognize(&composite)?;

        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut sinks = SinkRegistry::new();
        for slot in [SlotLayout::TopRight, SlotLayout::BottomLeft] {
            let seen = Arc::clone(&seen);
            sinks.register(slot, move |result: &MatchResult<'_>| {
                seen.lock().unwrap().push((slot, result.slot, result.label()));
            });
        }

        assert_eq!(sinks.dispatch(&results), 2);
        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                (SlotLayout::TopRight, SlotLayout::TopRight, "card-2".to_string()),
                (SlotLayout::BottomLeft, SlotLayout::BottomLeft, "card-3".to_string()),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_service_delivers_pass() -> Result<()> {
        let matcher = FeatureMatcher::default();
        let (catalog, cards) = testing::catalog(&matcher, 5)?;
        let engine = RecognitionEngine::new(catalog, matcher)?;

        let seen: Arc<Mutex<Vec<MatchSummary>>> = Arc::new(Mutex::new(Vec::new()));
        let mut sinks = SinkRegistry::new();
        for slot in SlotLayout::ALL {
            let seen = Arc::clone(&seen);
            sinks.register(slot, move |result: &MatchResult<'_>| {
                seen.lock().unwrap().push(result.summary());
            });
        }

        let service = RecognitionService::spawn(engine, sinks)?;
        let composite = testing::to_mat(&testing::composite([
            &cards[4], &cards[3], &cards[2], &cards[1], &cards[0],
        ]));
        assert!(service.submit(composite));
        service.shutdown();

        let seen = seen.lock().unwrap();
        let identities: Vec<_> = seen
            .iter()
            .map(|s| s.identity.as_ref().map(|id| id.to_string()))
            .collect();
        assert_eq!(
            identities,
            ["card-4", "card-3", "card-2", "card-1", "card-0"]
                .map(|id| Some(id.to_string()))
                .to_vec()
        );
        Ok(())
    }
}
