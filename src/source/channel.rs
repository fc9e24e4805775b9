//! Channel-backed sample source.
//!
//! Bridges out-of-process producers (the HTTP ingest endpoint, an embedding
//! host) into the tick loop. The producer side holds a [`SampleSender`];
//! the session owns the [`ChannelSource`].

use crate::source::types::BehavioralSample;
use crate::source::{SampleSource, SourceError};
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};

/// Producer handle for a [`ChannelSource`].
pub type SampleSender = Sender<BehavioralSample>;

/// Create a bounded ingest channel and its source end.
pub fn ingest_channel(capacity: usize) -> (SampleSender, ChannelSource) {
    let (sender, receiver) = bounded(capacity);
    (sender, ChannelSource::new(receiver))
}

/// A source that drains samples pushed from elsewhere.
///
/// An empty channel yields [`SourceError::NoSample`] for that tick; a
/// dropped sender ends the supply with [`SourceError::Disconnected`].
pub struct ChannelSource {
    receiver: Receiver<BehavioralSample>,
    acquired: bool,
}

impl ChannelSource {
    pub fn new(receiver: Receiver<BehavioralSample>) -> Self {
        Self {
            receiver,
            acquired: false,
        }
    }
}

impl SampleSource for ChannelSource {
    fn acquire(&mut self) -> Result<(), SourceError> {
        self.acquired = true;
        Ok(())
    }

    fn next_sample(&mut self) -> Result<BehavioralSample, SourceError> {
        if !self.acquired {
            return Err(SourceError::Acquisition("source not acquired".to_string()));
        }
        match self.receiver.try_recv() {
            Ok(sample) => Ok(sample),
            Err(TryRecvError::Empty) => Err(SourceError::NoSample),
            Err(TryRecvError::Disconnected) => Err(SourceError::Disconnected),
        }
    }

    fn release(&mut self) {
        self.acquired = false;
    }
}
