//! Gaze source implementations.

use gazemap_common::error::GazemapResult;
use gazemap_model::GazeSample;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

use crate::GazeSource;

/// Source that plays back a pre-loaded list of samples, one per poll.
pub struct StubSource {
    samples: Vec<GazeSample>,
    index: usize,
}

impl StubSource {
    pub fn new(samples: Vec<GazeSample>) -> Self {
        Self { samples, index: 0 }
    }
}

impl GazeSource for StubSource {
    fn poll(&mut self) -> GazemapResult<Option<GazeSample>> {
        let sample = self.samples.get(self.index).cloned();
        if sample.is_some() {
            self.index += 1;
        }
        Ok(sample)
    }

    fn name(&self) -> &str {
        "stub"
    }

    fn is_exhausted(&self) -> bool {
        self.index >= self.samples.len()
    }
}

/// Source fed through a tokio channel, e.g. from an eye-tracker callback
/// or a blocking reader thread.
pub struct ChannelSource {
    rx: mpsc::UnboundedReceiver<GazeSample>,
    disconnected: bool,
}

impl ChannelSource {
    pub fn new(rx: mpsc::UnboundedReceiver<GazeSample>) -> Self {
        Self {
            rx,
            disconnected: false,
        }
    }

    /// Create a connected sender/source pair.
    pub fn channel() -> (mpsc::UnboundedSender<GazeSample>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self::new(rx))
    }
}

impl GazeSource for ChannelSource {
    fn poll(&mut self) -> GazemapResult<Option<GazeSample>> {
        match self.rx.try_recv() {
            Ok(sample) => Ok(Some(sample)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => {
                if !self.disconnected {
                    tracing::debug!("Gaze channel closed");
                }
                self.disconnected = true;
                Ok(None)
            }
        }
    }

    fn name(&self) -> &str {
        "channel"
    }

    fn is_exhausted(&self) -> bool {
        self.disconnected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stub_source_drains_in_order() {
        let mut source = StubSource::new(vec![
            GazeSample::absolute(1.0, 1.0),
            GazeSample::absolute(2.0, 2.0),
        ]);
        assert!(!source.is_exhausted());
        assert_eq!(source.poll().unwrap(), Some(GazeSample::absolute(1.0, 1.0)));
        assert_eq!(source.poll().unwrap(), Some(GazeSample::absolute(2.0, 2.0)));
        assert_eq!(source.poll().unwrap(), None);
        assert!(source.is_exhausted());
    }

    #[test]
    fn test_channel_source_reports_disconnect() {
        let (tx, mut source) = ChannelSource::channel();
        assert_eq!(source.poll().unwrap(), None);
        assert!(!source.is_exhausted());

        tx.send(GazeSample::local(3.0, 4.0)).unwrap();
        drop(tx);

        assert_eq!(source.poll().unwrap(), Some(GazeSample::local(3.0, 4.0)));
        assert_eq!(source.poll().unwrap(), None);
        assert!(source.is_exhausted());
    }
}
