//! Per-consumer cursors into a [`Channel`].
//!
//! A [`ChannelReader`] never owns the channel it reads. It remembers how far
//! into the producer's logical index space it has looked and how many of
//! those samples are still unconsumed ("new"). Every tick the consumer
//! calls [`ChannelReader::update`] with the channel it is connected to; the
//! reader diffs the channel's total sample counter against its own and
//! reports structural changes:
//!
//! - **reset**: the channel was cleared or its counter went backwards
//! - **sample rate**: the producer changed its rate
//! - **connection**: the consumer re-pointed the reader at another channel
//!
//! On any change the reader resynchronizes to the producer's current batch.

use crate::channel::Channel;

/// Structural changes seen by the latest [`ChannelReader::update`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputChanges {
    /// Channel cleared or counter moved backwards.
    pub reset: bool,
    /// Sample rate differs from the last update.
    pub sample_rate: bool,
    /// Reader was attached to a different channel.
    pub connection: bool,
}

impl InputChanges {
    /// Whether anything changed.
    pub fn any(self) -> bool {
        self.reset || self.sample_rate || self.connection
    }
}

/// Read cursor with change detection.
#[derive(Debug, Clone, Default)]
pub struct ChannelReader {
    started: bool,
    seen_counter: u64,
    num_new_samples: usize,
    generation: u32,
    sample_rate: f64,
    num_received: u64,
    num_processed: u64,
    connection_changed: bool,
    changes: InputChanges,
}

impl ChannelReader {
    /// Creates a reader that will start at the next update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets all counters and flags.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Flags that the reader now observes a different channel.
    pub fn set_connection_changed(&mut self) {
        self.connection_changed = true;
    }

    /// Starts reading at the producer's current batch.
    ///
    /// Samples the producer added during this tick count as new; everything
    /// older is skipped.
    pub fn start<T>(&mut self, channel: &Channel<T>) {
        self.started = true;
        self.sync(channel);
        self.num_received = 0;
        self.num_processed = 0;
    }

    fn sync<T>(&mut self, channel: &Channel<T>) {
        self.num_new_samples = channel.num_new_samples().min(channel.num_samples());
        self.seen_counter = channel.sample_counter();
        self.generation = channel.generation();
        self.sample_rate = channel.sample_rate();
    }

    /// Pulls the producer's progress into the cursor.
    pub fn update<T>(&mut self, channel: &Channel<T>) -> InputChanges {
        self.changes = InputChanges::default();

        if !self.started {
            self.start(channel);
            self.num_received = self.num_new_samples as u64;
            self.connection_changed = false;
            return self.changes;
        }

        self.changes.connection = core::mem::take(&mut self.connection_changed);
        self.changes.sample_rate = self.sample_rate != channel.sample_rate();
        self.changes.reset = self.generation != channel.generation()
            || channel.sample_counter() < self.seen_counter;

        if self.changes.any() {
            #[cfg(feature = "tracing")]
            tracing::trace!(
                "reader_resync: reset={} sample_rate={} connection={}",
                self.changes.reset,
                self.changes.sample_rate,
                self.changes.connection
            );
            self.sync(channel);
            self.num_received += self.num_new_samples as u64;
            return self.changes;
        }

        let added = channel.sample_counter() - self.seen_counter;
        self.seen_counter = channel.sample_counter();
        self.num_received += added;
        self.num_new_samples = (self.num_new_samples + added as usize).min(channel.num_samples());
        self.changes
    }

    /// Changes reported by the latest update.
    pub fn changes(&self) -> InputChanges {
        self.changes
    }

    /// Whether [`start`](Self::start) or an update has run.
    pub fn has_started(&self) -> bool {
        self.started
    }

    /// Unconsumed samples.
    pub fn num_new_samples(&self) -> usize {
        self.num_new_samples
    }

    /// Samples seen since the reader started.
    pub fn num_samples_received(&self) -> u64 {
        self.num_received
    }

    /// Samples consumed since the reader started.
    pub fn num_samples_processed(&self) -> u64 {
        self.num_processed
    }

    /// Logical channel index of the `index`-th new sample (0 is the oldest).
    pub fn sample_index(&self, index: usize) -> Option<u64> {
        if index >= self.num_new_samples {
            return None;
        }
        Some(self.seen_counter - self.num_new_samples as u64 + index as u64)
    }

    /// The `index`-th new sample, oldest first.
    pub fn get_sample<'a, T>(&self, channel: &'a Channel<T>, index: usize) -> Option<&'a T> {
        self.sample_index(index).and_then(|i| channel.sample(i))
    }

    /// Oldest new sample without consuming it.
    pub fn oldest<'a, T>(&self, channel: &'a Channel<T>) -> Option<&'a T> {
        self.get_sample(channel, 0)
    }

    /// Newest new sample without consuming it.
    pub fn newest<'a, T>(&self, channel: &'a Channel<T>) -> Option<&'a T> {
        self.num_new_samples
            .checked_sub(1)
            .and_then(|i| self.get_sample(channel, i))
    }

    /// Consumes and returns the oldest new sample.
    pub fn pop_oldest<'a, T>(&mut self, channel: &'a Channel<T>) -> Option<&'a T> {
        let sample = self.oldest(channel)?;
        self.advance(1);
        Some(sample)
    }

    /// Marks up to `count` of the oldest new samples as consumed.
    pub fn advance(&mut self, count: usize) {
        let count = count.min(self.num_new_samples);
        self.num_new_samples -= count;
        self.num_processed += count as u64;
    }

    /// Consumes every new sample.
    pub fn flush(&mut self) {
        self.advance(self.num_new_samples);
    }
}
