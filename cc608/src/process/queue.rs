//! Timestamp-ordered staging queue for extracted caption data.
//!
//! Demuxers deliver caption payloads out of presentation order and may
//! re-deliver ranges after a seek. [`CaptionDataQueue`] orders payloads by
//! timestamp and hands them to the decoder in presentation order.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::structs::timestamp::Timestamp;

/// Thread-safe, timestamp-keyed queue of caption byte-pair payloads.
///
/// Producers (the demux side) add data as samples arrive; the consumer
/// (the render/decode side) drains everything up to the current playback
/// position. Re-delivered batches replace whatever their timestamp range
/// overlaps, so seeking backwards never double-feeds the decoder.
#[derive(Debug, Default)]
pub struct CaptionDataQueue {
    map: Mutex<BTreeMap<Timestamp, Vec<u8>>>,
}

impl CaptionDataQueue {
    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<Timestamp, Vec<u8>>> {
        // a poisoned lock only means another thread panicked mid-insert;
        // the map itself is still structurally sound
        match self.map.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Stages a batch of caption payloads, replacing any previously
    /// staged data inside the batch's own min/max timestamp range. An
    /// empty batch is a no-op.
    pub fn add_caption_data(&self, data: Vec<(Timestamp, Vec<u8>)>) {
        if data.is_empty() {
            return;
        }

        let mut start = data[0].0;
        let mut end = data[0].0;
        for (ts, _) in &data {
            start = start.min(*ts);
            end = end.max(*ts);
        }

        let mut map = self.lock();

        map.retain(|ts, _| *ts < start || *ts > end);

        for (ts, payload) in data {
            map.insert(ts, payload);
        }
    }

    /// Removes all payloads with timestamps in `[start, end]` and returns
    /// them concatenated in ascending timestamp order, ready for
    /// `ByteDecoder::parse_bytes`. Empty when the range is empty or
    /// inverted.
    pub fn get_sorted_caption_data(&self, start: Timestamp, end: Timestamp) -> Vec<u8> {
        if end < start {
            return Vec::new();
        }

        let mut map = self.lock();

        let keys: Vec<Timestamp> = map.range(start..=end).map(|(ts, _)| *ts).collect();

        let mut data = Vec::new();
        for ts in keys {
            if let Some(payload) = map.remove(&ts) {
                data.extend(payload);
            }
        }

        data
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
