//! Client-side generation of unique object ids.
//!
//! The backend accepts caller-chosen ids for new documents, files and
//! accounts. Ids use a snowflake layout (see
//! <https://discord.com/developers/docs/reference#snowflakes>) rendered as 16
//! lowercase hex digits, which satisfies the backend's id alphabet and sorts
//! by creation time.

use crate::model::Id;
use time::{UtcDateTime, macros::utc_datetime};

pub const STARGRAM_EPOCH: UtcDateTime = utc_datetime!(2025-01-01 00:00);

pub const TIMESTAMP_OFFSET: u64 = 22;
pub const TIMESTAMP_LENGTH: u64 = 42;
pub const WORKER_ID_OFFSET: u64 = 17;
pub const WORKER_ID_LENGTH: u64 = 5;
pub const PROCESS_ID_OFFSET: u64 = 12;
pub const PROCESS_ID_LENGTH: u64 = 5;
pub const INCREMENT_LENGTH: u64 = 12;

const fn mask(length: u64) -> u64 {
    (1 << length) - 1
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct UniqueIdGenerator {
    worker_id: u8,
    process_id: u8,
    next_increment: u16,
}

impl UniqueIdGenerator {
    /// Out of range worker and process ids are truncated to their bit length.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(worker_id: u8, process_id: u8) -> Self {
        Self {
            worker_id: (u64::from(worker_id) & mask(WORKER_ID_LENGTH)) as u8,
            process_id: (u64::from(process_id) & mask(PROCESS_ID_LENGTH)) as u8,
            next_increment: 0,
        }
    }

    /// Clients have no coordinated worker ids, so pick them at random.
    #[must_use]
    pub fn random() -> Self {
        Self::new(rand::random(), rand::random())
    }

    /// Times before [`STARGRAM_EPOCH`] clamp to the epoch.
    #[allow(clippy::cast_possible_truncation)]
    pub fn generate_raw_at(&mut self, time: UtcDateTime) -> u64 {
        let millis = (time - STARGRAM_EPOCH).whole_milliseconds();
        let timestamp = u64::try_from(millis).unwrap_or(0) & mask(TIMESTAMP_LENGTH);

        let increment = self.next_increment;
        self.next_increment = ((u64::from(increment) + 1) & mask(INCREMENT_LENGTH)) as u16;

        timestamp << TIMESTAMP_OFFSET
            | u64::from(self.worker_id) << WORKER_ID_OFFSET
            | u64::from(self.process_id) << PROCESS_ID_OFFSET
            | u64::from(increment)
    }

    pub fn generate_at<Marker>(&mut self, time: UtcDateTime) -> Id<Marker> {
        Id::new(format!("{:016x}", self.generate_raw_at(time)))
    }

    pub fn generate<Marker>(&mut self) -> Id<Marker> {
        self.generate_at(UtcDateTime::now())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        model::{Id, post::PostMarker},
        unique_id::{STARGRAM_EPOCH, UniqueIdGenerator},
    };
    use time::{Duration, macros::utc_datetime};

    #[test]
    fn layout() {
        let mut generator = UniqueIdGenerator::new(0b10101, 0b10001);
        let time = STARGRAM_EPOCH + Duration::milliseconds(1000);

        let raw = generator.generate_raw_at(time);
        assert_eq!(raw >> 22, 1000);
        assert_eq!((raw >> 17) & 0x1F, 0b10101);
        assert_eq!((raw >> 12) & 0x1F, 0b10001);
        assert_eq!(raw & 0xFFF, 0);

        assert_eq!(generator.generate_raw_at(time) & 0xFFF, 1);
    }

    #[test]
    fn ids_at_the_same_instant_differ() {
        let mut generator = UniqueIdGenerator::new(3, 7);
        let time = utc_datetime!(2025-10-24 10:55);

        let first: Id<PostMarker> = generator.generate_at(time);
        let second: Id<PostMarker> = generator.generate_at(time);

        assert_ne!(first, second);
        assert_eq!(first.get().len(), 16);
        assert!(first.get().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert!(first < second);
    }

    #[test]
    fn increment_wraps() {
        let mut generator = UniqueIdGenerator::new(0, 0);
        let time = STARGRAM_EPOCH;

        for _ in 0..0xFFF {
            generator.generate_raw_at(time);
        }
        assert_eq!(generator.generate_raw_at(time) & 0xFFF, 0xFFF);
        assert_eq!(generator.generate_raw_at(time) & 0xFFF, 0);
    }

    #[test]
    fn before_epoch_clamps() {
        let mut generator = UniqueIdGenerator::new(0, 0);
        let raw = generator.generate_raw_at(STARGRAM_EPOCH - Duration::days(1));
        assert_eq!(raw >> 22, 0);
    }

    #[test]
    fn worker_and_process_are_truncated() {
        let mut generator = UniqueIdGenerator::new(0xFF, 0xFF);
        let raw = generator.generate_raw_at(STARGRAM_EPOCH);
        assert_eq!((raw >> 17) & 0x1F, 0x1F);
        assert_eq!((raw >> 12) & 0x1F, 0x1F);
        assert_eq!(raw >> 22, 0);
    }
}
