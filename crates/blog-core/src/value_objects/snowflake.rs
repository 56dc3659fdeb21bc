//! Snowflake identifiers.
//!
//! Every entity in the system is keyed by a 64-bit snowflake. Reading the
//! bits from the top: 42 bits of milliseconds since the service epoch,
//! 10 bits of worker ID, 12 bits of per-millisecond sequence. Sorting by
//! ID therefore sorts by creation time.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

const TIMESTAMP_SHIFT: u8 = 22;
const WORKER_SHIFT: u8 = 12;
const SEQUENCE_MASK: i64 = (1 << WORKER_SHIFT) - 1;
const MAX_WORKER_ID: u16 = 1 << 10;

/// 64-bit entity identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Snowflake(i64);

impl Snowflake {
    /// Service epoch: 2024-01-01 00:00:00 UTC, in milliseconds
    pub const EPOCH: i64 = 1704067200000;

    #[inline]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn into_inner(self) -> i64 {
        self.0
    }

    /// An all-zero snowflake marks a not-yet-assigned ID
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Milliseconds since the Unix epoch encoded in this ID
    #[inline]
    pub fn timestamp(&self) -> i64 {
        (self.0 >> TIMESTAMP_SHIFT) + Self::EPOCH
    }

    /// The creation instant encoded in this ID
    pub fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        use chrono::{TimeZone, Utc};
        Utc.timestamp_millis_opt(self.timestamp())
            .single()
            .unwrap_or_default()
    }

    pub fn parse(s: &str) -> Result<Self, SnowflakeParseError> {
        s.parse()
    }
}

/// The string was not a decimal 64-bit integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SnowflakeParseError {
    #[error("not a valid snowflake")]
    InvalidFormat,
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<i64> for Snowflake {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<Snowflake> for i64 {
    fn from(id: Snowflake) -> Self {
        id.0
    }
}

impl std::str::FromStr for Snowflake {
    type Err = SnowflakeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>()
            .map(Snowflake)
            .map_err(|_| SnowflakeParseError::InvalidFormat)
    }
}

// JSON carries snowflakes as strings; i64 overflows JavaScript's
// Number.MAX_SAFE_INTEGER
impl Serialize for Snowflake {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&self.0)
    }
}

// Accept either form on the way in
impl<'de> Deserialize<'de> for Snowflake {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Snowflake(n)),
            Raw::Text(s) => s
                .parse()
                .map_err(|_| serde::de::Error::custom("invalid snowflake string")),
        }
    }
}

/// Lock-free snowflake generator.
///
/// The whole generator state fits one atomic: relative timestamp in the
/// high bits, sequence in the low 12. A CAS claims a (timestamp, sequence)
/// slot, so every successful call yields a distinct, strictly increasing ID.
pub struct SnowflakeGenerator {
    worker_bits: i64,
    state: AtomicI64,
}

impl SnowflakeGenerator {
    /// Create a generator for the given worker.
    ///
    /// # Panics
    /// Panics if `worker_id` does not fit the 10-bit field.
    pub fn new(worker_id: u16) -> Self {
        assert!(worker_id < MAX_WORKER_ID, "Worker ID must be < 1024");
        Self {
            worker_bits: i64::from(worker_id) << WORKER_SHIFT,
            state: AtomicI64::new(0),
        }
    }

    /// Generate the next unique ID
    pub fn generate(&self) -> Snowflake {
        loop {
            let now = relative_millis();
            let seen = self.state.load(Ordering::Acquire);
            let last = seen >> WORKER_SHIFT;

            let claim = if now > last {
                now << WORKER_SHIFT
            } else if (seen & SEQUENCE_MASK) < SEQUENCE_MASK {
                // Same millisecond (or clock went backwards); bump sequence
                seen + 1
            } else {
                // 4096 IDs issued this millisecond, wait out the clock
                while relative_millis() <= last {
                    std::hint::spin_loop();
                }
                continue;
            };

            if self
                .state
                .compare_exchange_weak(seen, claim, Ordering::AcqRel, Ordering::Relaxed)
                .is_ok()
            {
                let timestamp = claim >> WORKER_SHIFT;
                let sequence = claim & SEQUENCE_MASK;
                return Snowflake::new(
                    (timestamp << TIMESTAMP_SHIFT) | self.worker_bits | sequence,
                );
            }
        }
    }
}

impl Default for SnowflakeGenerator {
    fn default() -> Self {
        Self::new(0)
    }
}

#[inline]
fn relative_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
        - Snowflake::EPOCH
}
