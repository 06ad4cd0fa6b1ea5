//! Download speed limiting
//!
//! A token bucket measured in bytes: the bucket holds one second worth of
//! transfer, starts full and refills continuously.

use crate::ConfigError;
use tokio::time::{sleep, Duration, Instant};

/// Parses a rate limit such as `400k` or `2M` into bytes per second
///
/// `k`/`K` multiplies by 1024 and `m`/`M` by 1024². A plain integer is taken as
/// bytes per second and an empty string means unlimited (0). Fractions are
/// rejected.
///
/// # Examples
///
/// ```
/// use wmirror::download::parse_rate_limit;
///
/// assert_eq!(parse_rate_limit("400k").unwrap(), 400 * 1024);
/// assert_eq!(parse_rate_limit("2M").unwrap(), 2 * 1024 * 1024);
/// assert_eq!(parse_rate_limit("").unwrap(), 0);
/// assert!(parse_rate_limit("1.5M").is_err());
/// ```
pub fn parse_rate_limit(input: &str) -> Result<u64, ConfigError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(0);
    }

    let (digits, multiplier) = match input.chars().last() {
        Some('k') | Some('K') => (&input[..input.len() - 1], 1024),
        Some('m') | Some('M') => (&input[..input.len() - 1], 1024 * 1024),
        _ => (input, 1),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConfigError::InvalidRateLimit(input.to_string()));
    }

    digits
        .parse::<u64>()
        .ok()
        .and_then(|n| n.checked_mul(multiplier))
        .ok_or_else(|| ConfigError::InvalidRateLimit(input.to_string()))
}

/// Token-bucket limiter for one transfer
#[derive(Debug)]
pub struct RateLimiter {
    rate: u64,
    tokens: f64,
    last_refill: Instant,
}

impl RateLimiter {
    /// Creates a limiter for `bytes_per_sec`; 0 means unlimited
    pub fn new(bytes_per_sec: u64) -> Self {
        Self {
            rate: bytes_per_sec,
            tokens: bytes_per_sec as f64,
            last_refill: Instant::now(),
        }
    }

    pub fn rate(&self) -> u64 {
        self.rate
    }

    pub fn is_unlimited(&self) -> bool {
        self.rate == 0
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.last_refill = now;
        self.tokens = (self.tokens + elapsed * self.rate as f64).min(self.rate as f64);
    }

    /// Waits until `n` bytes may be transferred
    ///
    /// Requests larger than the bucket are granted in bucket-sized pieces.
    pub async fn acquire(&mut self, n: u64) {
        if self.is_unlimited() {
            return;
        }

        let mut remaining = n;
        while remaining > 0 {
            let want = remaining.min(self.rate);
            self.refill();

            if self.tokens >= want as f64 {
                self.tokens -= want as f64;
                remaining -= want;
                continue;
            }

            let deficit = want as f64 - self.tokens;
            sleep(Duration::from_secs_f64(deficit / self.rate as f64)).await;
        }
    }
}
