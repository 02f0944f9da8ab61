// silence.rs — per-session chat rate limiting (spec §4.7, §8 scenario 5)
//
// No direct teacher precedent (Quake II rate-limits datagrams via
// `sv_rate_drop`'s byte-budget counter in sv_send.rs, reset once per
// frame); the same "counter refills on a clock, reject over budget" shape
// is reused here as a rolling token bucket since chat messages are
// request-driven rather than frame-driven.

use parking_lot::Mutex;

struct BucketState {
    tokens: u32,
    window_start: i64,
}

/// A token bucket capacity `capacity`, refilling fully every
/// `window_secs` seconds (spec §4.7: "minute-long token bucket with
/// capacity 400").
pub struct TokenBucket {
    capacity: u32,
    window_secs: i64,
    state: Mutex<BucketState>,
}

impl TokenBucket {
    pub fn new(capacity: u32, window_secs: i64) -> Self {
        TokenBucket {
            capacity,
            window_secs,
            state: Mutex::new(BucketState {
                tokens: capacity,
                window_start: 0,
            }),
        }
    }

    /// Returns `true` if a token was spent, `false` if the bucket is
    /// empty for the current window.
    pub fn try_spend(&self, now: i64) -> bool {
        let mut state = self.state.lock();
        if now - state.window_start >= self.window_secs {
            state.window_start = now;
            state.tokens = self.capacity;
        }
        if state.tokens == 0 {
            return false;
        }
        state.tokens -= 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refills_after_the_window_elapses() {
        let bucket = TokenBucket::new(2, 60);
        assert!(bucket.try_spend(0));
        assert!(bucket.try_spend(0));
        assert!(!bucket.try_spend(0));
        assert!(bucket.try_spend(60));
    }

    #[test]
    fn four_hundred_first_message_is_rejected() {
        let bucket = TokenBucket::new(400, 60);
        for _ in 0..400 {
            assert!(bucket.try_spend(10));
        }
        assert!(!bucket.try_spend(40));
    }
}
