use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use once_cell::sync::OnceCell;
use std::num::NonZeroU32;

pub type SharedRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

static EDGAR_RATE_LIMITER: OnceCell<SharedRateLimiter> = OnceCell::new();

// SEC fair-access ceiling: 10 requests per second per caller.
const MAX_REQUESTS_PER_SECOND: u32 = 10;

/// One token bucket shared by every outbound request. The ceiling is a
/// property of the caller's network identity, not of any single filing, so
/// all fetches pass through here regardless of internal parallelism.
pub fn edgar() -> &'static SharedRateLimiter {
    EDGAR_RATE_LIMITER.get_or_init(|| {
        let quota = Quota::per_second(NonZeroU32::new(MAX_REQUESTS_PER_SECOND).expect("nonzero"));
        RateLimiter::direct(quota)
    })
}
