//! Per-user limits for the accept/unaccept endpoints, backed by keyed `governor` limiters.
//!
//! Each user carries two GCRA cells: an hourly quota and a short burst quota. Quotas are
//! fixed when the limiter is built; the enable and bypass switches are read per call.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::clock::{Clock, DefaultClock};
use governor::middleware::NoOpMiddleware;
use governor::state::keyed::DashMapStateStore;
use governor::{NotUntil, Quota};

use crate::config::RateLimitConfig;
use crate::domain::TrustLevel;
use crate::models::user::User;

const HOUR: Duration = Duration::from_secs(60 * 60);

type KeyedLimiter<C> =
    governor::RateLimiter<i32, DashMapStateStore<i32>, C, NoOpMiddleware<<C as Clock>::Instant>>;

pub struct RateLimiter<C: Clock = DefaultClock> {
    clock: C,
    hourly: KeyedLimiter<C>,
    burst: KeyedLimiter<C>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(config: &RateLimitConfig) -> Self {
        Self::with_clock(config, DefaultClock::default())
    }
}

impl<C: Clock> RateLimiter<C> {
    #[must_use]
    pub fn with_clock(config: &RateLimitConfig, clock: C) -> Self {
        let hourly = governor::RateLimiter::dashmap_with_clock(
            quota(HOUR, config.hourly_limit),
            &clock,
        );
        let burst = governor::RateLimiter::dashmap_with_clock(
            quota(
                Duration::from_secs(config.burst_window_seconds),
                config.burst_limit,
            ),
            &clock,
        );

        Self {
            clock,
            hourly,
            burst,
        }
    }

    /// Records one action for `user`, or returns the seconds until the next one is allowed.
    /// Staff never count against the limits.
    pub fn check(&self, config: &RateLimitConfig, user: &User) -> Result<(), u64> {
        if !config.enabled || user.is_staff() {
            return Ok(());
        }

        if config.bypass_enabled
            && user.trust_level >= TrustLevel::new(config.bypass_min_trust_level)
        {
            return Ok(());
        }

        self.burst
            .check_key(&user.id)
            .map_err(|not_until| self.retry_after(&not_until))?;
        self.hourly
            .check_key(&user.id)
            .map_err(|not_until| self.retry_after(&not_until))
    }

    /// Forgets users whose cells have fully replenished.
    pub fn prune(&self) {
        self.burst.retain_recent();
        self.hourly.retain_recent();
        self.burst.shrink_to_fit();
        self.hourly.shrink_to_fit();
    }

    /// Number of users currently holding state in either quota.
    #[must_use]
    pub fn tracked_users(&self) -> usize {
        self.burst.len().max(self.hourly.len())
    }

    /// Whole seconds until the denied cell allows another action, at least one.
    fn retry_after(&self, not_until: &NotUntil<C::Instant>) -> u64 {
        let wait = not_until.wait_time_from(self.clock.now());
        (wait.as_secs() + u64::from(wait.subsec_nanos() > 0)).max(1)
    }
}

/// `limit` actions per `window`, all of which may be spent at once.
fn quota(window: Duration, limit: u32) -> Quota {
    let limit = NonZeroU32::new(limit).unwrap_or(NonZeroU32::MIN);
    Quota::with_period(window / limit.get())
        .unwrap_or_else(|| Quota::per_second(limit))
        .allow_burst(limit)
}
