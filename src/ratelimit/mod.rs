//! Rate limiting logic and state management.

mod backend;
mod clock;
mod entry;
mod limiter;
mod policies;
mod sweeper;

pub use backend::RateLimiterBackend;
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{RateLimitEntry, RateLimitResult};
pub use limiter::RateLimiter;
pub use policies::{PolicySet, Preset, RateLimitConfig};
pub use sweeper::{Sweeper, DEFAULT_SWEEP_INTERVAL};
