//! Per-IP rate limits.
//!
//! Token-bearing routes get the tight bucket: a link token has 256 bits of
//! entropy, but nothing inside the token service slows down guessing.

/// General routes: one request replenished every 100ms, bursts of 30
pub const GENERAL_REPLENISH_MS: u64 = 100;
pub const GENERAL_BURST_SIZE: u32 = 30;

/// Routes that check a presented link token: one every 2s, bursts of 10
pub const TOKEN_REPLENISH_MS: u64 = 2000;
pub const TOKEN_BURST_SIZE: u32 = 10;

/// Build a `tower_governor` layer keyed on the client IP
/// (`X-Forwarded-For`, `X-Real-IP`, then the peer address).
#[macro_export]
macro_rules! make_rate_limit_layer {
    ($replenish_ms:expr, $burst:expr) => {{
        let config = ::tower_governor::governor::GovernorConfigBuilder::default()
            .per_millisecond($replenish_ms)
            .burst_size($burst)
            .key_extractor(::tower_governor::key_extractor::SmartIpKeyExtractor)
            .use_headers()
            .finish()
            .expect("rate limit period and burst size must be non-zero");

        ::tower_governor::GovernorLayer::new(config)
    }};
}
