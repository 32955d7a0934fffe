//! Default values and functions for configuration

pub(crate) const DEFAULT_DEBOUNCE_MS: u64 = 300;
pub(crate) const DEFAULT_MAX_QUEUE_SIZE: usize = 1024;

pub(crate) fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

pub(crate) fn default_max_queue_size() -> usize {
    DEFAULT_MAX_QUEUE_SIZE
}

pub(crate) fn default_max_init_retries() -> u32 {
    3
}

pub(crate) fn default_retry_delay_ms() -> u64 {
    500
}
