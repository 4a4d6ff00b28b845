//! Search and pagination state for the launch feed.
//!
//! Pure state machines only; the orchestrator owns the I/O and the clock.

mod debounce;
mod query;

pub use debounce::Debouncer;
pub use query::{FetchOutcome, FetchTicket, QueryController};

/// Record offset of a 1-based page.
pub fn page_offset(page: u32, page_size: u32) -> u32 {
    page.saturating_sub(1).saturating_mul(page_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_law() {
        for n in 1..=50u32 {
            assert_eq!(page_offset(n, 10), (n - 1) * 10);
        }
    }

    #[test]
    fn page_zero_is_clamped() {
        assert_eq!(page_offset(0, 10), 0);
    }
}
