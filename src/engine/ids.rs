use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// Last id handed out by this process, in milliseconds since the epoch.
static LAST_MINTED: AtomicI64 = AtomicI64::new(0);

/// Mint a time-derived id: the current Unix time in milliseconds, bumped
/// past the last id minted in this process and past any id `is_taken`
/// reports as already in use.
pub fn mint_id(mut is_taken: impl FnMut(&str) -> bool) -> String {
    let mut candidate = claim(Utc::now().timestamp_millis());
    loop {
        let id = candidate.to_string();
        if !is_taken(&id) {
            return id;
        }
        candidate = claim(candidate.saturating_add(1));
    }
}

/// Reserve the smallest value that is at least `at_least` and greater than
/// every value reserved before.
fn claim(at_least: i64) -> i64 {
    let next = |last: i64| last.saturating_add(1).max(at_least);
    let (Ok(prev) | Err(prev)) =
        LAST_MINTED.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(next(last)));
    next(prev)
}
