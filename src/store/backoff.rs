//! Connection backoff shared by the network-backed stores

use std::thread;

use crate::config::ReconnectStrategy;
use crate::error::{Error, Result};

/// Call `attempt` until it succeeds or `strategy` gives up
///
/// `Error::Config` is returned immediately; retrying a bad address or URL
/// cannot succeed. `target` only labels the log lines.
pub(crate) fn dial_with_backoff<T, F>(
    target: &str,
    strategy: &ReconnectStrategy,
    mut attempt: F,
) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    let mut retries = 0u32;
    loop {
        let err = match attempt() {
            Ok(conn) => return Ok(conn),
            Err(e @ Error::Config(_)) => return Err(e),
            Err(e) => e,
        };

        retries = retries.saturating_add(1);
        match strategy.delay_for(retries) {
            Some(delay) => {
                tracing::warn!(
                    "Store connection to {} failed ({}), retry {} in {:?}",
                    target,
                    err,
                    retries,
                    delay
                );
                thread::sleep(delay);
            }
            None => {
                tracing::error!(
                    "Giving up on store connection to {} after {} attempts: {}",
                    target,
                    retries,
                    err
                );
                return Err(err);
            }
        }
    }
}
