/// Re-export everything from `log` crate
pub use log::*;

use anyhow::Error;

/// Logs a fatal error followed by its cause chain, innermost cause last.
pub fn error_details(err: &Error) {
    log::error!("{err}");

    err.chain().enumerate().skip(1).for_each(|(i, cause)| {
        log::error!("  {i}: {cause}");
    });
}
