use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Set a flag on Ctrl-C instead of letting the process die with keys held.
///
/// The flag is polled once per frame by the main loop. A second Ctrl-C exits
/// right away, for when the source is stuck waiting on the detector.
pub fn watch_ctrl_c() -> Result<Arc<AtomicBool>> {
    let flag = Arc::new(AtomicBool::new(false));
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build signal runtime")?;

    let thread_flag = Arc::clone(&flag);
    std::thread::Builder::new()
        .name("ctrl-c".to_string())
        .spawn(move || {
            runtime.block_on(async {
                loop {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        log::warn!("Failed to listen for Ctrl-C: {}", e);
                        return;
                    }
                    if record_interrupt(&thread_flag) {
                        log::warn!("Second interrupt received, exiting");
                        std::process::exit(EXIT_INTERRUPTED);
                    }
                    log::info!("Interrupt received, stopping (Ctrl-C again to force)");
                }
            });
        })
        .context("Failed to start signal thread")?;

    Ok(flag)
}

const EXIT_INTERRUPTED: i32 = 130;

/// Raise the stop flag; returns `true` if it was already raised
fn record_interrupt(flag: &AtomicBool) -> bool {
    flag.swap(true, Ordering::SeqCst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_interrupt_forces_exit() {
        let flag = AtomicBool::new(false);
        assert!(!record_interrupt(&flag));
        assert!(flag.load(Ordering::SeqCst));
        assert!(record_interrupt(&flag));
    }
}
