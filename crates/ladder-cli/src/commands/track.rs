//! Main tracking command.

use std::sync::Arc;

use anyhow::{Context, Result};
use ladder_core::{
    ShutdownSignal, TrackerConfig, TrackerStatus, XpRate, start_tracking_with_shutdown,
};
use tracing::info;

use crate::input;
use crate::render;

/// Run the tracker until Ctrl+C, Esc or q
pub async fn run(character: &str, league: &str, config: TrackerConfig, color: bool) -> Result<()> {
    let shutdown = Arc::new(ShutdownSignal::new());
    let shutdown_ctrlc = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal, stopping...");
        shutdown_ctrlc.trigger();
    })?;

    let _keyboard_handle = input::spawn_keyboard_monitor(Arc::clone(&shutdown));

    let handle = start_tracking_with_shutdown(character, league, config, Arc::clone(&shutdown))
        .context("Failed to start tracker")?;
    let mut updates = handle.subscribe();
    let mut xp_rate = XpRate::new();

    println!(
        "Tracking '{}' on {}... (Press Esc or q to quit)",
        character, league
    );
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                if state.status == TrackerStatus::Found
                    && let Some(result) = &state.result
                {
                    xp_rate.observe(result.target.experience);
                }
                if let Some(text) = render::render_state(&state, character, xp_rate.latest(), color) {
                    println!("{}", text);
                }
            }
        }
    }

    handle.stop().await;
    info!("Shutdown complete");
    Ok(())
}
