use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ladder_core::ShutdownSignal;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

/// Spawn a thread that triggers shutdown on Esc, q/Q or Ctrl+C.
///
/// The thread exits on its own once shutdown has been triggered elsewhere.
pub fn spawn_keyboard_monitor(shutdown: Arc<ShutdownSignal>) -> JoinHandle<()> {
    thread::spawn(move || {
        debug!("Keyboard monitor started");

        while !shutdown.is_shutdown() {
            match event::poll(Duration::from_millis(100)) {
                Ok(true) => {
                    if let Ok(Event::Key(key_event)) = event::read()
                        && should_shutdown(&key_event)
                    {
                        debug!("Shutdown key pressed: {:?}", key_event.code);
                        shutdown.trigger();
                        break;
                    }
                }
                Ok(false) => {}
                Err(e) => {
                    // No usable terminal (e.g. piped stdin); Ctrl+C still works
                    warn!("Keyboard monitor disabled: {}", e);
                    break;
                }
            }
        }

        debug!("Keyboard monitor stopped");
    })
}

fn should_shutdown(event: &KeyEvent) -> bool {
    if event.kind == KeyEventKind::Release {
        return false;
    }
    match event.code {
        KeyCode::Esc => true,
        KeyCode::Char('q') | KeyCode::Char('Q') => true,
        KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => true,
        _ => false,
    }
}
