//! Async event loop for concurrent handling of terminal input and rendering.
//!
//! The sampler runs as an independently spawned task; this loop only handles
//! what must happen on the main task: input events, the render tick, and the
//! status line.

use std::time::Duration;

use crossterm::event::EventStream;
use futures::StreamExt;

use crate::camera::{CameraSource, SessionState};
use crate::engine::ParticleEngine;
use crate::gesture::GestureState;
use crate::input::{map_event, InputAction, PointerCell};
use crate::render::{Surface, TerminalSurface};

/// Render interval (~30 FPS).
const RENDER_INTERVAL: Duration = Duration::from_millis(33);

/// Main loop: terminal events and the render tick, via tokio::select!.
///
/// Exits on a quit key. Every other input either adjusts a shared cell
/// (pointer, override) or pokes the camera; the render arm reads those cells
/// and repaints. `release_events` reflects whether the terminal reports key
/// releases; it selects between hold and toggle override semantics.
pub async fn run(
    engine: &mut ParticleEngine,
    surface: &mut TerminalSurface,
    gesture: GestureState,
    pointer: PointerCell,
    camera: &mut CameraSource,
    release_events: bool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut event_stream = EventStream::new();

    let mut render_interval = tokio::time::interval(RENDER_INTERVAL);
    render_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    engine.resize(surface.width(), surface.height());

    loop {
        tokio::select! {
            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(event)) => {
                        match map_event(&event, release_events) {
                            InputAction::Quit => break,
                            action @ (InputAction::OverrideDown
                            | InputAction::OverrideUp
                            | InputAction::OverrideToggle) => {
                                apply_override(action, &gesture)
                            }
                            InputAction::RetryCamera => camera.retry(),
                            InputAction::PointerMoved(col, row) => {
                                // One cell is two pixels tall.
                                pointer.set(col as f32, row as f32 * 2.0);
                            }
                            InputAction::None => {}
                        }
                        if let crossterm::event::Event::Resize(cols, rows) = event {
                            surface.resize(cols, rows);
                            engine.resize(surface.width(), surface.height());
                        }
                    }
                    Some(Err(e)) => {
                        return Err(Box::new(e));
                    }
                    None => {
                        // Event stream ended - shouldn't happen normally
                        break;
                    }
                }
            }

            _ = render_interval.tick() => {
                let label = gesture.authoritative();
                engine.step(label, pointer.get());
                surface.clear();
                engine.render(surface);
                surface.set_status(status_line(
                    &camera.state(),
                    &label.to_string(),
                    engine.particle_count(),
                ));
                surface.present()?;
            }
        }
    }

    Ok(())
}

/// Apply an override action to the shared gesture cells.
fn apply_override(action: InputAction, gesture: &GestureState) {
    match action {
        InputAction::OverrideDown => gesture.set_override(true),
        InputAction::OverrideUp => gesture.set_override(false),
        InputAction::OverrideToggle => gesture.set_override(!gesture.override_held()),
        _ => {}
    }
}

fn status_line(camera: &SessionState, gesture: &str, particles: usize) -> String {
    let camera_text = match camera {
        SessionState::Uninitialized => "camera off".to_string(),
        SessionState::Acquiring => "acquiring camera...".to_string(),
        SessionState::Ready => "camera ready".to_string(),
        SessionState::Error(err) => format!("{} Press r to retry.", err.user_message()),
    };
    format!(
        " {} | gesture: {} | particles: {} | hold space: fist | q: quit",
        camera_text, gesture, particles
    )
}
