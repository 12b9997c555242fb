//! Interactive terminal front end.
//!
//! Model / message / update / view split: key events become [`message::Message`]s,
//! `update` applies them to [`model::App`], and `view` draws the result. Lookups
//! and folder opening run on the tokio runtime through [`backend::Backend`] and
//! report back over channels drained once per frame.

pub mod backend;
mod event;
mod input;
mod message;
pub mod model;
pub mod terminal;
mod theme;
mod update;
mod view;

use std::time::Duration;

use anyhow::Result;

use backend::Backend;
use model::App;
use terminal::Term;

const TICK: Duration = Duration::from_millis(100);

pub fn run(terminal: &mut Term, app: &mut App, backend: &mut Backend) -> Result<()> {
    loop {
        for event in backend.drain() {
            update::apply_backend_event(app, event);
        }

        terminal.draw(|frame| view::render(app, frame))?;

        if app.should_quit {
            break;
        }

        if let Some(event) = event::poll_event(TICK)? {
            let msg = event::handle_event(event, app);
            update::update(app, backend, msg);
        }
    }

    Ok(())
}
