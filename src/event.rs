//! Terminal input and the UI tick, normalised into [`Action`]s on the same
//! channel background tasks report on.

use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyEventKind};
use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::interval;
use tracing::warn;

use crate::action::Action;

/// Drives flash expiry and redraws after resizes
pub const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Spawn the task that reads crossterm events until the receiver goes away
pub fn spawn_event_task(tx: UnboundedSender<Action>) {
    tokio::spawn(async move {
        let mut ticker = interval(TICK_INTERVAL);
        let mut reader = EventStream::new();

        loop {
            let tick = ticker.tick();
            let crossterm_event = reader.next().fuse();

            let action = tokio::select! {
                _ = tick => Some(Action::Tick),
                maybe_event = crossterm_event => match maybe_event {
                    // Windows reports both press and release.
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        Some(Action::Input { code: key.code, modifiers: key.modifiers })
                    }
                    Some(Ok(Event::Paste(text))) => Some(Action::Paste(text)),
                    Some(Ok(Event::Resize(_, _))) => Some(Action::Tick),
                    Some(Ok(_)) => None,
                    Some(Err(err)) => {
                        warn!(error = %err, "terminal event error");
                        None
                    }
                    None => return,
                },
            };

            if let Some(action) = action
                && tx.send(action).is_err()
            {
                return;
            }
        }
    });
}
