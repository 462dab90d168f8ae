use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, interval_at};
use tokio_util::sync::CancellationToken;

/// Terminal events
#[derive(Clone, Debug)]
pub enum Event {
    /// Key press event
    Key(KeyEvent),
    /// Terminal resize
    Resize(u16, u16),
    /// The periodic refresh interval elapsed
    Refresh,
    /// Error occurred
    Error(String),
}

/// Event handler managing terminal input and the refresh timer
pub struct EventHandler {
    receiver: mpsc::UnboundedReceiver<Event>,
    cancel: CancellationToken,
}

impl EventHandler {
    /// Create a new event handler
    ///
    /// With `refresh_every` set, an [`Event::Refresh`] is sent each period,
    /// starting one period from now.
    pub fn new(refresh_every: Option<Duration>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        {
            let cancel = cancel.clone();

            tokio::spawn(async move {
                let mut reader = event::EventStream::new();
                let mut refresh_interval: Option<Interval> =
                    refresh_every.map(|period| interval_at(Instant::now() + period, period));

                loop {
                    let refresh = async {
                        match refresh_interval.as_mut() {
                            Some(refresh_interval) => {
                                refresh_interval.tick().await;
                            }
                            None => std::future::pending::<()>().await,
                        }
                    };
                    let crossterm_event = reader.next().fuse();

                    tokio::select! {
                        _ = cancel.cancelled() => break,

                        _ = refresh => {
                            let _ = sender.send(Event::Refresh);
                        }

                        maybe_event = crossterm_event => {
                            match maybe_event {
                                Some(Ok(CrosstermEvent::Key(key))) => {
                                    // Filter out release events (important for Windows)
                                    if key.kind == KeyEventKind::Press {
                                        let _ = sender.send(Event::Key(key));
                                    }
                                }
                                Some(Ok(CrosstermEvent::Resize(w, h))) => {
                                    let _ = sender.send(Event::Resize(w, h));
                                }
                                Some(Ok(_)) => {}
                                Some(Err(e)) => {
                                    let _ = sender.send(Event::Error(e.to_string()));
                                }
                                None => break,
                            }
                        }
                    }
                }
            });
        }

        Self { receiver, cancel }
    }

    /// Receive the next event
    pub async fn next(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }

    /// Shutdown the event handler
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}
