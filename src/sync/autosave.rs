//! Debounced persistence of journey changes.
//!
//! Events from [`JourneyState`](crate::journey::JourneyState) are routed to one task per
//! record. Each task waits for a quiet period with no newer event, then writes the
//! latest snapshot. A task awaits its own write before it starts the next quiet
//! period, so writes to one record never overlap.
use log::{debug, info, warn};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};

use crate::config::AutosaveConfig;
use crate::journey::state::{ProgressSnapshot, StateEvent, TemplateSnapshot};
use crate::journey::types::Narratives;
use crate::metrics;
use crate::remote::{ProgressSave, RemoteError, RemoteStore};
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaveStream {
    Narratives,
    Progress,
    Templates,
}

impl SaveStream {
    pub fn name(&self) -> &'static str {
        match self {
            SaveStream::Narratives => "narratives",
            SaveStream::Progress => "progress",
            SaveStream::Templates => "templates",
        }
    }
}

pub struct AutoSave;

impl AutoSave {
    /// Start the scheduler on the current tokio runtime.
    pub fn spawn(
        store: Arc<dyn RemoteStore>,
        session: Arc<Session>,
        config: &AutosaveConfig,
        events: mpsc::UnboundedReceiver<StateEvent>,
    ) -> AutoSaveHandle {
        let (narratives_tx, narratives_rx) = mpsc::unbounded_channel::<Narratives>();
        let (progress_tx, progress_rx) = mpsc::unbounded_channel::<ProgressSnapshot>();
        let (templates_tx, templates_rx) = mpsc::unbounded_channel::<TemplateSnapshot>();

        let mut streams = Vec::with_capacity(3);

        let (s, sess) = (store.clone(), session.clone());
        streams.push(tokio::spawn(debounce_stream(
            narratives_rx,
            config.narrative_debounce(),
            SaveStream::Narratives,
            move |narratives: Narratives| {
                let (store, session) = (s.clone(), sess.clone());
                async move { store.save_narratives(&session, &narratives).await }
            },
        )));

        let (s, sess) = (store.clone(), session.clone());
        streams.push(tokio::spawn(debounce_stream(
            progress_rx,
            config.progress_debounce(),
            SaveStream::Progress,
            move |snapshot: ProgressSnapshot| {
                let (store, session) = (s.clone(), sess.clone());
                async move {
                    let save = ProgressSave::from_snapshot(&session.user_id, &snapshot);
                    store.save_user_progress(&session, &save).await
                }
            },
        )));

        let (s, sess) = (store, session.clone());
        streams.push(tokio::spawn(debounce_stream(
            templates_rx,
            config.template_debounce(),
            SaveStream::Templates,
            move |templates: TemplateSnapshot| {
                let (store, session) = (s.clone(), sess.clone());
                async move {
                    store.save_global_quests(&session, &templates.quests).await?;
                    store
                        .save_global_inventory(&session, &templates.inventory)
                        .await
                }
            },
        )));

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let router = tokio::spawn(route_events(
            events,
            shutdown_rx,
            session.is_admin(),
            narratives_tx,
            progress_tx,
            templates_tx,
        ));

        info!("auto-save started for {}", session.username);
        AutoSaveHandle {
            shutdown: Some(shutdown_tx),
            router,
            streams,
        }
    }
}

pub struct AutoSaveHandle {
    shutdown: Option<oneshot::Sender<()>>,
    router: JoinHandle<()>,
    streams: Vec<JoinHandle<()>>,
}

impl AutoSaveHandle {
    /// Write every pending snapshot now and wait for the writes to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Err(e) = self.router.await {
            warn!("auto-save router ended abnormally: {}", e);
        }
        for stream in self.streams {
            if let Err(e) = stream.await {
                warn!("auto-save stream ended abnormally: {}", e);
            }
        }
        debug!("auto-save stopped");
    }
}

async fn route_events(
    mut events: mpsc::UnboundedReceiver<StateEvent>,
    mut shutdown: oneshot::Receiver<()>,
    admin: bool,
    narratives: mpsc::UnboundedSender<Narratives>,
    progress: mpsc::UnboundedSender<ProgressSnapshot>,
    templates: mpsc::UnboundedSender<TemplateSnapshot>,
) {
    let dispatch = |event: StateEvent| {
        // a closed stream only happens after a panic in its task; nothing to do
        let _ = match event {
            StateEvent::Narratives(n) => narratives.send(n).map_err(|_| ()),
            StateEvent::Progress(p) => progress.send(p).map_err(|_| ()),
            StateEvent::Templates(t) if admin => templates.send(t).map_err(|_| ()),
            StateEvent::Templates(_) => {
                debug!("template snapshot ignored for non-admin session");
                Ok(())
            }
        };
    };

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                while let Ok(event) = events.try_recv() {
                    dispatch(event);
                }
                break;
            }
            event = events.recv() => match event {
                Some(event) => dispatch(event),
                None => break,
            },
        }
    }
    // dropping the stream senders makes each stream flush and exit
}

/// Coalesce values from `rx` and hand the latest one to `write` after `quiet` passes
/// without a newer value. Pending values are written when the channel closes.
pub async fn debounce_stream<T, F, Fut>(
    mut rx: mpsc::UnboundedReceiver<T>,
    quiet: Duration,
    stream: SaveStream,
    mut write: F,
) where
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Result<(), RemoteError>>,
{
    while let Some(first) = rx.recv().await {
        let mut latest = first;
        let timer = sleep(quiet);
        tokio::pin!(timer);

        let closed = loop {
            tokio::select! {
                next = rx.recv() => match next {
                    Some(value) => {
                        metrics::record_coalesced(stream.name());
                        latest = value;
                        timer.as_mut().reset(Instant::now() + quiet);
                    }
                    None => break true,
                },
                _ = &mut timer => break false,
            }
        };

        metrics::record_save_attempt(stream.name());
        match write(latest).await {
            Ok(()) => {
                metrics::record_save_success(stream.name());
                debug!("{} saved", stream.name());
            }
            Err(e) => {
                metrics::record_save_failure(stream.name());
                warn!("{} save failed: {}", stream.name(), e);
            }
        }

        if closed {
            break;
        }
    }
}
