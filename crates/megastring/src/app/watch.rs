//! Watching the path-list file and re-triggering builds.
//!
//! The notify backend runs on its own thread and pushes raw events into a
//! channel. [`drive`] drains that channel on the caller's thread, so only one
//! build ever runs at a time and the debounce state needs no locking.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, select, unbounded};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::domain::errors::WatchError;

/// Whether a trigger fired within the debounce window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebouncePhase {
    Idle,
    Cooldown,
}

/// Leading-edge debounce: the first event fires, later ones are dropped until the
/// window has fully elapsed since the last trigger.
#[derive(Debug, Clone)]
pub struct Debounce {
    window: Duration,
    last_trigger: Option<Instant>,
}

impl Debounce {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_trigger: None,
        }
    }

    pub fn phase(&self, now: Instant) -> DebouncePhase {
        match self.last_trigger {
            Some(last) if now.saturating_duration_since(last) <= self.window => {
                DebouncePhase::Cooldown
            }
            _ => DebouncePhase::Idle,
        }
    }

    /// Record a trigger at `now` unless one fired within the window.
    pub fn try_fire(&mut self, now: Instant) -> bool {
        if self.phase(now) == DebouncePhase::Cooldown {
            return false;
        }
        self.last_trigger = Some(now);
        true
    }
}

/// Decides which raw filesystem events should start a build.
#[derive(Debug, Clone)]
pub struct TriggerFilter {
    targets: Vec<PathBuf>,
    debounce: Debounce,
}

impl TriggerFilter {
    /// Match events on `target`, by its absolute path and, when it differs, its canonical path.
    pub fn new(target: &Path, window: Duration) -> Self {
        let absolute = std::path::absolute(target).unwrap_or_else(|_| target.to_path_buf());
        let mut targets = vec![absolute];
        if let Ok(canonical) = target.canonicalize()
            && !targets.contains(&canonical)
        {
            targets.push(canonical);
        }
        Self {
            targets,
            debounce: Debounce::new(window),
        }
    }

    pub fn target(&self) -> &Path {
        &self.targets[0]
    }

    pub fn debounce(&self) -> &Debounce {
        &self.debounce
    }

    /// Create and modify events (including rename-into-place) on the target file.
    pub fn matches(&self, event: &Event) -> bool {
        matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
            && event.paths.iter().any(|path| self.targets.contains(path))
    }

    pub fn should_trigger(&mut self, event: &Event, now: Instant) -> bool {
        if !self.matches(event) {
            return false;
        }
        let fire = self.debounce.try_fire(now);
        if !fire {
            tracing::debug!(path = %self.target().display(), "change within debounce window ignored");
        }
        fire
    }
}

/// Drain `events` until `shutdown` fires, invoking `on_trigger` synchronously for
/// every event that passes `filter`.
///
/// Returns `Ok` on shutdown and [`WatchError::ChannelClosed`] if the event source
/// disconnects first.
pub fn drive<F>(
    events: &Receiver<notify::Result<Event>>,
    shutdown: &Receiver<()>,
    filter: &mut TriggerFilter,
    mut on_trigger: F,
) -> Result<(), WatchError>
where
    F: FnMut(),
{
    loop {
        select! {
            recv(events) -> msg => match msg {
                Ok(Ok(event)) => {
                    if filter.should_trigger(&event, Instant::now()) {
                        on_trigger();
                    }
                }
                Ok(Err(err)) => tracing::warn!(error = %err, "file watch error"),
                Err(_) => return Err(WatchError::ChannelClosed),
            },
            recv(shutdown) -> _ => return Ok(()),
        }
    }
}

/// Non-recursive watch on the directory holding the path-list file.
pub struct ChangeWatcher {
    watcher: RecommendedWatcher,
    events: Receiver<notify::Result<Event>>,
    dir: PathBuf,
    filter: TriggerFilter,
}

impl ChangeWatcher {
    pub fn new(target: &Path, window: Duration) -> Result<Self, WatchError> {
        let filter = TriggerFilter::new(target, window);
        let dir = filter
            .target()
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let (tx, events) = unbounded();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = tx.send(res);
        })?;
        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|source| WatchError::WatchPath {
                path: dir.clone(),
                source,
            })?;

        Ok(Self {
            watcher,
            events,
            dir,
            filter,
        })
    }

    pub fn watched_dir(&self) -> &Path {
        &self.dir
    }

    pub fn target(&self) -> &Path {
        self.filter.target()
    }

    /// Block until `shutdown` fires, then tear down the subscription.
    pub fn run<F>(mut self, shutdown: &Receiver<()>, on_trigger: F) -> Result<(), WatchError>
    where
        F: FnMut(),
    {
        let result = drive(&self.events, shutdown, &mut self.filter, on_trigger);
        if let Err(err) = self.watcher.unwatch(&self.dir) {
            tracing::debug!(dir = %self.dir.display(), error = %err, "unwatch failed");
        }
        result
    }
}
