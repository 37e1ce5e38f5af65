use std::{
    sync::{Arc, Weak},
    time::Duration,
};

use chrono::{DateTime, Utc};
use tokio::{
    sync::{broadcast, Mutex, RwLock},
    task::JoinHandle,
    time::{self, Instant},
};
use tracing::{debug, error, info, warn};

use super::{
    filter::Filter,
    state::{AutoRefresh, DashboardView, PipelineState},
};
use crate::{
    preferences::PreferenceStore,
    readings::{ReadingGenerator, RoomReading},
};

const EVENT_CAPACITY: usize = 64;

/// Stand-in deadline for intervals too long to add to the current instant.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Change notifications for whoever renders the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    SnapshotChanged {
        generation: u64,
        updated_at: DateTime<Utc>,
        rooms: Arc<[RoomReading]>,
    },
    FilterChanged(Filter),
    AutoRefreshChanged(AutoRefresh),
    Stopped,
}

#[derive(Default)]
struct TimerSlot {
    handle: Option<JoinHandle<()>>,
    stopped: bool,
}

struct Inner {
    generator: ReadingGenerator,
    preferences: PreferenceStore,
    state: RwLock<PipelineState>,
    timer: Mutex<TimerSlot>,
    events: broadcast::Sender<PipelineEvent>,
}

/// Periodically regenerates room readings and derives the dashboard view.
///
/// Cheap to clone; all clones drive the same state and timer. The owner
/// must call [`RefreshPipeline::stop`] when the dashboard goes away.
#[derive(Clone)]
pub struct RefreshPipeline {
    inner: Arc<Inner>,
}

impl RefreshPipeline {
    /// Seeds the state with the generator's fixed snapshot. Auto-refresh
    /// starts paused; call [`start`](Self::start) to begin ticking.
    pub fn new(generator: ReadingGenerator, preferences: PreferenceStore) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let state = PipelineState::new(generator.snapshot());

        Self {
            inner: Arc::new(Inner {
                generator,
                preferences,
                state: RwLock::new(state),
                timer: Mutex::new(TimerSlot::default()),
                events,
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.inner.events.subscribe()
    }

    pub async fn start(&self) {
        self.resume().await;
    }

    /// Start the refresh timer. A no-op while already running or after
    /// [`stop`](Self::stop).
    pub async fn resume(&self) {
        let mut timer = self.inner.timer.lock().await;
        if timer.stopped {
            warn!("Refresh pipeline already stopped; ignoring resume");
            return;
        }
        if timer.handle.as_ref().is_some_and(|h| !h.is_finished()) {
            return;
        }

        timer.handle = Some(spawn_timer(Arc::downgrade(&self.inner), &self.inner.preferences));
        info!(
            interval_secs = self.inner.preferences.refresh_interval().as_secs(),
            "Auto-refresh running"
        );
        self.inner.set_auto_refresh(AutoRefresh::Running).await;
    }

    /// Cancel the refresh timer, keeping the current snapshot.
    pub async fn pause(&self) {
        let mut timer = self.inner.timer.lock().await;
        let Some(handle) = timer.handle.take() else {
            return;
        };
        cancel(handle).await;
        info!("Auto-refresh paused");
        self.inner.set_auto_refresh(AutoRefresh::Paused).await;
    }

    pub async fn toggle_auto_refresh(&self) -> AutoRefresh {
        let current = self.inner.state.read().await.auto_refresh;
        match current {
            AutoRefresh::Running => self.pause().await,
            AutoRefresh::Paused => self.resume().await,
        }
        self.inner.state.read().await.auto_refresh
    }

    /// Tear down the timer for good. Calling it again does nothing.
    pub async fn stop(&self) {
        let mut timer = self.inner.timer.lock().await;
        if timer.stopped {
            return;
        }
        timer.stopped = true;
        if let Some(handle) = timer.handle.take() {
            cancel(handle).await;
        }
        self.inner.set_auto_refresh(AutoRefresh::Paused).await;
        info!("Refresh pipeline stopped");
        let _ = self.inner.events.send(PipelineEvent::Stopped);
    }

    /// Regenerate immediately, whether or not auto-refresh is running.
    pub async fn refresh_now(&self) -> u64 {
        self.inner.regenerate().await
    }

    /// Apply `selected` with toggle semantics; returns the resulting filter.
    pub async fn select_filter(&self, selected: Filter) -> Filter {
        let filter = {
            let mut state = self.inner.state.write().await;
            state.filter = state.filter.toggle(selected);
            state.filter
        };
        debug!(filter = %filter, "Filter changed");
        let _ = self.inner.events.send(PipelineEvent::FilterChanged(filter));
        filter
    }

    pub async fn view(&self) -> DashboardView {
        self.inner.state.read().await.view()
    }

    /// Unfiltered rooms of the current snapshot.
    pub async fn rooms(&self) -> Vec<RoomReading> {
        self.inner.state.read().await.rooms().to_vec()
    }

    pub async fn room(&self, id: u32) -> Option<RoomReading> {
        self.inner
            .state
            .read()
            .await
            .rooms()
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    #[cfg(test)]
    pub(crate) async fn apply_snapshot(&self, rooms: Vec<RoomReading>) -> u64 {
        self.inner.apply_snapshot(rooms).await
    }
}

impl Inner {
    async fn regenerate(&self) -> u64 {
        self.apply_snapshot(self.generator.live_snapshot()).await
    }

    async fn apply_snapshot(&self, rooms: Vec<RoomReading>) -> u64 {
        let shared: Arc<[RoomReading]> = rooms.as_slice().into();
        let (generation, updated_at) = {
            let mut state = self.state.write().await;
            let generation = state.replace(rooms);
            (generation, state.last_updated())
        };

        debug!(generation, rooms = shared.len(), "Snapshot regenerated");
        let _ = self.events.send(PipelineEvent::SnapshotChanged {
            generation,
            updated_at,
            rooms: shared,
        });
        generation
    }

    async fn set_auto_refresh(&self, auto_refresh: AutoRefresh) {
        let changed = {
            let mut state = self.state.write().await;
            let changed = state.auto_refresh != auto_refresh;
            state.auto_refresh = auto_refresh;
            changed
        };
        if changed {
            let _ = self.events.send(PipelineEvent::AutoRefreshChanged(auto_refresh));
        }
    }
}

/// Abort the timer task and wait until it has actually finished, so no
/// tick can land after the caller returns.
async fn cancel(handle: JoinHandle<()>) {
    handle.abort();
    match handle.await {
        Ok(()) => {}
        Err(e) if e.is_cancelled() => {}
        Err(e) => error!(error = %e, "Refresh timer task failed"),
    }
}

fn deadline_after(period: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(period).unwrap_or(now + FAR_FUTURE)
}

/// Each cycle sleeps for the interval current at scheduling time. A saved
/// interval that differs from the running one restarts the cycle from now.
/// The task ends once the pipeline or the preference store is gone.
fn spawn_timer(pipeline: Weak<Inner>, preferences: &PreferenceStore) -> JoinHandle<()> {
    let mut prefs = preferences.subscribe();

    tokio::spawn(async move {
        let mut period = prefs.borrow_and_update().refresh_period();
        let mut deadline = deadline_after(period);

        loop {
            tokio::select! {
                _ = time::sleep_until(deadline) => {
                    let Some(inner) = pipeline.upgrade() else {
                        break;
                    };
                    inner.regenerate().await;
                    deadline = deadline_after(period);
                }
                changed = prefs.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let next = prefs.borrow_and_update().refresh_period();
                    if next != period {
                        info!(interval_secs = next.as_secs(), "Refresh interval changed; restarting cycle");
                        period = next;
                        deadline = deadline_after(period);
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        comfort::Comfort,
        preferences::{models::validate_refresh_interval, Preferences},
        readings::BaseRoom,
        storage::MemoryStore,
    };

    async fn preferences(interval: u64) -> PreferenceStore {
        let prefs = PreferenceStore::load(Arc::new(MemoryStore::new())).await;
        prefs
            .save(Preferences {
                refresh_interval: interval,
                ..Preferences::default()
            })
            .await
            .unwrap();
        prefs
    }

    async fn pipeline(interval: u64) -> RefreshPipeline {
        RefreshPipeline::new(ReadingGenerator::with_reference_rooms(), preferences(interval).await)
    }

    async fn generation(pipeline: &RefreshPipeline) -> u64 {
        pipeline.view().await.generation
    }

    #[tokio::test]
    async fn initial_view_is_the_fixed_snapshot() {
        let pipeline = pipeline(10).await;
        let view = pipeline.view().await;

        assert_eq!(view.generation, 0);
        assert_eq!(view.total, 8);
        assert_eq!(view.rooms, ReadingGenerator::with_reference_rooms().snapshot());
        assert_eq!(view.counts.comfortable, 3);
        assert_eq!(view.counts.warm, 3);
        assert_eq!(view.counts.hot, 2);
        assert_eq!(view.auto_refresh, AutoRefresh::Paused);
    }

    #[tokio::test(start_paused = true)]
    async fn running_pipeline_regenerates_every_interval() {
        let pipeline = pipeline(10).await;
        pipeline.start().await;

        time::sleep(Duration::from_millis(9_500)).await;
        assert_eq!(generation(&pipeline).await, 0);

        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(generation(&pipeline).await, 1);

        time::sleep(Duration::from_secs(20)).await;
        assert_eq!(generation(&pipeline).await, 3);

        pipeline.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn paused_pipeline_does_not_regenerate() {
        let pipeline = pipeline(10).await;
        pipeline.start().await;
        time::sleep(Duration::from_millis(10_500)).await;
        assert_eq!(generation(&pipeline).await, 1);

        pipeline.pause().await;
        let before = pipeline.view().await;
        time::sleep(Duration::from_secs(60)).await;

        let after = pipeline.view().await;
        assert_eq!(after.generation, 1);
        assert_eq!(after.rooms, before.rooms);
        assert_eq!(after.auto_refresh, AutoRefresh::Paused);

        pipeline.resume().await;
        time::sleep(Duration::from_secs(9)).await;
        assert_eq!(generation(&pipeline).await, 1);
        time::sleep(Duration::from_millis(1_500)).await;
        assert_eq!(generation(&pipeline).await, 2);

        pipeline.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn pause_and_resume_are_idempotent() {
        let pipeline = pipeline(10).await;
        let mut events = pipeline.subscribe();

        pipeline.resume().await;
        pipeline.resume().await;
        assert_eq!(
            events.recv().await.unwrap(),
            PipelineEvent::AutoRefreshChanged(AutoRefresh::Running)
        );

        pipeline.pause().await;
        pipeline.pause().await;
        assert_eq!(
            events.recv().await.unwrap(),
            PipelineEvent::AutoRefreshChanged(AutoRefresh::Paused)
        );
        assert!(events.try_recv().is_err());

        time::sleep(Duration::from_secs(30)).await;
        assert_eq!(generation(&pipeline).await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_flips_auto_refresh() {
        let pipeline = pipeline(10).await;
        assert_eq!(pipeline.toggle_auto_refresh().await, AutoRefresh::Running);
        assert_eq!(pipeline.toggle_auto_refresh().await, AutoRefresh::Paused);
        assert_eq!(pipeline.toggle_auto_refresh().await, AutoRefresh::Running);
        pipeline.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_timer_and_is_safe_to_repeat() {
        let pipeline = pipeline(10).await;
        let mut events = pipeline.subscribe();
        pipeline.start().await;

        pipeline.stop().await;
        pipeline.stop().await;
        pipeline.resume().await;

        time::sleep(Duration::from_secs(60)).await;
        assert_eq!(generation(&pipeline).await, 0);
        assert_eq!(pipeline.view().await.auto_refresh, AutoRefresh::Paused);

        assert_eq!(
            events.recv().await.unwrap(),
            PipelineEvent::AutoRefreshChanged(AutoRefresh::Running)
        );
        assert_eq!(
            events.recv().await.unwrap(),
            PipelineEvent::AutoRefreshChanged(AutoRefresh::Paused)
        );
        assert_eq!(events.recv().await.unwrap(), PipelineEvent::Stopped);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_pipeline_ends_its_timer() {
        let pipeline = pipeline(10).await;
        let weak = Arc::downgrade(&pipeline.inner);
        pipeline.start().await;
        let handle = pipeline.inner.timer.lock().await.handle.take().unwrap();
        drop(pipeline);

        assert!(weak.upgrade().is_none());
        time::timeout(Duration::from_secs(30), handle).await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn saved_interval_takes_effect_without_restart() {
        let prefs = preferences(10).await;
        let pipeline = RefreshPipeline::new(ReadingGenerator::with_reference_rooms(), prefs.clone());
        pipeline.start().await;

        time::sleep(Duration::from_secs(3)).await;
        prefs
            .save(Preferences {
                refresh_interval: 5,
                ..Preferences::default()
            })
            .await
            .unwrap();

        // Cycle restarts at t=3 with a 5s period.
        time::sleep(Duration::from_millis(4_500)).await;
        assert_eq!(generation(&pipeline).await, 0);
        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(generation(&pipeline).await, 1);
        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(generation(&pipeline).await, 2);

        pipeline.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn unrelated_preference_change_keeps_the_cycle() {
        let prefs = preferences(10).await;
        let pipeline = RefreshPipeline::new(ReadingGenerator::with_reference_rooms(), prefs.clone());
        pipeline.start().await;

        time::sleep(Duration::from_secs(6)).await;
        prefs
            .save(Preferences {
                refresh_interval: 10,
                notifications: false,
                ..Preferences::default()
            })
            .await
            .unwrap();

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(generation(&pipeline).await, 1);

        pipeline.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn oversized_interval_keeps_timer_alive_until_a_sane_one_is_saved() {
        let huge = validate_refresh_interval(i64::MAX).unwrap();
        let prefs = preferences(huge).await;
        let pipeline = RefreshPipeline::new(ReadingGenerator::with_reference_rooms(), prefs.clone());
        pipeline.start().await;

        time::sleep(Duration::from_secs(60)).await;
        assert_eq!(generation(&pipeline).await, 0);
        assert!(!pipeline.inner.timer.lock().await.handle.as_ref().unwrap().is_finished());

        prefs
            .save(Preferences {
                refresh_interval: 10,
                ..Preferences::default()
            })
            .await
            .unwrap();
        time::sleep(Duration::from_millis(10_500)).await;
        assert_eq!(generation(&pipeline).await, 1);
        assert_eq!(pipeline.view().await.auto_refresh, AutoRefresh::Running);

        pipeline.stop().await;
    }

    #[tokio::test]
    async fn deadline_saturates_instead_of_overflowing() {
        let deadline = deadline_after(Duration::MAX);
        assert!(deadline > Instant::now() + Duration::from_secs(86_400 * 365));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn no_tick_lands_after_pause_returns() {
        let pipeline = pipeline(1).await;
        pipeline.start().await;
        time::sleep(Duration::from_millis(1_200)).await;

        pipeline.pause().await;
        assert!(pipeline.inner.timer.lock().await.handle.is_none());
        let paused_at = generation(&pipeline).await;
        assert!(paused_at >= 1);

        time::sleep(Duration::from_millis(1_500)).await;
        assert_eq!(generation(&pipeline).await, paused_at);
        pipeline.stop().await;
    }

    #[tokio::test]
    async fn refresh_now_replaces_snapshot_and_notifies() {
        let pipeline = pipeline(10).await;
        let mut events = pipeline.subscribe();

        assert_eq!(pipeline.refresh_now().await, 1);

        match events.recv().await.unwrap() {
            PipelineEvent::SnapshotChanged { generation, rooms, .. } => {
                assert_eq!(generation, 1);
                assert_eq!(&rooms[..], &pipeline.rooms().await[..]);
            }
            other => panic!("unexpected event {other:?}"),
        }
        let view = pipeline.view().await;
        assert_eq!(view.counts.total(), view.total);
        assert!(view.rooms.iter().all(|r| (30..=90).contains(&r.humidity)));
    }

    #[tokio::test]
    async fn counts_always_sum_to_total() {
        let pipeline = pipeline(10).await;
        for _ in 0..100 {
            pipeline.refresh_now().await;
            let view = pipeline.view().await;
            assert_eq!(view.counts.total(), view.total);
        }
    }

    #[tokio::test]
    async fn filter_selection_toggles_and_narrows_view() {
        let pipeline = pipeline(10).await;

        assert_eq!(pipeline.select_filter(Filter::Hot).await, Filter::Hot);
        let view = pipeline.view().await;
        assert_eq!(view.filter, Filter::Hot);
        assert!(view.rooms.iter().all(|r| r.comfort == Comfort::Hot));
        let ids: Vec<u32> = view.rooms.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 6]);
        assert_eq!(view.counts.total(), 8);

        assert_eq!(pipeline.select_filter(Filter::Warm).await, Filter::Warm);
        assert_eq!(pipeline.select_filter(Filter::Warm).await, Filter::All);
        assert_eq!(pipeline.view().await.rooms.len(), 8);
    }

    #[tokio::test]
    async fn filter_survives_regeneration() {
        let pipeline = pipeline(10).await;
        pipeline.select_filter(Filter::Comfortable).await;
        pipeline.refresh_now().await;

        let view = pipeline.view().await;
        assert_eq!(view.filter, Filter::Comfortable);
        assert!(view.rooms.iter().all(|r| r.comfort == Comfort::Comfortable));
    }

    #[tokio::test]
    async fn room_lookup_by_id() {
        let generator = ReadingGenerator::new(vec![
            BaseRoom::new(10, "Lab", 23.5, 55),
            BaseRoom::new(20, "Gym", 31.8, 70),
        ])
        .unwrap();
        let pipeline = RefreshPipeline::new(generator, preferences(10).await);

        assert_eq!(pipeline.room(20).await.unwrap().comfort, Comfort::Hot);
        assert_eq!(pipeline.room(10).await.unwrap().comfort, Comfort::Comfortable);
        assert!(pipeline.room(99).await.is_none());
        assert_eq!(pipeline.rooms().await.len(), 2);
    }
}
