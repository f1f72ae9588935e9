//! Periodic single-threaded tick loop.
//!
//! Every tick runs the app's schedules to completion and the next tick starts after a fixed
//! delay, so the period is the delay plus the duration of the tick. Simulation systems only run
//! while the configuration is loaded. A failed configuration is reported on every tick, which
//! then requests the loop to stop.

use std::{sync::Arc, thread, time::Duration};

use bevy::{
    app::{AppExit, PluginsState},
    ecs::{
        event::{Events, ManualEventReader},
        schedule::ExecutorKind,
    },
    prelude::*,
};

/// Blocks the tick loop between two ticks.
pub trait Sleep: Send + Sync {
    fn sleep(&self, duration: Duration);
}

pub struct ThreadSleep;

impl Sleep for ThreadSleep {
    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

#[derive(Resource, Clone, Debug, Eq, PartialEq)]
pub enum Configuration {
    Loaded,
    Failed(String),
}

/// Number of completed ticks.
#[derive(Resource, Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TickCount(pub u64);

pub struct Scheduler {
    delay: Duration,
    tick_limit: Option<u64>,
    sleep: Arc<dyn Sleep>,
}

impl Scheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            tick_limit: None,
            sleep: Arc::new(ThreadSleep),
        }
    }

    pub fn with_tick_limit(self, tick_limit: Option<u64>) -> Self {
        Self { tick_limit, ..self }
    }

    pub fn with_sleep(self, sleep: impl Sleep + 'static) -> Self {
        Self {
            sleep: Arc::new(sleep),
            ..self
        }
    }
}

impl Plugin for Scheduler {
    fn build(&self, app: &mut App) {
        let delay = self.delay;
        let tick_limit = self.tick_limit;
        let sleep = self.sleep.clone();

        app.init_resource::<TickCount>()
            .edit_schedule(Update, |schedule| {
                schedule.set_executor_kind(ExecutorKind::SingleThreaded);
            })
            .add_systems(First, check_configuration)
            .add_systems(Last, count_tick)
            .set_runner(move |app| run(app, delay, tick_limit, sleep.as_ref()));
    }
}

/// Run condition for systems that need a loaded configuration.
pub fn configuration_loaded(configuration: Option<Res<Configuration>>) -> bool {
    matches!(configuration.as_deref(), Some(Configuration::Loaded))
}

fn check_configuration(
    configuration: Option<Res<Configuration>>,
    mut exit: EventWriter<AppExit>,
) {
    match configuration.as_deref() {
        Some(Configuration::Loaded) => {}
        Some(Configuration::Failed(reason)) => {
            error!("configuration not loaded: {reason}");
            exit.send(AppExit);
        }
        None => {
            error!("configuration missing");
            exit.send(AppExit);
        }
    }
}

fn count_tick(mut ticks: ResMut<TickCount>) {
    ticks.0 += 1;
}

fn run(mut app: App, delay: Duration, tick_limit: Option<u64>, sleep: &dyn Sleep) {
    if app.plugins_state() != PluginsState::Cleaned {
        app.finish();
        app.cleanup();
    }

    let mut exit_reader = ManualEventReader::<AppExit>::default();
    let mut ticks = 0;
    loop {
        app.update();
        ticks += 1;

        if let Some(exits) = app.world.get_resource::<Events<AppExit>>() {
            if exit_reader.read(exits).last().is_some() {
                info!("stopped after {ticks} ticks");
                return;
            }
        }
        if tick_limit.is_some_and(|limit| ticks >= limit) {
            info!("tick limit of {ticks} reached");
            return;
        }

        sleep.sleep(delay);
    }
}
