use alloc::vec::Vec;
use core::mem;
use core::time::Duration;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErosionState {
    /// No round has started eroding yet.
    Idle,
    /// Waiting for the next cycle, or paused.
    CyclePending,
    /// Selected cells are flashing and will be removed when the window closes.
    Flashing,
    /// Nothing but the path is left, the path is flashing.
    FinalWarning,
    Stopped,
}

impl ErosionState {
    pub const fn is_active(self) -> bool {
        matches!(self, Self::CyclePending | Self::Flashing | Self::FinalWarning)
    }
}

impl Default for ErosionState {
    fn default() -> Self {
        Self::Idle
    }
}

/// Snapshot of one round's erosion bookkeeping.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErosionSession {
    pub active: bool,
    pub paused: bool,
    pub phase: u32,
    pub cycle_count: u32,
    pub final_warning_active: bool,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ControlOutcome {
    NoChange,
    Changed,
}

impl ControlOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum CycleOutcome {
    /// Inactive, paused, or a previous cycle is still in flight.
    Skipped,
    /// The host has no round loaded, retry next interval.
    NotReady,
    /// The round was already solved, erosion stopped.
    Completed,
    /// This many cells started flashing.
    Flashing(usize),
    /// Only the path is left.
    FinalWarning,
}

/// Timed erosion controller for one island.
///
/// Every cycle reads the island from the host, picks coastline cells to sink, lets them flash
/// for a while and then asks the host to remove them. Once only the path is left the path
/// flashes for the final warning and then erodes as well, unless the round was completed or
/// erosion was stopped in the meantime.
///
/// The engine never touches a clock itself: it arms timers through the [`Scheduler`] and the host
/// hands them back through [`ErosionEngine::fire`].
pub struct ErosionEngine<H, S> {
    host: H,
    scheduler: S,
    config: ErosionConfig,
    rng: SmallRng,
    state: ErosionState,
    paused: bool,
    phase: u32,
    cycle_count: u32,
    final_warning_active: bool,
    path_eroded: bool,
    flashing: Vec<Cell>,
    timers: [Option<TimerToken>; TimerRole::COUNT],
    generation: u64,
}

impl<H: IslandHost, S: Scheduler> ErosionEngine<H, S> {
    /// Fails when `config` does not validate, a zero interval would keep firing forever.
    pub fn new(host: H, scheduler: S, config: ErosionConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            host,
            scheduler,
            config,
            rng: SmallRng::seed_from_u64(seed),
            state: Default::default(),
            paused: false,
            phase: 0,
            cycle_count: 0,
            final_warning_active: false,
            path_eroded: false,
            flashing: Vec::new(),
            timers: [None; TimerRole::COUNT],
            generation: 0,
        })
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn config(&self) -> &ErosionConfig {
        &self.config
    }

    pub fn state(&self) -> ErosionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn path_eroded(&self) -> bool {
        self.path_eroded
    }

    pub fn flashing_cells(&self) -> &[Cell] {
        &self.flashing
    }

    pub fn armed_timer(&self, role: TimerRole) -> Option<TimerToken> {
        self.timers[role.slot()]
    }

    pub fn session(&self) -> ErosionSession {
        ErosionSession {
            active: self.is_active(),
            paused: self.paused,
            phase: self.phase,
            cycle_count: self.cycle_count,
            final_warning_active: self.final_warning_active,
        }
    }

    pub fn into_parts(self) -> (H, S) {
        (self.host, self.scheduler)
    }

    /// Starts eroding a fresh round. Does nothing while a round is already eroding.
    pub fn start(&mut self) -> ControlOutcome {
        if self.is_active() {
            log::debug!("Erosion already running");
            return ControlOutcome::NoChange;
        }

        self.cancel_all_timers();
        self.clear_flashing();
        self.state = ErosionState::CyclePending;
        self.paused = false;
        self.phase = 0;
        self.cycle_count = 0;
        self.final_warning_active = false;
        self.path_eroded = false;
        log::debug!("Erosion started");
        self.host.emit(ErosionEvent::ErosionStarted);
        self.schedule_next_cycle();
        ControlOutcome::Changed
    }

    /// Ends erosion for the round. Pending timers are cancelled and nothing that was flashing
    /// gets removed.
    pub fn stop(&mut self) -> ControlOutcome {
        if !self.is_active() {
            return ControlOutcome::NoChange;
        }

        self.cancel_all_timers();
        self.clear_flashing();
        self.state = ErosionState::Stopped;
        self.paused = false;
        self.final_warning_active = false;
        log::debug!(
            "Erosion stopped after {} cycles in phase {}",
            self.cycle_count,
            self.phase
        );
        self.host.emit(ErosionEvent::ErosionStopped);
        ControlOutcome::Changed
    }

    /// Freezes erosion. Flashing cells are released and the interrupted countdown is forfeited.
    pub fn pause(&mut self) -> ControlOutcome {
        if !self.is_active() || self.paused {
            return ControlOutcome::NoChange;
        }

        self.paused = true;
        self.cancel_all_timers();
        self.clear_flashing();
        self.state = ErosionState::CyclePending;
        log::debug!("Erosion paused");
        self.host.emit(ErosionEvent::ErosionPaused);
        ControlOutcome::Changed
    }

    /// Resumes erosion with a full fresh cycle interval.
    pub fn unpause(&mut self) -> ControlOutcome {
        if !self.is_active() || !self.paused {
            return ControlOutcome::NoChange;
        }

        self.paused = false;
        self.final_warning_active = false;
        self.state = ErosionState::CyclePending;
        log::debug!("Erosion unpaused");
        self.host.emit(ErosionEvent::ErosionUnpaused);
        self.schedule_next_cycle();
        ControlOutcome::Changed
    }

    /// Arms the cycle timer for the current phase, replacing any armed one. Only between cycles:
    /// while cells or the path are flashing the next cycle waits for them.
    pub fn schedule_next_cycle(&mut self) {
        if self.state != ErosionState::CyclePending || self.paused {
            return;
        }

        let interval = self.config.interval_for_phase(self.phase);
        log::trace!("Next erosion cycle in {:?}", interval);
        self.arm(TimerRole::Cycle, interval);
    }

    /// Timer expiry entry point. Tokens that were cancelled or replaced, and anything arriving
    /// while inactive or paused, are dropped.
    pub fn fire(&mut self, timer: TimerToken) -> ControlOutcome {
        let slot = &mut self.timers[timer.role.slot()];
        if *slot != Some(timer) {
            log::trace!("Dropping stale timer {:?}", timer);
            return ControlOutcome::NoChange;
        }
        *slot = None;

        if !self.is_active() || self.paused {
            log::trace!("Dropping timer {:?} while inactive or paused", timer);
            return ControlOutcome::NoChange;
        }

        match timer.role {
            TimerRole::Cycle => {
                let outcome = self.perform_cycle();
                if matches!(outcome, CycleOutcome::Skipped) {
                    ControlOutcome::NoChange
                } else {
                    ControlOutcome::Changed
                }
            }
            TimerRole::Flash => self.commit_flashing(),
            TimerRole::FinalWarning => self.erode_path(),
        }
    }

    /// Runs one erosion cycle against the host's current island.
    pub fn perform_cycle(&mut self) -> CycleOutcome {
        if !self.is_active() || self.paused {
            return CycleOutcome::Skipped;
        }
        if matches!(
            self.state,
            ErosionState::Flashing | ErosionState::FinalWarning
        ) {
            log::trace!("Erosion cycle still in flight");
            return CycleOutcome::Skipped;
        }

        if self.host.is_round_completed_correctly() {
            log::debug!("Round completed, no more erosion");
            self.stop();
            return CycleOutcome::Completed;
        }

        let snapshot = IslandSnapshot::capture(&self.host, self.config.selection_offset, &[]);
        if !snapshot.is_ready() {
            log::debug!("Island not ready, skipping erosion cycle");
            self.schedule_next_cycle();
            return CycleOutcome::NotReady;
        }

        let erodable = snapshot.erodable_cells();
        if erodable.is_empty() {
            self.enter_final_warning();
            return CycleOutcome::FinalWarning;
        }

        let count = self.config.removal_count(self.phase, erodable.len());
        let selected = select_cells_to_erode(&erodable, count, &mut self.rng);
        self.cycle_count += 1;
        log::trace!(
            "Cycle {} (phase {}) flashing {} of {} erodable cells",
            self.cycle_count,
            self.phase,
            selected.len(),
            erodable.len()
        );

        self.begin_flashing(selected);
        self.arm(TimerRole::Flash, self.config.flash_duration);
        self.state = ErosionState::Flashing;
        CycleOutcome::Flashing(self.flashing.len())
    }

    fn commit_flashing(&mut self) -> ControlOutcome {
        let cells = mem::take(&mut self.flashing);
        self.host.remove_cells(&cells);
        self.host.stop_flashing();
        self.host.emit(ErosionEvent::CellsEroded { cells });

        if self.config.is_initial_phase(self.phase) {
            self.phase += 1;
        }
        self.state = ErosionState::CyclePending;
        self.schedule_next_cycle();
        ControlOutcome::Changed
    }

    fn enter_final_warning(&mut self) {
        if self.final_warning_active {
            return;
        }

        self.final_warning_active = true;
        let path = self.host.path_cells();
        log::debug!("Final warning, {} path cells flashing", path.len());
        self.begin_flashing(path);
        self.arm(TimerRole::FinalWarning, self.config.final_warning_duration);
        self.state = ErosionState::FinalWarning;
    }

    fn erode_path(&mut self) -> ControlOutcome {
        if self.host.is_round_completed_correctly() {
            log::debug!("Round completed during the final warning");
            return self.stop();
        }

        let path = mem::take(&mut self.flashing);
        self.host.remove_cells(&path);
        self.host.stop_flashing();
        self.host.emit(ErosionEvent::CellsEroded { cells: path });
        self.path_eroded = true;
        log::debug!("Path eroded, round lost");
        self.host.emit(ErosionEvent::PathEroded);
        self.stop()
    }

    fn begin_flashing(&mut self, cells: Vec<Cell>) {
        self.host.start_flashing(&cells);
        self.host.emit(ErosionEvent::CellsFlashing {
            cells: cells.clone(),
        });
        self.flashing = cells;
    }

    fn clear_flashing(&mut self) {
        if !self.flashing.is_empty() {
            self.flashing.clear();
            self.host.stop_flashing();
        }
    }

    fn arm(&mut self, role: TimerRole, delay: Duration) {
        self.cancel_timer(role);
        self.generation += 1;
        let timer = TimerToken {
            role,
            generation: self.generation,
        };
        self.timers[role.slot()] = Some(timer);
        self.scheduler.arm(timer, delay);
    }

    fn cancel_timer(&mut self, role: TimerRole) {
        if let Some(timer) = self.timers[role.slot()].take() {
            self.scheduler.cancel(timer);
        }
    }

    fn cancel_all_timers(&mut self) {
        for role in [TimerRole::Cycle, TimerRole::Flash, TimerRole::FinalWarning] {
            self.cancel_timer(role);
        }
    }
}

impl<H: IslandHost> ErosionEngine<H, ManualScheduler> {
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Moves the virtual clock forward by `by`, firing every timer that comes due on the way,
    /// including timers armed by earlier fires. Returns how many timers fired.
    pub fn advance(&mut self, by: Duration) -> usize {
        let until = self.scheduler.now().saturating_add(by);
        let mut fired = 0;
        while let Some(timer) = self.scheduler.pop_due(until) {
            self.fire(timer);
            fired += 1;
        }
        self.scheduler.advance_to(until);
        fired
    }
}
