// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Fixed set of axes advanced together, with the busy/idle session that spans a move.

use embedded_hal::digital::{InputPin, OutputPin};

use crate::motors::{AxisRole, StepperAxis, AXIS_COUNT};
use crate::protocol::AxisMove;
use crate::storage::{PersistentPositionStore, SlotStorage};

/// Whether a motion episode is in progress.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionSession {
    #[default]
    Idle,
    Running,
}

/// Owns one [`StepperAxis`] per [`AxisRole`]. Call [`advance`](Self::advance) every loop
/// iteration.
pub struct MotionCoordinator<O, I> {
    axes: [StepperAxis<O, I>; AXIS_COUNT],
    session: MotionSession,
}

impl<O, I> MotionCoordinator<O, I>
where
    O: OutputPin,
    I: InputPin,
{
    /// Axes are indexed by [`AxisRole::index`].
    pub fn new(axes: [StepperAxis<O, I>; AXIS_COUNT]) -> Self {
        Self {
            axes,
            session: MotionSession::Idle,
        }
    }

    #[inline]
    pub fn axis(&self, role: AxisRole) -> &StepperAxis<O, I> {
        &self.axes[role.index()]
    }

    #[inline]
    pub fn axis_mut(&mut self, role: AxisRole) -> &mut StepperAxis<O, I> {
        &mut self.axes[role.index()]
    }

    #[inline]
    pub fn session(&self) -> MotionSession {
        self.session
    }

    /// Start `request` on one axis. Busy axes ignore it.
    pub fn start_axis(&mut self, role: AxisRole, request: AxisMove, incremental: bool, now: u64) {
        self.axis_mut(role).start(
            request.amount_mm,
            request.speed_mm_per_min,
            incremental,
            now,
        );
    }

    /// Mark a motion episode as started. It ends on the first [`advance`](Self::advance) that
    /// finds every axis idle.
    pub fn begin_episode(&mut self) {
        self.session = MotionSession::Running;
    }

    pub fn all_idle(&self) -> bool {
        self.axes.iter().all(StepperAxis::is_idle)
    }

    /// Tick every axis once in role order.
    ///
    /// When a running episode finds all axes idle, the session returns to idle and every axis
    /// position is persisted. Returns `true` in that case, meaning a status report is due.
    pub fn advance<S: SlotStorage>(
        &mut self,
        now: u64,
        store: &mut PersistentPositionStore<S>,
    ) -> bool {
        for axis in self.axes.iter_mut() {
            axis.loop_tick(now);
        }

        if self.session == MotionSession::Running && self.all_idle() {
            self.session = MotionSession::Idle;
            self.persist_all(store);
            debug!("motion episode complete");
            return true;
        }
        false
    }

    /// Write every axis position to `store`.
    pub fn persist_all<S: SlotStorage>(&self, store: &mut PersistentPositionStore<S>) {
        for role in AxisRole::ALL {
            store.write(role, self.axis(role).position_steps());
        }
    }

    /// Positions in mm, indexed by role.
    pub fn positions_mm(&self) -> [f64; AXIS_COUNT] {
        AxisRole::ALL.map(|role| self.axis(role).position_mm())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{mock_axes, FakeClock, MockInput, MockOutput, RamSlots};

    type Coordinator = MotionCoordinator<MockOutput, MockInput>;

    fn run_episode(
        coord: &mut Coordinator,
        store: &mut PersistentPositionStore<RamSlots>,
        clock: &FakeClock,
        tick_us: u64,
    ) -> u32 {
        let mut completions = 0;
        for _ in 0..2_000_000u32 {
            if coord.advance(clock.micros_now(), store) {
                completions += 1;
            }
            if coord.session() == MotionSession::Idle {
                return completions;
            }
            clock.advance_us(tick_us);
        }
        panic!("episode did not finish");
    }

    #[test]
    fn episode_ends_when_last_axis_stops() {
        let clock = FakeClock::new();
        let (axes, probes) = mock_axes();
        let mut coord = MotionCoordinator::new(axes);
        let mut store = PersistentPositionStore::new(RamSlots::blank());
        store.initialize();
        store.inner().clear_counts();

        let fast = AxisMove {
            amount_mm: 0.005,
            speed_mm_per_min: 30.0,
        };
        let slow = AxisMove {
            amount_mm: 0.01,
            speed_mm_per_min: 15.0,
        };
        coord.start_axis(AxisRole::I, fast, false, 0);
        coord.start_axis(AxisRole::L, slow, false, 0);
        coord.begin_episode();

        assert_eq!(run_episode(&mut coord, &mut store, &clock, 50), 1);

        assert!(coord.all_idle());
        assert_eq!(coord.axis(AxisRole::I).position_steps(), 12);
        assert_eq!(coord.axis(AxisRole::L).position_steps(), 24);
        assert_eq!(probes[AxisRole::I.index()].pulse.falls(), 12);
        assert_eq!(probes[AxisRole::L.index()].pulse.falls(), 24);
        assert_eq!(probes[AxisRole::J.index()].pulse.falls(), 0);

        for role in AxisRole::ALL {
            assert_eq!(store.inner().puts(role.index()), 1, "{role:?}");
        }
        assert_eq!(store.read(AxisRole::L, -1), 24);
    }

    #[test]
    fn idle_session_never_persists() {
        let (axes, _probes) = mock_axes();
        let mut coord = MotionCoordinator::new(axes);
        let mut store = PersistentPositionStore::new(RamSlots::blank());

        for t in 0..100 {
            assert!(!coord.advance(t * 100, &mut store));
        }
        for role in AxisRole::ALL {
            assert_eq!(store.inner().puts(role.index()), 0);
        }
    }

    #[test]
    fn episode_without_motion_completes_on_next_advance() {
        let (axes, _probes) = mock_axes();
        let mut coord = MotionCoordinator::new(axes);
        let mut store = PersistentPositionStore::new(RamSlots::blank());

        coord.begin_episode();
        assert_eq!(coord.session(), MotionSession::Running);
        assert!(coord.advance(0, &mut store));
        assert_eq!(coord.session(), MotionSession::Idle);
        assert!(!coord.advance(1, &mut store));
    }

    #[test]
    fn ten_mm_at_ten_mm_per_min() {
        let clock = FakeClock::new();
        let (axes, probes) = mock_axes();
        let mut coord = MotionCoordinator::new(axes);
        let mut store = PersistentPositionStore::new(RamSlots::blank());
        store.initialize();
        store.inner().clear_counts();

        coord.start_axis(
            AxisRole::I,
            AxisMove {
                amount_mm: 10.0,
                speed_mm_per_min: 10.0,
            },
            false,
            0,
        );
        coord.begin_episode();
        assert_eq!(coord.axis(AxisRole::I).timing().interval_us, 2500);

        run_episode(&mut coord, &mut store, &clock, 250);

        assert_eq!(coord.axis(AxisRole::I).position_steps(), 24_000);
        assert_eq!(probes[AxisRole::I.index()].pulse.falls(), 24_000);
        assert!((coord.positions_mm()[AxisRole::I.index()] - 10.0).abs() < 1e-9);
        // At least one full period per step.
        assert!(clock.micros_now() >= 24_000 * 2_500);
        assert_eq!(store.read(AxisRole::I, 0), 24_000);
        assert_eq!(store.inner().puts(AxisRole::I.index()), 1);
    }
}
