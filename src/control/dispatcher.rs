// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Maps parsed commands onto the coordinator and the position store.

use embedded_hal::digital::{InputPin, OutputPin};

use crate::control::{MotionCoordinator, MotionSession};
use crate::motors::AxisRole;
use crate::protocol::Command;
use crate::storage::{PersistentPositionStore, SlotStorage};

/// What the caller should send back after a command.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Response {
    None,
    /// Emit a status report now, outside the periodic schedule.
    Report,
    /// Emit the firmware and storage identity lines.
    Info,
}

/// Handles one command at a time.
///
/// Move and origin commands are dropped while an episode is running; nothing is queued. Origin
/// changes write to storage, which may erase a flash sector and stall the loop. Power and query
/// commands are accepted at any time.
#[derive(Default)]
pub struct CommandDispatcher {
    ignored: u32,
}

impl CommandDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands dropped so far because the machine was busy.
    pub fn ignored(&self) -> u32 {
        self.ignored
    }

    fn busy(&mut self, session: MotionSession) -> bool {
        if session != MotionSession::Running {
            return false;
        }
        self.ignored = self.ignored.wrapping_add(1);
        true
    }

    pub fn dispatch<O, I, S>(
        &mut self,
        command: Command,
        coordinator: &mut MotionCoordinator<O, I>,
        store: &mut PersistentPositionStore<S>,
        now_us: u64,
    ) -> Response
    where
        O: OutputPin,
        I: InputPin,
        S: SlotStorage,
    {
        match command {
            Command::Move { incremental, axes } => {
                if self.busy(coordinator.session()) {
                    debug!("move ignored, episode in progress");
                    return Response::None;
                }
                for role in AxisRole::ALL {
                    if let Some(request) = axes[role.index()] {
                        coordinator.start_axis(role, request, incremental, now_us);
                    }
                }
                coordinator.begin_episode();
                Response::Report
            }
            Command::SetOrigin(positions) => {
                if self.busy(coordinator.session()) {
                    debug!("origin change ignored, episode in progress");
                    return Response::None;
                }
                for role in AxisRole::ALL {
                    let Some(mm) = positions[role.index()] else {
                        continue;
                    };
                    let axis = coordinator.axis_mut(role);
                    axis.set_position_mm(mm);
                    store.write(role, axis.position_steps());
                }
                Response::Report
            }
            Command::Power(enabled) => {
                for role in AxisRole::ALL {
                    coordinator.axis_mut(role).set_power(enabled);
                }
                Response::Report
            }
            Command::Info => Response::Info,
            Command::Home => {
                debug!("homing requested, not supported");
                Response::None
            }
            Command::Unknown(code) => {
                debug!("unsupported G{}", code);
                Response::None
            }
        }
    }
}
