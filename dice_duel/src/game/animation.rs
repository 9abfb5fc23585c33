//! Timed dice roll animation.
//!
//! Starting an animation marks the selected die slots as rolling and sets
//! their faces right away; the returned [`Animation`] then resolves no
//! earlier than the sequencer's minimum duration. Callers must wait for it
//! before accepting another roll or acknowledging a turn.

use std::time::Duration;
use tokio::time::{Instant, sleep_until};

use super::entities::{DiceTray, DieSlot, Face, Roll, RollStage};

/// How long a roll visibly spins before its faces settle.
pub const DEFAULT_ROLL_DURATION: Duration = Duration::from_millis(2000);

#[derive(Clone, Debug)]
pub struct Sequencer {
    min_duration: Duration,
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new(DEFAULT_ROLL_DURATION)
    }
}

impl Sequencer {
    pub fn new(min_duration: Duration) -> Self {
        Self { min_duration }
    }

    pub fn min_duration(&self) -> Duration {
        self.min_duration
    }

    /// Pick the slots a roll stage lands in.
    ///
    /// Paired dice use the outer slots. The bonus die of a double and the
    /// single tiebreak die both use the centre slot.
    pub fn plan(roll: &Roll, stage: RollStage) -> Vec<(DieSlot, Face)> {
        if let Some(face) = roll.single_face() {
            return vec![(DieSlot::Centre, face)];
        }
        match stage {
            RollStage::First => roll
                .paired_faces()
                .map(|(left, right)| vec![(DieSlot::Left, left), (DieSlot::Right, right)])
                .unwrap_or_default(),
            RollStage::Bonus => roll
                .bonus_face()
                .map(|face| vec![(DieSlot::Centre, face)])
                .unwrap_or_default(),
        }
    }

    /// Start rolling the dice for one stage of a roll.
    pub fn play(&self, tray: &mut DiceTray, roll: &Roll, stage: RollStage) -> Animation {
        // Taken before touching the tray so the wait can't come up short.
        let deadline = Instant::now() + self.min_duration;
        let slots = Self::plan(roll, stage);
        for (slot, face) in &slots {
            let die = tray.die_mut(*slot);
            die.spin = die.spin.toggled();
            die.face = Some(*face);
            die.rolling = true;
        }
        Animation { deadline, slots }
    }
}

/// A roll in flight.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Animation {
    deadline: Instant,
    slots: Vec<(DieSlot, Face)>,
}

impl Animation {
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn slots(&self) -> &[(DieSlot, Face)] {
        &self.slots
    }

    pub fn is_finished(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// Resolves once the minimum roll duration has passed.
    pub async fn finished(&self) {
        sleep_until(self.deadline).await;
    }
}
