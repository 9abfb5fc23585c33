use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

use crate::view::Scoreboard;

/// Usernames are capped at the same length the game server accepts.
pub const MAX_USERNAME_LENGTH: usize = 150;

/// Type alias for a single die face.
pub type Face = u8;

pub const MIN_FACE: Face = 1;
pub const MAX_FACE: Face = 6;

/// Number of die slots on the table: left, centre (bonus/tiebreak), right.
pub const NUM_DIE_SLOTS: usize = 3;

#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Username(String);

impl Username {
    pub fn new(s: &str) -> Self {
        let username: String = s
            .trim()
            .chars()
            .map(|c| if c.is_ascii_whitespace() { '_' } else { c })
            .take(MAX_USERNAME_LENGTH)
            .collect();
        Self(username)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for Username {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(&s))
    }
}

impl From<String> for Username {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<&str> for Username {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Reasons a set of faces can't form a roll.
#[derive(Debug, Eq, Error, PartialEq)]
pub enum RollError {
    #[error("roll has no faces")]
    Empty,
    #[error("face {0} is not between 1 and 6")]
    FaceOutOfRange(Face),
    #[error("tiebreak roll needs exactly 1 face, got {0}")]
    TiebreakFaceCount(usize),
    #[error("tiebreak roll can't be a double")]
    DoubleTiebreak,
    #[error("double needs exactly 3 faces, got {0}")]
    DoubleFaceCount(usize),
    #[error("regular roll needs exactly 2 faces, got {0}")]
    PairFaceCount(usize),
}

/// Die faces the server already decided for one turn.
///
/// The first two faces are the paired dice. A double carries a third,
/// bonus face. A tiebreak roll carries a single face.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Roll {
    faces: Vec<Face>,
    double: bool,
    tiebreaker: bool,
}

impl Roll {
    /// Validate and build a roll.
    ///
    /// # Errors
    ///
    /// Returns a [`RollError`] if the face count doesn't match the roll's
    /// kind or any face is outside `1..=6`.
    pub fn new(faces: Vec<Face>, double: bool, tiebreaker: bool) -> Result<Self, RollError> {
        if faces.is_empty() {
            return Err(RollError::Empty);
        }
        if let Some(face) = faces.iter().find(|f| !(MIN_FACE..=MAX_FACE).contains(*f)) {
            return Err(RollError::FaceOutOfRange(*face));
        }
        match (tiebreaker, double, faces.len()) {
            (true, true, _) => return Err(RollError::DoubleTiebreak),
            (true, false, 1) | (false, true, 3) | (false, false, 2) => {}
            (true, false, n) => return Err(RollError::TiebreakFaceCount(n)),
            (false, true, n) => return Err(RollError::DoubleFaceCount(n)),
            (false, false, n) => return Err(RollError::PairFaceCount(n)),
        }
        Ok(Self {
            faces,
            double,
            tiebreaker,
        })
    }

    pub fn pair(a: Face, b: Face) -> Result<Self, RollError> {
        Self::new(vec![a, b], false, false)
    }

    pub fn double(a: Face, b: Face, bonus: Face) -> Result<Self, RollError> {
        Self::new(vec![a, b, bonus], true, false)
    }

    pub fn tiebreak(face: Face) -> Result<Self, RollError> {
        Self::new(vec![face], false, true)
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn is_double(&self) -> bool {
        self.double
    }

    pub fn is_tiebreaker(&self) -> bool {
        self.tiebreaker
    }

    /// The two simultaneous dice, absent for tiebreak rolls.
    pub fn paired_faces(&self) -> Option<(Face, Face)> {
        match self.faces.as_slice() {
            [a, b, ..] => Some((*a, *b)),
            _ => None,
        }
    }

    /// The extra die granted by a double.
    pub fn bonus_face(&self) -> Option<Face> {
        self.double.then(|| self.faces.get(2).copied()).flatten()
    }

    /// The sudden-death die of a tiebreak roll.
    pub fn single_face(&self) -> Option<Face> {
        self.tiebreaker.then(|| self.faces.first().copied()).flatten()
    }
}

impl fmt::Display for Roll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let faces = self
            .faces
            .iter()
            .map(Face::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        write!(f, "[{faces}]")?;
        if self.double {
            write!(f, " double")?;
        }
        if self.tiebreaker {
            write!(f, " tiebreak")?;
        }
        Ok(())
    }
}

/// Which part of a turn is being rolled.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RollStage {
    /// The paired dice, or the single die of a tiebreak.
    First,
    /// The bonus die after a double.
    Bonus,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DieSlot {
    Left,
    Centre,
    Right,
}

impl DieSlot {
    pub const ALL: [DieSlot; NUM_DIE_SLOTS] = [DieSlot::Left, DieSlot::Centre, DieSlot::Right];

    fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Centre => 1,
            Self::Right => 2,
        }
    }
}

/// Alternating visual state used to restart a roll animation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Spin {
    #[default]
    Odd,
    Even,
}

impl Spin {
    pub fn toggled(self) -> Self {
        match self {
            Self::Odd => Self::Even,
            Self::Even => Self::Odd,
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Die {
    pub visible: bool,
    pub spin: Spin,
    pub face: Option<Face>,
    /// Set while the roll animation runs, cleared once the face is revealed.
    pub rolling: bool,
}

/// The three die slots shown on the table.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DiceTray {
    dice: [Die; NUM_DIE_SLOTS],
}

impl DiceTray {
    pub fn die(&self, slot: DieSlot) -> &Die {
        &self.dice[slot.index()]
    }

    pub(crate) fn die_mut(&mut self, slot: DieSlot) -> &mut Die {
        &mut self.dice[slot.index()]
    }

    /// Show the left and right dice, hide the centre one.
    pub fn show_pair(&mut self) {
        self.die_mut(DieSlot::Left).visible = true;
        self.die_mut(DieSlot::Right).visible = true;
        self.die_mut(DieSlot::Centre).visible = false;
    }

    /// Show only the centre die.
    pub fn show_single(&mut self) {
        self.die_mut(DieSlot::Left).visible = false;
        self.die_mut(DieSlot::Right).visible = false;
        self.die_mut(DieSlot::Centre).visible = true;
    }

    pub fn show_for(&mut self, roll: &Roll) {
        if roll.is_tiebreaker() {
            self.show_single();
        } else {
            self.show_pair();
        }
    }

    pub fn hide(&mut self, slot: DieSlot) {
        self.die_mut(slot).visible = false;
    }

    pub fn hide_all(&mut self) {
        for die in &mut self.dice {
            die.visible = false;
        }
    }

    /// Reveal every rolled face.
    pub fn settle(&mut self) {
        for die in &mut self.dice {
            die.rolling = false;
        }
    }

    pub fn is_rolling(&self) -> bool {
        self.dice.iter().any(|die| die.rolling)
    }

    pub fn visible_slots(&self) -> Vec<DieSlot> {
        DieSlot::ALL
            .into_iter()
            .filter(|slot| self.die(*slot).visible)
            .collect()
    }
}

/// What a roll button press will roll.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RollHandler {
    pub roll: Roll,
    pub stage: RollStage,
}

/// The roll button and its single handler slot.
///
/// Installing a handler replaces whatever was there, so at most one press
/// action is ever attached.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RollButton {
    visible: bool,
    handler: Option<RollHandler>,
}

impl RollButton {
    /// Attach a handler and show the button, returning the handler it replaced.
    pub fn install(&mut self, handler: RollHandler) -> Option<RollHandler> {
        self.visible = true;
        self.handler.replace(handler)
    }

    /// Detach the handler for a press and hide the button.
    pub fn take(&mut self) -> Option<RollHandler> {
        self.visible = false;
        self.handler.take()
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn handler(&self) -> Option<&RollHandler> {
        self.handler.as_ref()
    }
}

/// Everything a frontend draws for a game in progress.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Table {
    pub scoreboard: Scoreboard,
    pub dice: DiceTray,
    pub roll_button: RollButton,
}
