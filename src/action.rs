use serde::{Deserialize, Serialize};

use crate::grid::NavDirection;
use crate::state::Player;

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[action(infer_categories)]
pub enum Action {
    Init,

    Navigate(NavDirection),
    FocusSlot(usize),
    HoverSlot(Option<usize>),
    BlurGrid,
    FocusNext,

    Activate,
    SelectSlot(usize),
    TriggerRandom,
    RandomTick,

    UndoLast,
    UndoPlayer(Player),

    PreviewElapsed(usize),
    LockFlashElapsed,

    ToggleSound,
    Resize(u16, u16),
    Quit,
}
