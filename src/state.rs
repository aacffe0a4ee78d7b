use serde::{Deserialize, Serialize};

pub const ROSTER: [&str; 11] = [
    "jester",
    "molly",
    "fjord",
    "yasha",
    "beau",
    "nott",
    "caleb",
    "caduceus",
    "essek",
    "avantika",
    "jourrael",
];

pub const LOCKED_SLOT: usize = 11;
pub const RANDOM_SLOT: usize = 12;
pub const SLOT_COUNT: usize = 13;

// Single-column cutoff. Terminal cells are roughly twice as tall as wide, so
// "portrait" is height * 2 >= width.
const SINGLE_MAX_WIDTH: u16 = 90;

pub fn is_fighter(slot: usize) -> bool {
    slot < ROSTER.len()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub fn index(self) -> usize {
        match self {
            Player::One => 0,
            Player::Two => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Player::One => "P1",
            Player::Two => "P2",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutMode {
    Single,
    Versus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusArea {
    Grid,
    Footer,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppState {
    pub terminal_size: (u16, u16),
    pub layout: LayoutMode,
    pub focus: FocusArea,
    pub focused_slot: Option<usize>,
    pub sticky_col: usize,
    pub hovered_slot: Option<usize>,
    pub picks: [Option<usize>; 2],
    pub history: Vec<Player>,
    pub preview: Option<usize>,
    pub random_queue: Vec<usize>,
    pub lock_flash: bool,
    pub muted: bool,
    pub message: Option<String>,
    pub rng_state: u64,
}

impl AppState {
    pub fn new(seed: u64, muted: bool) -> Self {
        Self {
            terminal_size: (80, 24),
            layout: Self::layout_for(80, 24),
            focus: FocusArea::Grid,
            focused_slot: None,
            sticky_col: 0,
            hovered_slot: None,
            picks: [None, None],
            history: Vec::new(),
            preview: None,
            random_queue: Vec::new(),
            lock_flash: false,
            muted,
            message: None,
            rng_state: mix64(seed),
        }
    }

    pub fn layout_for(width: u16, height: u16) -> LayoutMode {
        if width <= SINGLE_MAX_WIDTH && height as u32 * 2 >= width as u32 {
            LayoutMode::Single
        } else {
            LayoutMode::Versus
        }
    }

    /// True while no further commits are accepted: every panel is filled, or
    /// the randomize animation is running.
    pub fn select_disabled(&self) -> bool {
        if !self.random_queue.is_empty() {
            return true;
        }
        match self.layout {
            LayoutMode::Single => false,
            LayoutMode::Versus => self.picks[0].is_some() && self.picks[1].is_some(),
        }
    }

    pub fn slot_disabled(&self, _slot: usize) -> bool {
        self.select_disabled()
    }

    /// Whose panel the next commit fills. Derived from the picks, no turn
    /// counter: player one until they hold a pick, then player two.
    pub fn next_player(&self) -> Player {
        match self.layout {
            LayoutMode::Single => Player::One,
            LayoutMode::Versus => {
                if self.picks[0].is_none() {
                    Player::One
                } else {
                    Player::Two
                }
            }
        }
    }

    pub fn pick(&self, player: Player) -> Option<usize> {
        self.picks[player.index()]
    }

    pub fn fighter_held_by(&self, fighter: usize) -> Option<Player> {
        if self.picks[0] == Some(fighter) {
            Some(Player::One)
        } else if self.picks[1] == Some(fighter) {
            Some(Player::Two)
        } else {
            None
        }
    }

    /// Assign `fighter` to the next eligible player and record the pick in
    /// the history stack. An overwrite (single-player re-pick) replaces the
    /// player's existing history entry, so the stack length always equals the
    /// number of players holding a pick.
    pub fn commit_pick(&mut self, fighter: usize) -> Player {
        let player = self.next_player();
        if self.picks[player.index()].is_some() {
            self.remove_history_entry(player);
        }
        self.picks[player.index()] = Some(fighter);
        self.history.push(player);
        self.preview = None;
        player
    }

    /// Clear `player`'s pick and drop their most recent history entry.
    /// Returns false when there is nothing to undo.
    pub fn undo_pick(&mut self, player: Player) -> bool {
        if self.picks[player.index()].is_none() {
            return false;
        }
        self.picks[player.index()] = None;
        self.remove_history_entry(player);
        true
    }

    fn remove_history_entry(&mut self, player: Player) {
        if let Some(pos) = self.history.iter().rposition(|&p| p == player) {
            self.history.remove(pos);
        }
    }

    pub fn undo_available(&self, player: Player) -> bool {
        self.layout == LayoutMode::Versus && self.picks[player.index()].is_some()
    }

    /// The slot currently highlighted by the randomize animation.
    pub fn highlighted_slot(&self) -> Option<usize> {
        self.random_queue.first().copied()
    }

    /// Hard reset on layout-mode change: picks, history, preview, hover and
    /// the randomize animation all go.
    pub fn reset_selection(&mut self) {
        self.picks = [None, None];
        self.history.clear();
        self.preview = None;
        self.hovered_slot = None;
        self.random_queue.clear();
        self.lock_flash = false;
    }

    /// Fisher-Yates over the fighters still up for grabs. In two-player mode
    /// a fighter already on a panel never enters the queue.
    pub fn shuffle_roster(&mut self) -> Vec<usize> {
        let mut pool: Vec<usize> = (0..ROSTER.len())
            .filter(|&fighter| {
                self.layout == LayoutMode::Single || self.fighter_held_by(fighter).is_none()
            })
            .collect();
        let mut i = pool.len();
        while i > 1 {
            let j = (self.next_rand() % i as u64) as usize;
            i -= 1;
            pool.swap(i, j);
        }
        pool
    }

    fn next_rand(&mut self) -> u64 {
        self.rng_state = mix64(self.rng_state.wrapping_add(0x9e37_79b9_7f4a_7c15));
        self.rng_state
    }
}

fn mix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
