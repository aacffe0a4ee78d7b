use tui_dispatch::DispatchResult;

use crate::action::Action;
use crate::audio::Cue;
use crate::effect::Effect;
use crate::grid::{self, NavDirection};
use crate::state::{
    is_fighter, AppState, FocusArea, LayoutMode, Player, LOCKED_SLOT, RANDOM_SLOT, SLOT_COUNT,
};

// Grid entry point for navigation arriving from outside the grid; None falls
// back to the first enabled slot.
const INITIAL_FOCUS: Option<usize> = None;

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init => DispatchResult::changed_with(Effect::StartMusic),

        Action::Navigate(direction) => handle_navigate(state, direction),
        Action::FocusSlot(slot) => handle_focus_slot(state, slot),
        Action::HoverSlot(slot) => handle_hover(state, slot),
        Action::BlurGrid => handle_blur(state),
        Action::FocusNext => handle_focus_next(state),

        Action::Activate => handle_activate(state),
        Action::SelectSlot(slot) => handle_select(state, slot),
        Action::TriggerRandom => handle_select(state, RANDOM_SLOT),
        Action::RandomTick => handle_random_tick(state),

        Action::UndoLast => match state.history.last().copied() {
            Some(player) => handle_undo(state, player),
            None => DispatchResult::unchanged(),
        },
        Action::UndoPlayer(player) => handle_undo(state, player),

        Action::PreviewElapsed(slot) => {
            state.preview = Some(slot);
            DispatchResult::changed()
        }
        Action::LockFlashElapsed => {
            state.lock_flash = false;
            DispatchResult::changed()
        }

        Action::ToggleSound => toggle_sound(state),
        Action::Resize(width, height) => handle_resize(state, width, height),
        Action::Quit => DispatchResult::unchanged(),
    }
}

fn disabled_snapshot(state: &AppState) -> [bool; SLOT_COUNT] {
    let mut flags = [false; SLOT_COUNT];
    for (slot, flag) in flags.iter_mut().enumerate() {
        *flag = state.slot_disabled(slot);
    }
    flags
}

/// The original's "activeElement inside the options container": keyboard
/// owns the grid once a slot is focused and the grid area has focus.
fn focus_in_grid(state: &AppState) -> bool {
    state.focus == FocusArea::Grid && state.focused_slot.is_some()
}

fn handle_navigate(state: &mut AppState, direction: NavDirection) -> DispatchResult<Effect> {
    let flags = disabled_snapshot(state);
    let disabled = |slot: usize| flags[slot];

    if !focus_in_grid(state) {
        let Some(slot) = grid::entry_slot(INITIAL_FOCUS, &disabled) else {
            return DispatchResult::unchanged();
        };
        state.focus = FocusArea::Grid;
        let col = grid::slot_position(slot).1;
        return apply_focus_change(state, slot, Some(col));
    }

    let from = state.focused_slot.unwrap_or(0);
    match grid::move_from(from, state.sticky_col, direction, &disabled) {
        Some(target) => apply_focus_change(state, target.slot, Some(target.sticky_col)),
        None => DispatchResult::unchanged(),
    }
}

/// Focus landed on `slot`, by keyboard or by pointer click. Fighters get the
/// hover cue (unless the pointer already covered them) and a debounced
/// preview; the sentinel slots clear the preview instead.
fn apply_focus_change(
    state: &mut AppState,
    slot: usize,
    sticky: Option<usize>,
) -> DispatchResult<Effect> {
    state.focused_slot = Some(slot);
    if let Some(col) = sticky {
        state.sticky_col = col;
    }
    let mut effects = Vec::new();
    if is_fighter(slot) {
        if state.hovered_slot != Some(slot) {
            effects.push(Effect::PlayCue(Cue::Hover));
        }
        effects.push(Effect::SchedulePreview { slot });
    } else {
        state.preview = None;
        effects.push(Effect::CancelPreview);
    }
    DispatchResult::changed_with_many(effects)
}

fn handle_focus_slot(state: &mut AppState, slot: usize) -> DispatchResult<Effect> {
    if slot >= SLOT_COUNT || state.select_disabled() {
        return DispatchResult::unchanged();
    }
    state.focus = FocusArea::Grid;
    apply_focus_change(state, slot, None)
}

fn handle_hover(state: &mut AppState, slot: Option<usize>) -> DispatchResult<Effect> {
    if state.select_disabled() {
        return DispatchResult::unchanged();
    }
    match slot {
        Some(slot) if is_fighter(slot) => {
            if state.hovered_slot == Some(slot) {
                return DispatchResult::unchanged();
            }
            state.hovered_slot = Some(slot);
            let mut effects = vec![Effect::PlayCue(Cue::Hover)];
            if !focus_in_grid(state) {
                effects.push(Effect::SchedulePreview { slot });
            }
            DispatchResult::changed_with_many(effects)
        }
        _ => {
            if state.hovered_slot.is_none() {
                return DispatchResult::unchanged();
            }
            state.hovered_slot = None;
            if focus_in_grid(state) {
                DispatchResult::changed()
            } else {
                state.preview = None;
                DispatchResult::changed_with(Effect::CancelPreview)
            }
        }
    }
}

/// Focus left the grid. A pointer still resting on a fighter wins and gets
/// its preview rescheduled; otherwise the preview clears immediately.
fn handle_blur(state: &mut AppState) -> DispatchResult<Effect> {
    if state.focus != FocusArea::Grid {
        return DispatchResult::unchanged();
    }
    state.focus = FocusArea::Footer;
    match state.hovered_slot {
        Some(slot) => DispatchResult::changed_with(Effect::SchedulePreview { slot }),
        None => {
            state.preview = None;
            DispatchResult::changed_with(Effect::CancelPreview)
        }
    }
}

fn handle_focus_next(state: &mut AppState) -> DispatchResult<Effect> {
    match state.focus {
        FocusArea::Grid => handle_blur(state),
        FocusArea::Footer => {
            state.focus = FocusArea::Grid;
            let flags = disabled_snapshot(state);
            let disabled = |slot: usize| flags[slot];
            let remembered = state.focused_slot.filter(|&slot| !disabled(slot));
            match remembered.or_else(|| grid::entry_slot(INITIAL_FOCUS, &disabled)) {
                Some(slot) => apply_focus_change(state, slot, None),
                None => {
                    state.focused_slot = None;
                    DispatchResult::changed()
                }
            }
        }
    }
}

fn handle_activate(state: &mut AppState) -> DispatchResult<Effect> {
    match state.focus {
        FocusArea::Footer => toggle_sound(state),
        FocusArea::Grid => match state.focused_slot {
            Some(slot) => handle_select(state, slot),
            None => DispatchResult::unchanged(),
        },
    }
}

fn handle_select(state: &mut AppState, slot: usize) -> DispatchResult<Effect> {
    if slot >= SLOT_COUNT || state.select_disabled() {
        return DispatchResult::unchanged();
    }
    if slot == LOCKED_SLOT {
        state.lock_flash = true;
        return DispatchResult::changed_with(Effect::ScheduleLockFlash);
    }
    if slot == RANDOM_SLOT {
        return start_randomize(state);
    }
    if state.layout == LayoutMode::Versus && state.fighter_held_by(slot).is_some() {
        // Duplicate assignment is refused here, not left to button styling.
        return DispatchResult::changed_with(Effect::PlayCue(Cue::Disabled));
    }
    state.commit_pick(slot);
    DispatchResult::changed_with_many(vec![Effect::CancelPreview, Effect::PlayCue(Cue::Confirm)])
}

fn start_randomize(state: &mut AppState) -> DispatchResult<Effect> {
    let queue = state.shuffle_roster();
    if queue.is_empty() {
        return DispatchResult::unchanged();
    }
    state.random_queue = queue;
    let mut effects = vec![Effect::PlayCue(Cue::Randomize)];
    if state.random_queue.len() == 1 {
        let fighter = state.random_queue[0];
        state.random_queue.clear();
        state.commit_pick(fighter);
        effects.push(Effect::CancelPreview);
    } else {
        effects.push(Effect::ScheduleRandomTick);
    }
    DispatchResult::changed_with_many(effects)
}

fn handle_random_tick(state: &mut AppState) -> DispatchResult<Effect> {
    if state.random_queue.len() < 2 {
        // Stale tick after a cancel or reset.
        return DispatchResult::unchanged();
    }
    state.random_queue.remove(0);
    if state.random_queue.len() == 1 {
        let fighter = state.random_queue[0];
        state.random_queue.clear();
        state.commit_pick(fighter);
        DispatchResult::changed_with(Effect::CancelPreview)
    } else {
        DispatchResult::changed_with(Effect::ScheduleRandomTick)
    }
}

fn handle_undo(state: &mut AppState, player: Player) -> DispatchResult<Effect> {
    if !state.undo_pick(player) {
        return DispatchResult::unchanged();
    }
    DispatchResult::changed_with(Effect::PlayCue(Cue::Disabled))
}

fn toggle_sound(state: &mut AppState) -> DispatchResult<Effect> {
    state.muted = !state.muted;
    DispatchResult::changed_with_many(vec![
        Effect::ApplyMute(state.muted),
        Effect::PersistMute(state.muted),
    ])
}

fn handle_resize(state: &mut AppState, width: u16, height: u16) -> DispatchResult<Effect> {
    state.terminal_size = (width, height);
    let mode = AppState::layout_for(width, height);
    if mode == state.layout {
        return DispatchResult::changed();
    }
    state.layout = mode;
    state.reset_selection();
    DispatchResult::changed_with(Effect::CancelTimers)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::state::ROSTER;

    fn versus() -> AppState {
        AppState::new(11, false)
    }

    fn single() -> AppState {
        let mut state = AppState::new(11, false);
        let _ = reducer(&mut state, Action::Resize(60, 40));
        state
    }

    #[test]
    fn two_player_commit_and_global_undo_scenario() {
        let mut state = versus();

        let _ = reducer(&mut state, Action::SelectSlot(0));
        assert_eq!(state.pick(Player::One), Some(0));
        assert_eq!(state.history, vec![Player::One]);

        let _ = reducer(&mut state, Action::SelectSlot(1));
        assert_eq!(state.pick(Player::Two), Some(1));
        assert_eq!(state.history, vec![Player::One, Player::Two]);

        let _ = reducer(&mut state, Action::UndoLast);
        assert_eq!(state.pick(Player::Two), None);
        assert_eq!(state.history, vec![Player::One]);

        let _ = reducer(&mut state, Action::SelectSlot(2));
        assert_eq!(state.pick(Player::Two), Some(2));
        assert_eq!(state.history, vec![Player::One, Player::Two]);
    }

    #[test]
    fn commit_emits_confirm_and_clears_preview() {
        let mut state = versus();
        let _ = reducer(&mut state, Action::PreviewElapsed(3));
        assert_eq!(state.preview, Some(3));

        let result = reducer(&mut state, Action::SelectSlot(3));
        assert_eq!(
            result.effects,
            vec![Effect::CancelPreview, Effect::PlayCue(Cue::Confirm)]
        );
        assert_eq!(state.preview, None);
    }

    #[test]
    fn select_is_rejected_while_both_players_ready() {
        let mut state = versus();
        let _ = reducer(&mut state, Action::SelectSlot(0));
        let _ = reducer(&mut state, Action::SelectSlot(1));
        assert!(state.select_disabled());

        let result = reducer(&mut state, Action::SelectSlot(5));
        assert!(result.effects.is_empty());
        assert_eq!(state.picks, [Some(0), Some(1)]);
        assert_eq!(state.history, vec![Player::One, Player::Two]);
    }

    #[test]
    fn duplicate_fighter_is_refused_at_commit() {
        let mut state = versus();
        let _ = reducer(&mut state, Action::SelectSlot(4));

        let result = reducer(&mut state, Action::SelectSlot(4));
        assert_eq!(result.effects, vec![Effect::PlayCue(Cue::Disabled)]);
        assert_eq!(state.pick(Player::Two), None);
        assert_eq!(state.history, vec![Player::One]);
    }

    #[test]
    fn single_player_commits_overwrite_the_sole_slot() {
        let mut state = single();
        let _ = reducer(&mut state, Action::SelectSlot(0));
        let _ = reducer(&mut state, Action::SelectSlot(4));
        assert_eq!(state.pick(Player::One), Some(4));
        assert_eq!(state.pick(Player::Two), None);
        assert_eq!(state.history, vec![Player::One]);
        assert!(!state.select_disabled());
    }

    #[test]
    fn undo_with_no_pick_is_a_noop() {
        let mut state = versus();
        let result = reducer(&mut state, Action::UndoPlayer(Player::Two));
        assert!(result.effects.is_empty());
        assert!(state.history.is_empty());

        let result = reducer(&mut state, Action::UndoLast);
        assert!(result.effects.is_empty());
    }

    #[test]
    fn undo_removes_the_nearest_entry_for_that_player() {
        let mut state = versus();
        let _ = reducer(&mut state, Action::SelectSlot(0));
        let _ = reducer(&mut state, Action::SelectSlot(1));

        let result = reducer(&mut state, Action::UndoPlayer(Player::One));
        assert_eq!(result.effects, vec![Effect::PlayCue(Cue::Disabled)]);
        assert_eq!(state.history, vec![Player::Two]);

        // The freed panel is the next to fill.
        let _ = reducer(&mut state, Action::SelectSlot(2));
        assert_eq!(state.pick(Player::One), Some(2));
        assert_eq!(state.history, vec![Player::Two, Player::One]);
    }

    #[test]
    fn history_length_always_matches_active_picks() {
        let mut state = versus();
        let actions = [
            Action::SelectSlot(0),
            Action::UndoPlayer(Player::One),
            Action::SelectSlot(1),
            Action::SelectSlot(2),
            Action::UndoLast,
            Action::SelectSlot(3),
            Action::UndoPlayer(Player::One),
            Action::UndoPlayer(Player::One),
        ];
        for action in actions {
            let _ = reducer(&mut state, action);
            let active = state.picks.iter().filter(|pick| pick.is_some()).count();
            assert_eq!(state.history.len(), active);
        }
    }

    #[test]
    fn randomize_advances_then_commits_the_last_survivor() {
        let mut state = versus();
        let result = reducer(&mut state, Action::TriggerRandom);
        assert_eq!(
            result.effects,
            vec![Effect::PlayCue(Cue::Randomize), Effect::ScheduleRandomTick]
        );
        assert!(state.select_disabled());
        assert_eq!(state.random_queue.len(), ROSTER.len());
        let survivor = *state.random_queue.last().unwrap();

        let mut ticks = 0;
        while !state.random_queue.is_empty() {
            let result = reducer(&mut state, Action::RandomTick);
            ticks += 1;
            assert!(ticks < ROSTER.len());
            if state.random_queue.is_empty() {
                assert_eq!(result.effects, vec![Effect::CancelPreview]);
            } else {
                assert_eq!(result.effects, vec![Effect::ScheduleRandomTick]);
                assert_eq!(state.highlighted_slot(), Some(state.random_queue[0]));
            }
        }

        assert_eq!(ticks, ROSTER.len() - 1);
        assert_eq!(state.pick(Player::One), Some(survivor));
        assert_eq!(state.history, vec![Player::One]);
        assert!(!state.select_disabled());
    }

    #[test]
    fn randomize_skips_fighters_already_on_a_panel() {
        let mut state = versus();
        let _ = reducer(&mut state, Action::SelectSlot(6));

        let _ = reducer(&mut state, Action::TriggerRandom);
        assert_eq!(state.random_queue.len(), ROSTER.len() - 1);
        assert!(!state.random_queue.contains(&6));

        while !state.random_queue.is_empty() {
            let _ = reducer(&mut state, Action::RandomTick);
        }
        assert!(state.pick(Player::Two).is_some());
        assert_ne!(state.pick(Player::Two), Some(6));
    }

    #[test]
    fn stale_random_tick_is_ignored() {
        let mut state = versus();
        let result = reducer(&mut state, Action::RandomTick);
        assert!(result.effects.is_empty());
        assert_eq!(state.picks, [None, None]);
    }

    #[test]
    fn arrow_entry_focuses_the_first_enabled_slot() {
        let mut state = versus();
        let result = reducer(&mut state, Action::Navigate(NavDirection::Down));
        assert_eq!(state.focused_slot, Some(0));
        assert_eq!(state.sticky_col, 0);
        assert_eq!(state.focus, FocusArea::Grid);
        assert_eq!(
            result.effects,
            vec![Effect::PlayCue(Cue::Hover), Effect::SchedulePreview { slot: 0 }]
        );
    }

    #[test]
    fn horizontal_moves_wrap_and_update_sticky_column() {
        let mut state = versus();
        let _ = reducer(&mut state, Action::Navigate(NavDirection::Down));
        let _ = reducer(&mut state, Action::Navigate(NavDirection::Right));
        assert_eq!(state.focused_slot, Some(1));
        assert_eq!(state.sticky_col, 1);
        let _ = reducer(&mut state, Action::Navigate(NavDirection::Right));
        let _ = reducer(&mut state, Action::Navigate(NavDirection::Right));
        assert_eq!(state.focused_slot, Some(0));
        assert_eq!(state.sticky_col, 0);
    }

    #[test]
    fn vertical_moves_keep_the_sticky_column() {
        let mut state = versus();
        let _ = reducer(&mut state, Action::Navigate(NavDirection::Down));
        let _ = reducer(&mut state, Action::Navigate(NavDirection::Right));
        let _ = reducer(&mut state, Action::Navigate(NavDirection::Right));
        assert_eq!(state.focused_slot, Some(2));

        let _ = reducer(&mut state, Action::Navigate(NavDirection::Down));
        assert_eq!(state.focused_slot, Some(4));
        assert_eq!(state.sticky_col, 2);

        let _ = reducer(&mut state, Action::Navigate(NavDirection::Down));
        assert_eq!(state.focused_slot, Some(7));
    }

    #[test]
    fn navigation_is_inert_while_selection_is_disabled() {
        let mut state = versus();
        let _ = reducer(&mut state, Action::SelectSlot(0));
        let _ = reducer(&mut state, Action::SelectSlot(1));

        let result = reducer(&mut state, Action::Navigate(NavDirection::Down));
        assert!(result.effects.is_empty());
        assert_eq!(state.focused_slot, None);
    }

    #[test]
    fn hover_schedules_a_debounced_preview() {
        let mut state = versus();
        let result = reducer(&mut state, Action::HoverSlot(Some(3)));
        assert_eq!(
            result.effects,
            vec![Effect::PlayCue(Cue::Hover), Effect::SchedulePreview { slot: 3 }]
        );
        assert_eq!(state.preview, None);

        let _ = reducer(&mut state, Action::PreviewElapsed(3));
        assert_eq!(state.preview, Some(3));
    }

    #[test]
    fn hover_leave_cancels_and_clears_immediately() {
        let mut state = versus();
        let _ = reducer(&mut state, Action::HoverSlot(Some(3)));
        let _ = reducer(&mut state, Action::PreviewElapsed(3));

        let result = reducer(&mut state, Action::HoverSlot(None));
        assert_eq!(result.effects, vec![Effect::CancelPreview]);
        assert_eq!(state.hovered_slot, None);
        assert_eq!(state.preview, None);
    }

    #[test]
    fn hover_only_records_while_keyboard_owns_the_grid() {
        let mut state = versus();
        let _ = reducer(&mut state, Action::Navigate(NavDirection::Down));

        let result = reducer(&mut state, Action::HoverSlot(Some(5)));
        assert_eq!(result.effects, vec![Effect::PlayCue(Cue::Hover)]);
        assert_eq!(state.hovered_slot, Some(5));
    }

    #[test]
    fn blur_falls_back_to_the_hovered_candidate() {
        let mut state = versus();
        let _ = reducer(&mut state, Action::Navigate(NavDirection::Down));
        let _ = reducer(&mut state, Action::HoverSlot(Some(5)));

        let result = reducer(&mut state, Action::BlurGrid);
        assert_eq!(state.focus, FocusArea::Footer);
        assert_eq!(result.effects, vec![Effect::SchedulePreview { slot: 5 }]);
    }

    #[test]
    fn blur_without_hover_clears_the_preview() {
        let mut state = versus();
        let _ = reducer(&mut state, Action::Navigate(NavDirection::Down));
        let _ = reducer(&mut state, Action::PreviewElapsed(0));

        let result = reducer(&mut state, Action::BlurGrid);
        assert_eq!(result.effects, vec![Effect::CancelPreview]);
        assert_eq!(state.preview, None);
    }

    #[test]
    fn focusing_a_sentinel_slot_clears_the_preview() {
        let mut state = versus();
        let _ = reducer(&mut state, Action::PreviewElapsed(2));

        let result = reducer(&mut state, Action::FocusSlot(LOCKED_SLOT));
        assert_eq!(result.effects, vec![Effect::CancelPreview]);
        assert_eq!(state.preview, None);
        assert_eq!(state.focused_slot, Some(LOCKED_SLOT));
    }

    #[test]
    fn focus_on_the_hovered_slot_skips_the_hover_cue() {
        let mut state = versus();
        let _ = reducer(&mut state, Action::HoverSlot(Some(4)));

        let result = reducer(&mut state, Action::FocusSlot(4));
        assert_eq!(result.effects, vec![Effect::SchedulePreview { slot: 4 }]);
    }

    #[test]
    fn locked_slot_flashes_without_committing() {
        let mut state = versus();
        let result = reducer(&mut state, Action::SelectSlot(LOCKED_SLOT));
        assert!(state.lock_flash);
        assert_eq!(result.effects, vec![Effect::ScheduleLockFlash]);
        assert_eq!(state.picks, [None, None]);
        assert!(state.history.is_empty());

        let _ = reducer(&mut state, Action::LockFlashElapsed);
        assert!(!state.lock_flash);
    }

    #[test]
    fn layout_change_resets_selection_and_cancels_timers() {
        let mut state = versus();
        let _ = reducer(&mut state, Action::SelectSlot(0));

        let result = reducer(&mut state, Action::Resize(60, 40));
        assert_eq!(state.layout, LayoutMode::Single);
        assert_eq!(state.picks, [None, None]);
        assert!(state.history.is_empty());
        assert_eq!(result.effects, vec![Effect::CancelTimers]);

        // Same mode again: a plain resize keeps the selection.
        let _ = reducer(&mut state, Action::SelectSlot(1));
        let result = reducer(&mut state, Action::Resize(58, 40));
        assert!(result.effects.is_empty());
        assert_eq!(state.pick(Player::One), Some(1));
    }

    #[test]
    fn toggle_sound_applies_and_persists_the_flag() {
        let mut state = versus();
        let result = reducer(&mut state, Action::ToggleSound);
        assert!(state.muted);
        assert_eq!(
            result.effects,
            vec![Effect::ApplyMute(true), Effect::PersistMute(true)]
        );

        let result = reducer(&mut state, Action::ToggleSound);
        assert!(!state.muted);
        assert_eq!(
            result.effects,
            vec![Effect::ApplyMute(false), Effect::PersistMute(false)]
        );
    }

    #[test]
    fn init_starts_the_music_loop() {
        let mut state = versus();
        let result = reducer(&mut state, Action::Init);
        assert_eq!(result.effects, vec![Effect::StartMusic]);
    }

    #[test]
    fn activate_routes_by_focus_area() {
        let mut state = versus();
        // Nothing focused yet: activation in the grid is inert.
        let result = reducer(&mut state, Action::Activate);
        assert!(result.effects.is_empty());

        let _ = reducer(&mut state, Action::Navigate(NavDirection::Down));
        let _ = reducer(&mut state, Action::FocusNext);
        assert_eq!(state.focus, FocusArea::Footer);

        let _ = reducer(&mut state, Action::Activate);
        assert!(state.muted);
    }

    #[test]
    fn tab_returns_to_the_remembered_slot() {
        let mut state = versus();
        let _ = reducer(&mut state, Action::Navigate(NavDirection::Down));
        let _ = reducer(&mut state, Action::Navigate(NavDirection::Right));
        assert_eq!(state.focused_slot, Some(1));

        let _ = reducer(&mut state, Action::FocusNext);
        assert_eq!(state.focus, FocusArea::Footer);

        let _ = reducer(&mut state, Action::FocusNext);
        assert_eq!(state.focus, FocusArea::Grid);
        assert_eq!(state.focused_slot, Some(1));
    }
}
