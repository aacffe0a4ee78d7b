mod action;
mod audio;
mod effect;
mod grid;
mod reducer;
mod settings;
mod state;
mod timers;
mod ui;

use std::io;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use tui_dispatch::EffectStore;

use crate::action::Action;
use crate::audio::SoundService;
use crate::effect::Effect;
use crate::grid::NavDirection;
use crate::state::{AppState, Player};
use crate::timers::Timers;

#[derive(Parser, Debug)]
#[command(name = "versus")]
#[command(about = "Two-player fighter select screen for the terminal")]
struct Args {
    #[arg(long, default_value_t = 0xF167_7E25_u64)]
    seed: u64,
    /// Run without audio output.
    #[arg(long)]
    silent: bool,
}

const IDLE_POLL: Duration = Duration::from_millis(100);

type Store = EffectStore<AppState, Action, Effect>;

fn main() -> io::Result<()> {
    let args = Args::parse();
    let saved = settings::load();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, args, saved);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    args: Args,
    saved: settings::Settings,
) -> io::Result<()> {
    let mut store = EffectStore::new(AppState::new(args.seed, saved.muted), reducer::reducer);
    let mut timers = Timers::new();
    let mut sound = if args.silent {
        SoundService::disabled(saved.muted)
    } else {
        match SoundService::new(saved.muted) {
            Ok(sound) => sound,
            Err(err) => {
                store.state_mut().message = Some(format!("audio unavailable: {}", err));
                SoundService::disabled(saved.muted)
            }
        }
    };

    let size = terminal.size()?;
    dispatch_action(
        &mut store,
        &mut timers,
        &mut sound,
        Action::Resize(size.width, size.height),
    );
    dispatch_action(&mut store, &mut timers, &mut sound, Action::Init);

    loop {
        terminal.draw(|frame| ui::render(frame, frame.area(), store.state()))?;

        let timeout = timers
            .poll_timeout(Instant::now())
            .map_or(IDLE_POLL, |until_due| until_due.min(IDLE_POLL));
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    if handle_key(key.code, &mut store, &mut timers, &mut sound) {
                        break;
                    }
                }
                Event::Mouse(mouse) => {
                    let size = terminal.size()?;
                    handle_mouse(mouse, size.width, size.height, &mut store, &mut timers, &mut sound);
                }
                Event::Resize(width, height) => {
                    dispatch_action(&mut store, &mut timers, &mut sound, Action::Resize(width, height));
                }
                _ => {}
            }
        }

        for due in timers.fire_due(Instant::now()) {
            dispatch_action(&mut store, &mut timers, &mut sound, due);
        }
    }

    sound.stop_loop();
    Ok(())
}

fn handle_key(
    code: KeyCode,
    store: &mut Store,
    timers: &mut Timers,
    sound: &mut SoundService,
) -> bool {
    let action = match code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return true,
        KeyCode::Left => Action::Navigate(NavDirection::Left),
        KeyCode::Right => Action::Navigate(NavDirection::Right),
        KeyCode::Up => Action::Navigate(NavDirection::Up),
        KeyCode::Down => Action::Navigate(NavDirection::Down),
        KeyCode::Enter | KeyCode::Char(' ') => Action::Activate,
        KeyCode::Backspace => Action::UndoLast,
        KeyCode::Char('1') => Action::UndoPlayer(Player::One),
        KeyCode::Char('2') => Action::UndoPlayer(Player::Two),
        KeyCode::Char('r') | KeyCode::Char('R') => Action::TriggerRandom,
        KeyCode::Char('m') | KeyCode::Char('M') => Action::ToggleSound,
        KeyCode::Tab | KeyCode::BackTab => Action::FocusNext,
        _ => return false,
    };
    dispatch_action(store, timers, sound, action);
    false
}

fn handle_mouse(
    mouse: MouseEvent,
    width: u16,
    height: u16,
    store: &mut Store,
    timers: &mut Timers,
    sound: &mut SoundService,
) {
    let layout = ui::screen_layout(Rect::new(0, 0, width, height), store.state().layout);
    match mouse.kind {
        MouseEventKind::Moved => {
            let target = layout.fighter_at(mouse.column, mouse.row);
            if store.state().hovered_slot != target {
                dispatch_action(store, timers, sound, Action::HoverSlot(target));
            }
        }
        MouseEventKind::Down(MouseButton::Left) => {
            if let Some(slot) = layout.slot_at(mouse.column, mouse.row) {
                dispatch_action(store, timers, sound, Action::FocusSlot(slot));
                dispatch_action(store, timers, sound, Action::SelectSlot(slot));
            } else if layout.over_sound_toggle(mouse.column, mouse.row) {
                dispatch_action(store, timers, sound, Action::ToggleSound);
            } else {
                dispatch_action(store, timers, sound, Action::BlurGrid);
            }
        }
        _ => {}
    }
}

fn dispatch_action(store: &mut Store, timers: &mut Timers, sound: &mut SoundService, action: Action) {
    let result = store.dispatch(action);
    for effect in result.effects {
        handle_effect(store, timers, sound, effect);
    }
}

fn handle_effect(store: &mut Store, timers: &mut Timers, sound: &mut SoundService, effect: Effect) {
    match effect {
        Effect::PlayCue(cue) => sound.play(cue),
        Effect::StartMusic => sound.start_loop(),
        Effect::ApplyMute(muted) => sound.set_muted(muted),
        Effect::PersistMute(muted) => {
            if let Err(err) = settings::save(&settings::Settings { muted }) {
                store.state_mut().message = Some(err);
            }
        }
        Effect::SchedulePreview { slot } => timers.schedule_preview(Instant::now(), slot),
        Effect::CancelPreview => timers.cancel_preview(),
        Effect::ScheduleRandomTick => timers.schedule_random_tick(Instant::now()),
        Effect::ScheduleLockFlash => timers.schedule_lock_flash(Instant::now()),
        Effect::CancelTimers => timers.clear(),
    }
}
