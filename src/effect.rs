use crate::audio::Cue;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    PlayCue(Cue),
    StartMusic,
    ApplyMute(bool),
    PersistMute(bool),
    SchedulePreview { slot: usize },
    CancelPreview,
    ScheduleRandomTick,
    ScheduleLockFlash,
    CancelTimers,
}
