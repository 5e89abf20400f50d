mod dashboard;
mod playback;

pub use dashboard::{
    NOTHING_PLAYING_MESSAGE, NOW_PLAYING_ERROR, TOP_TRACKS_ERROR, fetch_overview,
    now_playing_status, top_tracks_list,
};
pub use playback::{
    ActionOutcome, NO_ACTIVE_DEVICE, PLAYER_COMMAND_FAILED, PREMIUM_REQUIRED, PlaybackAction,
    play_outcome, run as run_playback, stop_outcome,
};
