/// Local user actions fed into a running [`crate::MeetingClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCommand {
    StartScreenShare,
    /// Also sent by capture backends when the user ends the share externally.
    StopScreenShare,
    ToggleAudio,
    ToggleVideo,
    RequestSync,
    Leave,
}
