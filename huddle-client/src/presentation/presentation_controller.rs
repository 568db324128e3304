use crate::peers::PeerDirectory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Grid,
    /// One screen share dominates, everything else is a thumbnail.
    Theater,
}

/// Derives the layout from current state; holds nothing of its own.
pub struct PresentationController;

impl PresentationController {
    pub fn view_mode(local_sharing: bool, peers: &PeerDirectory) -> ViewMode {
        if local_sharing || peers.has_screen_stream() || peers.has_announced_presenter() {
            ViewMode::Theater
        } else {
            ViewMode::Grid
        }
    }
}
