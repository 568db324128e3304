use thiserror::Error;

/// Offer/answer progress of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NegotiationState {
    #[default]
    Idle,
    HaveLocalOffer,
    HaveRemoteOffer,
    Stable,
    Failed,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot {event} while {from:?}")]
pub struct InvalidTransition {
    pub from: NegotiationState,
    pub event: &'static str,
}

impl NegotiationState {
    pub fn is_terminal(self) -> bool {
        matches!(self, NegotiationState::Failed | NegotiationState::Closed)
    }

    /// True while an offer/answer exchange is unfinished.
    pub fn is_negotiating(self) -> bool {
        matches!(
            self,
            NegotiationState::HaveLocalOffer | NegotiationState::HaveRemoteOffer
        )
    }

    pub fn local_offer(self) -> Result<Self, InvalidTransition> {
        match self {
            NegotiationState::Idle | NegotiationState::Stable => {
                Ok(NegotiationState::HaveLocalOffer)
            }
            from => Err(InvalidTransition {
                from,
                event: "send an offer",
            }),
        }
    }

    pub fn remote_offer(self) -> Result<Self, InvalidTransition> {
        match self {
            NegotiationState::Idle | NegotiationState::Stable => {
                Ok(NegotiationState::HaveRemoteOffer)
            }
            from => Err(InvalidTransition {
                from,
                event: "accept a remote offer",
            }),
        }
    }

    pub fn local_answer(self) -> Result<Self, InvalidTransition> {
        match self {
            NegotiationState::HaveRemoteOffer => Ok(NegotiationState::Stable),
            from => Err(InvalidTransition {
                from,
                event: "send an answer",
            }),
        }
    }

    pub fn remote_answer(self) -> Result<Self, InvalidTransition> {
        match self {
            NegotiationState::HaveLocalOffer => Ok(NegotiationState::Stable),
            from => Err(InvalidTransition {
                from,
                event: "accept a remote answer",
            }),
        }
    }

    pub fn rollback(self) -> Result<Self, InvalidTransition> {
        match self {
            NegotiationState::HaveLocalOffer => Ok(NegotiationState::Stable),
            from => Err(InvalidTransition {
                from,
                event: "roll back",
            }),
        }
    }
}
