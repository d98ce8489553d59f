use serde::Serialize;

/// What a user clicked on a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteAction {
    Like,
    Dislike,
}

impl VoteAction {
    fn liked(self) -> bool {
        matches!(self, VoteAction::Like)
    }
}

/// Current reaction of one user to one topic. A stored row holds `liked`;
/// no row means no vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteState {
    None,
    Liked,
    Disliked,
}

impl VoteState {
    pub fn from_row(liked: Option<bool>) -> Self {
        match liked {
            None => VoteState::None,
            Some(true) => VoteState::Liked,
            Some(false) => VoteState::Disliked,
        }
    }

    pub fn as_row(self) -> Option<bool> {
        match self {
            VoteState::None => None,
            VoteState::Liked => Some(true),
            VoteState::Disliked => Some(false),
        }
    }
}

/// Write needed on the `topic_user_like` row to apply an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteChange {
    Insert { liked: bool },
    Update { liked: bool },
    Delete,
}

impl VoteChange {
    pub fn outcome(self) -> VoteState {
        match self {
            VoteChange::Insert { liked } | VoteChange::Update { liked } => {
                VoteState::from_row(Some(liked))
            }
            VoteChange::Delete => VoteState::None,
        }
    }
}

/// Three-state toggle: clicking the active reaction retracts it, clicking the
/// other one flips it, clicking anything with no vote records it.
pub fn transition(current: VoteState, action: VoteAction) -> VoteChange {
    let liked = action.liked();
    match current.as_row() {
        None => VoteChange::Insert { liked },
        Some(prev) if prev == liked => VoteChange::Delete,
        Some(_) => VoteChange::Update { liked },
    }
}
