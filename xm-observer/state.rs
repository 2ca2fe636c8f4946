/// Lifecycle state of the [`crate::Observer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObserverState {
    Initializing,
    Syncing,
    Stopped,
}

impl From<u8> for ObserverState {
    fn from(value: u8) -> Self {
        match value {
            0 => ObserverState::Initializing,
            1 => ObserverState::Syncing,
            _ => ObserverState::Stopped,
        }
    }
}

impl From<ObserverState> for u8 {
    fn from(value: ObserverState) -> Self {
        match value {
            ObserverState::Initializing => 0,
            ObserverState::Syncing => 1,
            ObserverState::Stopped => 2,
        }
    }
}
