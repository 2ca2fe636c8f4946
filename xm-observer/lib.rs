pub use self::families::{Family, build_families};
pub use self::observer::{Observer, ObserverHandle};
pub use self::record::InstanceRecord;
pub use self::render::{encode, render};
pub use self::state::ObserverState;

mod families;
mod observer;
mod record;
mod render;
mod state;

#[cfg(test)]
mod test_utils;
