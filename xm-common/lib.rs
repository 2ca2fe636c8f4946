pub use self::backoff::ResettableBackoff;
pub use self::utils::*;

pub mod logging;
pub mod tasks;

mod backoff;
mod utils;
