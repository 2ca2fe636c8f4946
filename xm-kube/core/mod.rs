pub use self::descriptor::{ResourceScope, ResourceTypeDescriptor};
pub use self::target::WatchTarget;

mod descriptor;
mod target;
