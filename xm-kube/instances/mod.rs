pub use self::source::{DynamicSource, InstanceSource, InstanceStream};

mod source;
