mod live;
mod params;
mod platform;
mod record;
mod spec;
mod value;

pub use live::*;
pub use params::*;
pub use platform::*;
pub use record::*;
pub use spec::*;
pub use value::*;
