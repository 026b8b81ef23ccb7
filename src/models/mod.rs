pub mod api;
pub mod payload;
pub mod snapshot;
pub mod view;

pub use api::*;
pub use payload::{Payload, SectionKey};
pub use snapshot::*;
pub use view::*;
