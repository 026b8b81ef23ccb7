pub mod character;
pub mod health;
pub mod snapshot;
pub mod viewer;

pub use character::{get_character, get_character_view};
pub use health::health_check;
pub use snapshot::{export_snapshot, import_snapshot};
pub use viewer::{viewer_clear_offline, viewer_current, viewer_export, viewer_import, viewer_search};
