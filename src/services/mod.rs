pub mod controller;
pub mod nexon;
pub mod projector;
pub mod snapshot;

// 주요 서비스 재노출
pub use controller::{CharacterFetcher, ViewerController};
pub use nexon::NexonService;
pub use snapshot::SnapshotCodec;
