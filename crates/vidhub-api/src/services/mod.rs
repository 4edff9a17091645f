pub mod account;
pub mod asset_cleanup;
pub mod media;
pub mod video_workflow;

pub use account::{AccountService, ProfileImage, RegisterInput};
pub use asset_cleanup::{AssetCleanupHandle, AssetCleanupService, AssetCleanupSettings, AssetCleanupWorker};
pub use video_workflow::{PublishVideoInput, UpdateVideoInput, VideoWorkflow};
