pub mod listing;
pub mod user;
pub mod video;

pub use listing::{SortDirection, SortField, VideoListParams, VideoListQuery};
pub use user::{
    ChangePasswordRequest, LoginRequest, LoginResponse, NewUser, OwnerDetails,
    RefreshTokenRequest, TokenPair, UpdateAccountRequest, User, UserResponse,
};
pub use video::{NewVideo, Video, VideoDetailsUpdate, VideoWithOwner};
