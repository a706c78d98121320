pub mod asset;
pub mod session;
pub mod wire;

pub use asset::MediaAsset;
pub use session::{Session, SESSION_TTL_DAYS};
pub use wire::{HistoryEntry, RegisterResponse, TokenResponse, VerificationRecord};
