pub mod asset;
pub mod error;
pub mod normalize;
pub mod source;

pub use asset::MediaAsset;
pub use error::MediaError;
pub use source::MediaSource;
