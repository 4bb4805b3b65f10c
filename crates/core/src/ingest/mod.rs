pub mod feed;
pub mod normalize;
pub mod sync;
pub mod types;
