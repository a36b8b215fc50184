pub mod bitonic;

pub use bitonic::{sort_in_place, HashPayload, SENTINEL};
