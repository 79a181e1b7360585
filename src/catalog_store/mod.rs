mod models;
mod trait_def;

pub use models::{Movie, MovieDraft, NewMovie};
pub use trait_def::MovieStore;
