pub mod rating;
pub mod rating_event;
pub mod recommendation;
