pub mod bookmark;
pub mod destination;
pub mod post;
pub mod recommendation;
pub mod search;
pub mod tip;
pub mod travel_plan;
pub mod user;
pub mod vote;
