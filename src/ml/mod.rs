pub mod budget;
pub mod fitness;
pub mod ranker;
pub mod season;
