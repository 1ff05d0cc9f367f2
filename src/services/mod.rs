pub mod auth_service;
pub mod community_service;
pub mod recommendation_service;
pub mod vote_service;
