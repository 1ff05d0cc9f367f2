#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use actix_web::{web, App};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use tourism_api::config::AuthConfig;
use tourism_api::error::ApiError;
use tourism_api::ml::season::Season;
use tourism_api::models::bookmark::Bookmark;
use tourism_api::models::destination::{Destination, SeasonalWeather};
use tourism_api::models::post::Reply;
use tourism_api::models::tip::Tip;
use tourism_api::models::vote::{Vote, VoteKind, VoteTarget};
use tourism_api::routes;
use tourism_api::services::community_service::CommunityStore;
use tourism_api::services::recommendation_service::{RecommendationService, RecommendationStore};
use tourism_api::services::vote_service::VoteStore;

pub const TEST_SECRET: &str = "test-secret";

/// Catalogue held in memory, optionally failing every read.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    pub destinations: Vec<Destination>,
    pub weather: Vec<SeasonalWeather>,
    pub tips: Vec<Tip>,
    pub fail: bool,
}

#[async_trait]
impl RecommendationStore for InMemoryStore {
    async fn all_destinations(&self) -> Result<Vec<Destination>, ApiError> {
        if self.fail {
            return Err(ApiError::Database("connection refused".to_string()));
        }
        Ok(self.destinations.clone())
    }

    async fn seasonal_weather(&self, season: Season) -> Result<Vec<SeasonalWeather>, ApiError> {
        if self.fail {
            return Err(ApiError::Database("connection refused".to_string()));
        }
        Ok(self
            .weather
            .iter()
            .filter(|row| row.season == season)
            .cloned()
            .collect())
    }

    async fn top_tips(&self, destination_id: ObjectId, limit: i64) -> Result<Vec<Tip>, ApiError> {
        if self.fail {
            return Err(ApiError::Database("connection refused".to_string()));
        }
        let mut tips: Vec<Tip> = self
            .tips
            .iter()
            .filter(|tip| tip.destination_id == destination_id)
            .cloned()
            .collect();
        tips.sort_by(|a, b| b.upvotes.cmp(&a.upvotes));
        tips.truncate(limit as usize);
        Ok(tips)
    }
}

fn destination(name: &str, category: &str, budget: f64, popularity: f64) -> Destination {
    Destination {
        id: Some(ObjectId::new()),
        name: name.to_string(),
        description: format!("Visit {}", name),
        category: category.to_string(),
        latitude: 20.0,
        longitude: 78.0,
        average_budget: budget,
        average_duration_days: 4,
        popularity_score: popularity,
        tags: vec![category.to_string()],
        highlights: vec![],
        created_at: None,
    }
}

fn weather(destination: &Destination, season: Season, seasonal_score: f64) -> SeasonalWeather {
    SeasonalWeather {
        id: Some(ObjectId::new()),
        destination_id: destination.id.unwrap(),
        season,
        seasonal_score,
        comfort_score: seasonal_score,
        avg_temperature_c: Some(24.0),
        rainfall_mm: None,
        humidity_percent: None,
        description: None,
    }
}

fn tip(destination: &Destination, upvotes: i64) -> Tip {
    Tip {
        id: Some(ObjectId::new()),
        destination_id: destination.id.unwrap(),
        user_id: ObjectId::new(),
        content: format!("Tip with {} upvotes", upvotes),
        season: None,
        upvotes,
        downvotes: 0,
        is_featured: false,
        created_at: None,
    }
}

/// Six destinations with winter rows. With a 20000 budget in winter the
/// ranking is Goa 88, Jaipur 87, Kerala 78, Manali 68, Ladakh 44; the last
/// one scores 6 and is filtered out.
pub fn sample_store() -> InMemoryStore {
    let goa = destination("Goa", "beach", 15000.0, 92.0);
    let manali = destination("Manali", "hill station", 12000.0, 85.0);
    let jaipur = destination("Jaipur", "heritage", 10000.0, 88.0);
    let kerala = destination("Kerala Backwaters", "nature", 18000.0, 80.0);
    let ladakh = destination("Ladakh", "adventure", 30000.0, 75.0);
    let obscure = destination("Obscure Town", "", 50000.0, 10.0);

    let weather_rows = vec![
        weather(&goa, Season::Winter, 95.0),
        weather(&manali, Season::Winter, 55.0),
        weather(&jaipur, Season::Winter, 90.0),
        weather(&kerala, Season::Winter, 85.0),
        weather(&ladakh, Season::Winter, 20.0),
        weather(&obscure, Season::Winter, 10.0),
        weather(&goa, Season::Monsoon, 30.0),
    ];

    let tips = vec![
        tip(&goa, 5),
        tip(&goa, 20),
        tip(&goa, 1),
        tip(&goa, 8),
    ];

    InMemoryStore {
        destinations: vec![goa, manali, jaipur, kerala, ladakh, obscure],
        weather: weather_rows,
        tips,
        fail: false,
    }
}

pub fn auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: TEST_SECRET.to_string(),
        token_ttl_hours: 1,
    }
}

pub fn service(store: InMemoryStore) -> RecommendationService {
    RecommendationService::new(Arc::new(store))
}

/// The full route table without a database behind it.
pub fn create_app(
    store: InMemoryStore,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let auth = auth_config();
    App::new()
        .app_data(web::Data::new(auth.clone()))
        .app_data(web::Data::new(service(store)))
        .configure(move |cfg| routes::configure(cfg, &auth))
}

#[derive(Default)]
pub struct CommunityState {
    /// (upvotes, downvotes) of every votable tip or post
    pub counters: HashMap<ObjectId, (i64, i64)>,
    pub votes: HashMap<(ObjectId, ObjectId), VoteKind>,
    /// replies_count of every post
    pub posts: HashMap<ObjectId, i64>,
    pub replies: HashMap<ObjectId, Reply>,
    pub destinations: HashSet<ObjectId>,
    pub bookmarks: HashSet<(ObjectId, ObjectId)>,
}

/// Votes, replies and bookmarks held in memory.
///
/// `fail_counters` makes every counter update fail; `stale_reads` hides the
/// caller's current vote, as if another request changed it after the read.
#[derive(Default)]
pub struct InMemoryCommunity {
    pub state: Mutex<CommunityState>,
    pub fail_counters: AtomicBool,
    pub stale_reads: AtomicBool,
}

impl InMemoryCommunity {
    pub fn with_target(self, id: ObjectId, upvotes: i64, downvotes: i64) -> Self {
        self.state.lock().unwrap().counters.insert(id, (upvotes, downvotes));
        self
    }

    pub fn with_post(self, id: ObjectId) -> Self {
        self.state.lock().unwrap().posts.insert(id, 0);
        self
    }

    pub fn with_destination(self, id: ObjectId) -> Self {
        self.state.lock().unwrap().destinations.insert(id);
        self
    }

    pub fn with_vote(self, user_id: ObjectId, target_id: ObjectId, kind: VoteKind) -> Self {
        self.state.lock().unwrap().votes.insert((user_id, target_id), kind);
        self
    }

    pub fn counters(&self, id: ObjectId) -> (i64, i64) {
        self.state.lock().unwrap().counters[&id]
    }

    pub fn vote_of(&self, user_id: ObjectId, target_id: ObjectId) -> Option<VoteKind> {
        self.state.lock().unwrap().votes.get(&(user_id, target_id)).copied()
    }

    pub fn replies_count(&self, post_id: ObjectId) -> i64 {
        self.state.lock().unwrap().posts[&post_id]
    }

    pub fn reply_total(&self) -> usize {
        self.state.lock().unwrap().replies.len()
    }

    pub fn set_fail_counters(&self, fail: bool) {
        self.fail_counters.store(fail, Ordering::SeqCst);
    }

    pub fn set_stale_reads(&self, stale: bool) {
        self.stale_reads.store(stale, Ordering::SeqCst);
    }

    fn counters_down(&self) -> Result<(), ApiError> {
        if self.fail_counters.load(Ordering::SeqCst) {
            return Err(ApiError::Database("write concern timeout".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl VoteStore for InMemoryCommunity {
    async fn target_exists(
        &self,
        _target: VoteTarget,
        target_id: ObjectId,
    ) -> Result<bool, ApiError> {
        Ok(self.state.lock().unwrap().counters.contains_key(&target_id))
    }

    async fn current_vote(
        &self,
        user_id: ObjectId,
        target_id: ObjectId,
    ) -> Result<Option<VoteKind>, ApiError> {
        if self.stale_reads.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(self.vote_of(user_id, target_id))
    }

    async fn insert_vote(&self, vote: &Vote) -> Result<bool, ApiError> {
        let mut state = self.state.lock().unwrap();
        let key = (vote.user_id, vote.target_id);
        if state.votes.contains_key(&key) {
            return Ok(false);
        }
        state.votes.insert(key, vote.kind);
        Ok(true)
    }

    async fn delete_vote(
        &self,
        user_id: ObjectId,
        target_id: ObjectId,
        kind: VoteKind,
    ) -> Result<bool, ApiError> {
        let mut state = self.state.lock().unwrap();
        let key = (user_id, target_id);
        if state.votes.get(&key) != Some(&kind) {
            return Ok(false);
        }
        state.votes.remove(&key);
        Ok(true)
    }

    async fn switch_vote(
        &self,
        user_id: ObjectId,
        target_id: ObjectId,
        from: VoteKind,
        to: VoteKind,
    ) -> Result<bool, ApiError> {
        let mut state = self.state.lock().unwrap();
        match state.votes.get_mut(&(user_id, target_id)) {
            Some(kind) if *kind == from => {
                *kind = to;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn increment_counters(
        &self,
        _target: VoteTarget,
        target_id: ObjectId,
        upvotes: i64,
        downvotes: i64,
    ) -> Result<Option<(i64, i64)>, ApiError> {
        self.counters_down()?;
        let mut state = self.state.lock().unwrap();
        Ok(state.counters.get_mut(&target_id).map(|counters| {
            counters.0 += upvotes;
            counters.1 += downvotes;
            *counters
        }))
    }
}

#[async_trait]
impl CommunityStore for InMemoryCommunity {
    async fn post_exists(&self, post_id: ObjectId) -> Result<bool, ApiError> {
        Ok(self.state.lock().unwrap().posts.contains_key(&post_id))
    }

    async fn destination_exists(&self, destination_id: ObjectId) -> Result<bool, ApiError> {
        Ok(self.state.lock().unwrap().destinations.contains(&destination_id))
    }

    async fn insert_reply(&self, reply: &Reply) -> Result<Option<ObjectId>, ApiError> {
        let id = ObjectId::new();
        let mut stored = reply.clone();
        stored.id = Some(id);
        self.state.lock().unwrap().replies.insert(id, stored);
        Ok(Some(id))
    }

    async fn find_reply(
        &self,
        post_id: ObjectId,
        reply_id: ObjectId,
    ) -> Result<Option<Reply>, ApiError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .replies
            .get(&reply_id)
            .filter(|reply| reply.post_id == post_id)
            .cloned())
    }

    async fn delete_reply(&self, reply_id: ObjectId, user_id: ObjectId) -> Result<bool, ApiError> {
        let mut state = self.state.lock().unwrap();
        let authored = state.replies.get(&reply_id).map(|reply| reply.user_id) == Some(user_id);
        if authored {
            state.replies.remove(&reply_id);
        }
        Ok(authored)
    }

    async fn adjust_replies_count(&self, post_id: ObjectId, delta: i64) -> Result<(), ApiError> {
        self.counters_down()?;
        let mut state = self.state.lock().unwrap();
        if let Some(count) = state.posts.get_mut(&post_id) {
            if *count + delta >= 0 {
                *count += delta;
            }
        }
        Ok(())
    }

    async fn insert_bookmark(&self, bookmark: &Bookmark) -> Result<Option<ObjectId>, ApiError> {
        let mut state = self.state.lock().unwrap();
        if state
            .bookmarks
            .insert((bookmark.user_id, bookmark.destination_id))
        {
            Ok(Some(ObjectId::new()))
        } else {
            Ok(None)
        }
    }

    async fn delete_bookmark(
        &self,
        user_id: ObjectId,
        destination_id: ObjectId,
    ) -> Result<bool, ApiError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .bookmarks
            .remove(&(user_id, destination_id)))
    }
}
