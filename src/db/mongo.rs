use std::time::Duration;

use mongodb::{
    bson::{doc, Document},
    options::{ClientOptions, IndexOptions, ServerApi, ServerApiVersion},
    Client, Database, IndexModel,
};

pub const USERS: &str = "Users";
pub const DESTINATIONS: &str = "Destinations";
pub const SEASONAL_WEATHER: &str = "SeasonalWeather";
pub const TIPS: &str = "Tips";
pub const POSTS: &str = "Posts";
pub const REPLIES: &str = "Replies";
pub const VOTES: &str = "Votes";
pub const BOOKMARKS: &str = "Bookmarks";
pub const TRAVEL_PLANS: &str = "TravelPlans";

pub async fn create_mongo_client(uri: &str) -> mongodb::error::Result<Client> {
    log::info!("Connecting to MongoDB");

    let mut client_options = ClientOptions::parse(uri).await?;

    client_options.connect_timeout = Some(Duration::from_secs(10));
    client_options.server_selection_timeout = Some(Duration::from_secs(10));
    client_options.max_pool_size = Some(10);
    client_options.min_pool_size = Some(1);

    // Stable API, MongoDB 5.0+
    let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
    client_options.server_api = Some(server_api);

    let client = Client::with_options(client_options)?;

    match client
        .database("admin")
        .run_command(doc! {"ping": 1})
        .await
    {
        Ok(_) => log::info!("Connected to MongoDB and verified with ping"),
        Err(e) => {
            log::warn!("Connected to MongoDB but ping failed: {}", e);
            log::warn!(
                "The API may still start, but requests will fail until the database is reachable"
            );
        }
    }

    Ok(client)
}

fn unique_index(keys: Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

fn plain_index(keys: Document) -> IndexModel {
    IndexModel::builder().keys(keys).build()
}

/// Create the indexes the API relies on. Unique indexes back the
/// one-vote-per-user and one-bookmark-per-destination rules.
pub async fn ensure_indexes(db: &Database) -> mongodb::error::Result<()> {
    db.collection::<Document>(USERS)
        .create_index(unique_index(doc! { "email": 1 }))
        .await?;
    db.collection::<Document>(VOTES)
        .create_index(unique_index(doc! { "user_id": 1, "target_id": 1 }))
        .await?;
    db.collection::<Document>(BOOKMARKS)
        .create_index(unique_index(doc! { "user_id": 1, "destination_id": 1 }))
        .await?;
    db.collection::<Document>(SEASONAL_WEATHER)
        .create_index(unique_index(doc! { "destination_id": 1, "season": 1 }))
        .await?;
    db.collection::<Document>(TIPS)
        .create_index(plain_index(doc! { "destination_id": 1, "upvotes": -1 }))
        .await?;
    db.collection::<Document>(REPLIES)
        .create_index(plain_index(doc! { "post_id": 1 }))
        .await?;

    log::info!("MongoDB indexes ensured");
    Ok(())
}
