pub mod retry;

use mongodb::{
    bson::doc,
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client, Collection,
};

use crate::{config::Config, errors::AppResult};

/// Pool bounds and timeouts from configuration; a minimum above the maximum
/// is clamped down.
pub fn apply_pool_settings(options: &mut ClientOptions, config: &Config) {
    let max_pool_size = config.mongo_max_pool_size.max(1);
    options.server_api = Some(ServerApi::builder().version(ServerApiVersion::V1).build());
    options.max_pool_size = Some(max_pool_size);
    options.min_pool_size = Some(config.mongo_min_pool_size.min(max_pool_size));
    options.connect_timeout = Some(config.mongo_connect_timeout());
    options.server_selection_timeout = Some(config.mongo_connect_timeout());
}

#[derive(Clone)]
pub struct Database {
    client: Client,
    db_name: String,
}

impl Database {
    pub async fn connect(config: &Config) -> AppResult<Self> {
        let mut client_options = ClientOptions::parse(&config.mongo_conn_string).await?;
        apply_pool_settings(&mut client_options, config);

        let client = Client::with_options(client_options)?;

        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;

        log::info!(
            "Connected to MongoDB database '{}' (pool {}..={})",
            config.mongo_db_name,
            config.mongo_min_pool_size,
            config.mongo_max_pool_size
        );

        Ok(Self {
            client,
            db_name: config.mongo_db_name.clone(),
        })
    }

    pub fn get_collection<T>(&self, collection_name: &str) -> Collection<T>
    where
        T: Send + Sync,
    {
        self.client
            .database(&self.db_name)
            .collection(collection_name)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}
