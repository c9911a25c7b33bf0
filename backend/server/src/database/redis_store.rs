use async_trait::async_trait;
use redis::{
    AsyncCommands, Client, Script,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use tracing::info;

use super::{Backend, Record, StoreError};

// KEYS[1] documents hash, KEYS[2] versions hash
// ARGV[1] key, ARGV[2] expected version, ARGV[3] body
const PUT_IF_VERSION: &str = r"
local current = tonumber(redis.call('HGET', KEYS[2], ARGV[1]) or '0')
if current ~= tonumber(ARGV[2]) then
    return 0
end
redis.call('HSET', KEYS[1], ARGV[1], ARGV[3])
redis.call('HSET', KEYS[2], ARGV[1], current + 1)
return 1
";

// KEYS[1] index hash
// ARGV[1] value to drop
const RELEASE_VALUE: &str = r"
local entries = redis.call('HGETALL', KEYS[1])
local removed = 0
for i = 1, #entries, 2 do
    if entries[i + 1] == ARGV[1] then
        redis.call('HDEL', KEYS[1], entries[i])
        removed = removed + 1
    end
end
return removed
";

pub async fn init_redis(redis_url: &str) -> Result<ConnectionManager, StoreError> {
    let config = ConnectionManagerConfig::new().set_number_of_retries(1);

    let client = Client::open(redis_url)?;
    let connection_manager = client.get_connection_manager_with_config(config).await?;

    info!("Connected to Redis at {redis_url}");

    Ok(connection_manager)
}

fn version_key(collection: &str) -> String {
    format!("{collection}:version")
}

pub struct RedisBackend {
    connection: ConnectionManager,
    put_script: Script,
    release_script: Script,
}

impl RedisBackend {
    pub fn new(connection: ConnectionManager) -> Self {
        Self {
            connection,
            put_script: Script::new(PUT_IF_VERSION),
            release_script: Script::new(RELEASE_VALUE),
        }
    }
}

#[async_trait]
impl Backend for RedisBackend {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Record>, StoreError> {
        let mut connection = self.connection.clone();

        let (body, version): (Option<String>, Option<u64>) = redis::pipe()
            .atomic()
            .hget(collection, key)
            .hget(version_key(collection), key)
            .query_async(&mut connection)
            .await?;

        Ok(body.map(|body| Record {
            version: version.unwrap_or(0),
            body,
        }))
    }

    async fn values(&self, collection: &str) -> Result<Vec<String>, StoreError> {
        let mut connection = self.connection.clone();

        Ok(connection.hvals(collection).await?)
    }

    async fn put(
        &self,
        collection: &str,
        key: &str,
        expected: u64,
        body: String,
    ) -> Result<bool, StoreError> {
        let mut connection = self.connection.clone();

        let written: i64 = self
            .put_script
            .key(collection)
            .key(version_key(collection))
            .arg(key)
            .arg(expected)
            .arg(body)
            .invoke_async(&mut connection)
            .await?;

        Ok(written == 1)
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<bool, StoreError> {
        let mut connection = self.connection.clone();

        let (removed, _): (i64, i64) = redis::pipe()
            .atomic()
            .hdel(collection, key)
            .hdel(version_key(collection), key)
            .query_async(&mut connection)
            .await?;

        Ok(removed > 0)
    }

    async fn claim(&self, index: &str, key: &str, value: &str) -> Result<bool, StoreError> {
        let mut connection = self.connection.clone();

        Ok(connection.hset_nx(index, key, value).await?)
    }

    async fn lookup(&self, index: &str, key: &str) -> Result<Option<String>, StoreError> {
        let mut connection = self.connection.clone();

        Ok(connection.hget(index, key).await?)
    }

    async fn release(&self, index: &str, key: &str) -> Result<(), StoreError> {
        let mut connection = self.connection.clone();

        let _: i64 = connection.hdel(index, key).await?;
        Ok(())
    }

    async fn release_value(&self, index: &str, value: &str) -> Result<u64, StoreError> {
        let mut connection = self.connection.clone();

        Ok(self
            .release_script
            .key(index)
            .arg(value)
            .invoke_async(&mut connection)
            .await?)
    }
}
