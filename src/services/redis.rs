//! Redis service for password reset tokens

use redis::{AsyncCommands, Client};

use crate::error::{AppError, AppResult};

const RESET_TOKEN_PREFIX: &str = "password_reset";

#[derive(Clone)]
pub struct RedisService {
    client: Client,
}

impl RedisService {
    /// Create a client without connecting. Connections are opened per call.
    pub fn new(url: &str) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;
        Ok(Self { client })
    }

    /// Create a client and check that the server answers
    pub async fn connect(url: &str) -> AppResult<Self> {
        let service = Self::new(url)?;
        service.ping().await?;
        Ok(service)
    }

    pub async fn ping(&self) -> AppResult<()> {
        let mut conn = self.get_connection().await?;
        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;
        Ok(())
    }

    /// Store the email a reset token belongs to, keyed by the token digest
    pub async fn store_reset_token(&self, token_digest: &str, email: &str, ttl_seconds: u64) -> AppResult<()> {
        let mut conn = self.get_connection().await?;
        conn.set_ex::<_, _, ()>(reset_key(token_digest), email, ttl_seconds)
            .await?;
        Ok(())
    }

    /// Fetch and delete the email for a reset token in one transaction
    pub async fn take_reset_token(&self, token_digest: &str) -> AppResult<Option<String>> {
        let mut conn = self.get_connection().await?;
        let key = reset_key(token_digest);
        let (email, _deleted): (Option<String>, i64) = redis::pipe()
            .atomic()
            .get(&key)
            .del(&key)
            .query_async(&mut conn)
            .await?;
        Ok(email)
    }

    /// Get a Redis connection
    pub async fn get_connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get Redis connection: {}", e)))
    }
}

fn reset_key(token_digest: &str) -> String {
    format!("{}:{}", RESET_TOKEN_PREFIX, token_digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_is_created_without_connecting() {
        assert!(RedisService::new("redis://127.0.0.1:1").is_ok());
        assert!(RedisService::new("not a url").is_err());
    }

    #[test]
    fn reset_keys_are_namespaced() {
        assert_eq!(reset_key("abc"), "password_reset:abc");
    }
}
