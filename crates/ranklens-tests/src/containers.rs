//! Container management for integration tests.

use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;

/// A running Postgres container for tests.
pub struct PostgresContainer {
    #[allow(dead_code)] // Kept to maintain container lifetime
    container: ContainerAsync<Postgres>,
    pub connection_string: String,
}

impl PostgresContainer {
    /// Start a new Postgres container.
    pub async fn start() -> Self {
        let container = Postgres::default()
            .with_tag("16-alpine")
            .start()
            .await
            .expect("Failed to start postgres container");

        let host = container.get_host().await.expect("Failed to get host");
        let port = container
            .get_host_port_ipv4(5432)
            .await
            .expect("Failed to get port");

        let connection_string = format!("postgres://postgres:postgres@{host}:{port}/postgres");

        Self {
            container,
            connection_string,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_postgres_container_starts() {
        let postgres = PostgresContainer::start().await;
        assert!(postgres.connection_string.starts_with("postgres://"));
    }
}
