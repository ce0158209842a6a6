use crate::model::{Product, User};
use crate::server::{ResourceServer, ServerClient, ServerConfig, ServerError};
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info};

/// Id of the user the demo treats as logged in.
pub const CURRENT_USER_ID: u32 = 1;

/// The demo's "remote" side: one server per record type, seeded with sample data.
///
/// # Example
///
/// ```ignore
/// let system = DemoSystem::new(ServerConfig::default());
/// system.seed().await?;
///
/// let loader = ResourceLoader::new("user", system.user_client.clone());
/// // ... render ...
///
/// system.shutdown().await?;
/// ```
pub struct DemoSystem {
    pub user_client: ServerClient<User>,
    pub product_client: ServerClient<Product>,
    handles: Vec<JoinHandle<()>>,
}

impl DemoSystem {
    /// Spawns the servers. Must be called inside a Tokio runtime.
    pub fn new(config: ServerConfig) -> Self {
        let (user_server, user_client) = ResourceServer::<User>::new(config);
        let (product_server, product_client) = ResourceServer::<Product>::new(config);

        let handles = vec![
            tokio::spawn(user_server.run()),
            tokio::spawn(product_server.run()),
        ];

        Self {
            user_client,
            product_client,
            handles,
        }
    }

    /// Inserts the sample users and products.
    pub async fn seed(&self) -> Result<(), ServerError> {
        for user in sample_users() {
            self.user_client.insert(user).await?;
        }
        for product in sample_products() {
            self.product_client.insert(product).await?;
        }
        info!("Sample data seeded");
        Ok(())
    }

    /// Drops the clients and waits for every server to drain and stop.
    ///
    /// Servers only stop once *all* clients are gone, including clones held by bindings.
    pub async fn shutdown(self) -> Result<(), JoinError> {
        info!("Shutting down servers...");
        drop(self.user_client);
        drop(self.product_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Server task failed");
                return Err(e);
            }
        }

        info!("Shutdown complete.");
        Ok(())
    }
}

pub fn sample_users() -> Vec<User> {
    vec![
        User::new(1, "Sarah Waters", 55, "brown").with_hobbies(["swimming", "bicycling", "video games"]),
        User::new(2, "Brenda Smith", 33, "black").with_hobbies(["golf", "mathematics"]),
        User::new(3, "Jane Garcia", 27, "blonde").with_hobbies(["biology", "medicine", "gymnastics"]),
    ]
}

pub fn sample_products() -> Vec<Product> {
    vec![
        Product::new(1, "Flat-Screen TV", 30000)
            .with_description("Huge LCD screen, a great deal")
            .with_rating(4.5),
        Product::new(2, "Basketball", 1000)
            .with_description("Just like the pros use")
            .with_rating(3.8),
        Product::new(3, "Running Shoes", 12000)
            .with_description("State-of-the-art technology for optimum running")
            .with_rating(4.2),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::Fetch;

    #[tokio::test]
    async fn test_seed_and_shutdown() {
        let system = DemoSystem::new(ServerConfig::default());
        system.seed().await.unwrap();
        assert_eq!(
            system.user_client.read(&CURRENT_USER_ID).await.unwrap().name,
            "Sarah Waters"
        );
        assert_eq!(system.product_client.read(&3).await.unwrap().price(), "$120.00");
        system.shutdown().await.unwrap();
    }
}
