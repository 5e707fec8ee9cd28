//! Single-owner cart service.
//!
//! A tokio task owns the cart. Handles send it commands over an unbounded
//! channel and await the reply on a oneshot. Because one task applies every
//! mutation in arrival order, concurrent increments from different widgets
//! cannot overwrite each other. Each mutation is persisted, published to the
//! snapshot channel, and announced to observers before its reply is sent.

use std::sync::Arc;

use pshowcase_core::{Cart, Product, ProductId, QuantityDelta};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, instrument, warn};

use super::signal::{CartObserver, Observers, Subscription, SubscriptionId};
use super::{CartError, CartStore};

type Reply<T> = oneshot::Sender<T>;

/// A request to the cart service.
pub(crate) enum Command {
    Adjust {
        product: Box<Product>,
        delta: QuantityDelta,
        reply: Reply<Result<Cart, CartError>>,
    },
    Remove {
        id: ProductId,
        reply: Reply<Result<Cart, CartError>>,
    },
    Clear {
        reply: Reply<Result<Cart, CartError>>,
    },
    Reload {
        reply: Reply<Cart>,
    },
    Subscribe {
        observer: Arc<dyn CartObserver>,
        reply: Reply<SubscriptionId>,
    },
    Unsubscribe {
        id: SubscriptionId,
    },
}

/// The task that owns the cart.
pub struct CartService {
    store: CartStore,
    snapshot: watch::Sender<Cart>,
    observers: Observers,
}

impl CartService {
    /// Load the persisted cart and start the service task.
    ///
    /// The task stops once every [`CartHandle`] and [`Subscription`] has been
    /// dropped. Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn(store: CartStore) -> CartHandle {
        let initial = store.load();
        debug!(lines = initial.len(), "Starting cart service");

        let (snapshot, snapshot_rx) = watch::channel(initial);
        let (commands, commands_rx) = mpsc::unbounded_channel();

        let service = Self {
            store,
            snapshot,
            observers: Observers::default(),
        };
        tokio::spawn(service.run(commands_rx));

        CartHandle {
            commands,
            reader: CartReader {
                snapshot: snapshot_rx,
            },
        }
    }

    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        while let Some(command) = commands.recv().await {
            self.handle(command);
        }
        debug!("Cart service stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Adjust {
                product,
                delta,
                reply,
            } => {
                let result = self.commit(|cart| cart.adjust_quantity(&product, delta));
                let _ = reply.send(result);
            }
            Command::Remove { id, reply } => {
                let result = self.commit(|cart| cart.remove_line(id));
                let _ = reply.send(result);
            }
            Command::Clear { reply } => {
                let result = self.commit(|_| Cart::new());
                let _ = reply.send(result);
            }
            Command::Reload { reply } => {
                let cart = self.store.load();
                self.publish(cart.clone());
                let _ = reply.send(cart);
            }
            Command::Subscribe { observer, reply } => {
                let id = self.observers.subscribe(observer);
                debug!(?id, observers = self.observers.len(), "Observer subscribed");
                let _ = reply.send(id);
            }
            Command::Unsubscribe { id } => {
                if self.observers.unsubscribe(id) {
                    debug!(?id, observers = self.observers.len(), "Observer unsubscribed");
                }
            }
        }
    }

    /// Apply `change` to the current cart, persist it and publish it.
    ///
    /// On a failed write the published cart is left untouched and no signal
    /// is sent.
    fn commit(&mut self, change: impl FnOnce(Cart) -> Cart) -> Result<Cart, CartError> {
        let current = self.snapshot.borrow().clone();
        let saved = self.store.save(change(current)).inspect_err(|e| {
            warn!(error = %e, "Failed to persist cart");
        })?;
        self.publish(saved.clone());
        Ok(saved)
    }

    fn publish(&self, cart: Cart) {
        self.snapshot.send_replace(cart);
        self.observers.notify();
    }
}

/// Synchronous read access to the latest published cart.
#[derive(Clone)]
pub struct CartReader {
    snapshot: watch::Receiver<Cart>,
}

impl CartReader {
    /// The cart as of the last completed mutation.
    #[must_use]
    pub fn load(&self) -> Cart {
        self.snapshot.borrow().clone()
    }
}

/// Cheaply cloneable handle to the cart service.
#[derive(Clone)]
pub struct CartHandle {
    commands: mpsc::UnboundedSender<Command>,
    reader: CartReader,
}

impl CartHandle {
    /// Add or remove one unit of `product`.
    ///
    /// A line that reaches 0 is removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted or the service stopped.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn adjust(&self, product: &Product, delta: QuantityDelta) -> Result<Cart, CartError> {
        self.request(|reply| Command::Adjust {
            product: Box::new(product.clone()),
            delta,
            reply,
        })
        .await?
    }

    /// Drop a product's line entirely.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted or the service stopped.
    #[instrument(skip(self))]
    pub async fn remove(&self, id: ProductId) -> Result<Cart, CartError> {
        self.request(|reply| Command::Remove { id, reply }).await?
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted or the service stopped.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<Cart, CartError> {
        self.request(|reply| Command::Clear { reply }).await?
    }

    /// Re-read the persisted cart and signal every observer.
    ///
    /// # Errors
    ///
    /// Returns an error if the service stopped.
    pub async fn reload(&self) -> Result<Cart, CartError> {
        self.request(|reply| Command::Reload { reply }).await
    }

    /// Register an observer for the change signal.
    ///
    /// # Errors
    ///
    /// Returns an error if the service stopped.
    pub async fn subscribe(
        &self,
        observer: Arc<dyn CartObserver>,
    ) -> Result<Subscription, CartError> {
        let id = self
            .request(|reply| Command::Subscribe { observer, reply })
            .await?;
        Ok(Subscription::new(id, self.commands.clone()))
    }

    /// A reader for the published cart.
    #[must_use]
    pub fn reader(&self) -> CartReader {
        self.reader.clone()
    }

    /// The cart as of the last completed mutation.
    #[must_use]
    pub fn snapshot(&self) -> Cart {
        self.reader.load()
    }

    async fn request<T>(&self, build: impl FnOnce(Reply<T>) -> Command) -> Result<T, CartError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(build(reply))
            .map_err(|_| CartError::Closed)?;
        response.await.map_err(|_| CartError::Closed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pshowcase_core::{Price, Rating};

    use super::*;
    use crate::storage::{CART_KEY, KeyValueStore, MemoryStore, StorageError};

    fn product(id: i32, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            price: Price::from_cents(cents),
            description: String::new(),
            category: "misc".to_string(),
            image: String::new(),
            rating: Rating::default(),
            quantity: 0,
        }
    }

    #[derive(Default)]
    struct Counter(AtomicUsize);

    impl CartObserver for Counter {
        fn cart_changed(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io {
                path: "readonly".into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.set(key, "")
        }
    }

    fn spawn_memory() -> (Arc<MemoryStore>, CartHandle) {
        let storage = Arc::new(MemoryStore::new());
        let handle = CartService::spawn(CartStore::new(storage.clone()));
        (storage, handle)
    }

    #[tokio::test]
    async fn test_adjust_persists_and_publishes() {
        let (storage, cart) = spawn_memory();
        let item = product(1, 999);

        cart.adjust(&item, QuantityDelta::Increment).await.unwrap();
        let updated = cart.adjust(&item, QuantityDelta::Increment).await.unwrap();

        assert_eq!(updated.quantity_of(item.id), 2);
        assert_eq!(cart.snapshot(), updated);
        let persisted: Cart = serde_json::from_str(&storage.get(CART_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(persisted, updated);
    }

    #[tokio::test]
    async fn test_starts_from_persisted_cart() {
        let storage = Arc::new(MemoryStore::new());
        storage
            .set(CART_KEY, r#"[{"id":4,"title":"Ring","price":"5.00","quantity":3}]"#)
            .unwrap();

        let cart = CartService::spawn(CartStore::new(storage));
        assert_eq!(cart.snapshot().quantity_of(ProductId::new(4)), 3);
    }

    #[tokio::test]
    async fn test_decrement_to_zero_removes_line() {
        let (_, cart) = spawn_memory();
        let item = product(1, 999);

        cart.adjust(&item, QuantityDelta::Increment).await.unwrap();
        let updated = cart.adjust(&item, QuantityDelta::Decrement).await.unwrap();

        assert!(updated.is_empty());
        assert!(cart.snapshot().get(item.id).is_none());
    }

    #[tokio::test]
    async fn test_observers_signalled_until_dropped() {
        let (_, cart) = spawn_memory();
        let counter = Arc::new(Counter::default());
        let subscription = cart.subscribe(counter.clone()).await.unwrap();

        cart.adjust(&product(1, 100), QuantityDelta::Increment)
            .await
            .unwrap();
        cart.remove(ProductId::new(1)).await.unwrap();
        assert_eq!(counter.0.load(Ordering::SeqCst), 2);

        drop(subscription);
        cart.clear().await.unwrap();
        assert_eq!(counter.0.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_increments_are_not_lost() {
        let (_, cart) = spawn_memory();
        let item = product(7, 250);

        let tasks: Vec<_> = (0..50)
            .map(|_| {
                let cart = cart.clone();
                let item = item.clone();
                tokio::spawn(async move { cart.adjust(&item, QuantityDelta::Increment).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(cart.snapshot().quantity_of(item.id), 50);
        assert_eq!(cart.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_snapshot_and_skips_signal() {
        let cart = CartService::spawn(CartStore::new(Arc::new(ReadOnlyStore)));
        let counter = Arc::new(Counter::default());
        let _subscription = cart.subscribe(counter.clone()).await.unwrap();

        let result = cart.adjust(&product(1, 100), QuantityDelta::Increment).await;

        assert!(matches!(result, Err(CartError::Storage(_))));
        assert!(cart.snapshot().is_empty());
        assert_eq!(counter.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_reload_picks_up_external_writes() {
        let (storage, cart) = spawn_memory();
        let counter = Arc::new(Counter::default());
        let _subscription = cart.subscribe(counter.clone()).await.unwrap();

        storage
            .set(CART_KEY, r#"[{"id":2,"title":"Mug","price":"3.50","quantity":1}]"#)
            .unwrap();
        let reloaded = cart.reload().await.unwrap();

        assert_eq!(reloaded.quantity_of(ProductId::new(2)), 1);
        assert_eq!(cart.snapshot(), reloaded);
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
    }
}
