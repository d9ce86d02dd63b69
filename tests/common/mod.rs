//! Scripted remote service for engine tests
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex as StdMutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};
use tokio::time::Instant;

use discount_sync::domain::Product;
use discount_sync::infrastructure::{DiscountApi, RemoteError};

type ShortStep = (Duration, Result<Vec<Product>, RemoteError>);
type InsertStep = (Duration, Option<Result<Product, RemoteError>>);

/// Long polls block until a result is pushed; short polls pop scripted
/// steps and answer "nothing new" once the script is exhausted.
pub struct ScriptedApi {
    long_tx: mpsc::UnboundedSender<Result<u64, RemoteError>>,
    long_rx: Mutex<mpsc::UnboundedReceiver<Result<u64, RemoteError>>>,
    long_calls: StdMutex<Vec<Instant>>,
    short_script: StdMutex<VecDeque<ShortStep>>,
    short_calls: StdMutex<Vec<Instant>>,
    short_in_flight: AtomicUsize,
    short_max_in_flight: AtomicUsize,
    insert_script: StdMutex<VecDeque<InsertStep>>,
    inserted: StdMutex<Vec<Product>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        let (long_tx, long_rx) = mpsc::unbounded_channel();
        Self {
            long_tx,
            long_rx: Mutex::new(long_rx),
            long_calls: StdMutex::new(Vec::new()),
            short_script: StdMutex::new(VecDeque::new()),
            short_calls: StdMutex::new(Vec::new()),
            short_in_flight: AtomicUsize::new(0),
            short_max_in_flight: AtomicUsize::new(0),
            insert_script: StdMutex::new(VecDeque::new()),
            inserted: StdMutex::new(Vec::new()),
        }
    }

    pub fn push_long(&self, result: Result<u64, RemoteError>) {
        self.long_tx.send(result).unwrap();
    }

    pub fn push_short(&self, result: Result<Vec<Product>, RemoteError>) {
        self.push_short_delayed(Duration::ZERO, result);
    }

    pub fn push_short_delayed(&self, delay: Duration, result: Result<Vec<Product>, RemoteError>) {
        self.short_script.lock().unwrap().push_back((delay, result));
    }

    pub fn push_insert(&self, result: Result<Product, RemoteError>) {
        self.insert_script.lock().unwrap().push_back((Duration::ZERO, Some(result)));
    }

    /// Echo the submitted product after `delay`.
    pub fn push_insert_echo_delayed(&self, delay: Duration) {
        self.insert_script.lock().unwrap().push_back((delay, None));
    }

    pub fn long_calls(&self) -> Vec<Instant> {
        self.long_calls.lock().unwrap().clone()
    }

    pub fn short_calls(&self) -> Vec<Instant> {
        self.short_calls.lock().unwrap().clone()
    }

    pub fn short_max_in_flight(&self) -> usize {
        self.short_max_in_flight.load(Ordering::SeqCst)
    }

    pub fn inserted(&self) -> Vec<Product> {
        self.inserted.lock().unwrap().clone()
    }
}

#[async_trait]
impl DiscountApi for ScriptedApi {
    async fn long_poll(&self) -> Result<u64, RemoteError> {
        self.long_calls.lock().unwrap().push(Instant::now());
        let mut rx = self.long_rx.lock().await;
        match rx.recv().await {
            Some(result) => result,
            None => std::future::pending().await,
        }
    }

    async fn short_poll(&self) -> Result<Vec<Product>, RemoteError> {
        self.short_calls.lock().unwrap().push(Instant::now());
        let step = self.short_script.lock().unwrap().pop_front();
        let Some((delay, result)) = step else {
            return Ok(Vec::new());
        };

        let now = self.short_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.short_max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.short_in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn insert(&self, product: &Product) -> Result<Product, RemoteError> {
        self.inserted.lock().unwrap().push(product.clone());
        let step = self.insert_script.lock().unwrap().pop_front();
        let Some((delay, result)) = step else {
            return Ok(product.clone());
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        result.unwrap_or_else(|| Ok(product.clone()))
    }
}

pub fn transport_error(path: &str) -> RemoteError {
    RemoteError::Transport {
        url: format!("http://localhost:8080/{path}"),
        message: "connection refused".to_string(),
    }
}

pub fn product(code: &str) -> Product {
    Product::new(format!("product {code}"), 10.0, code, false)
}

pub fn codes(products: &[Product]) -> Vec<String> {
    products.iter().map(|p| p.code.clone()).collect()
}

/// Poll `condition` on the (paused) clock until it holds or 30s pass.
pub async fn wait_until<F: Fn() -> bool>(condition: F) {
    tokio::time::timeout(Duration::from_secs(30), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
