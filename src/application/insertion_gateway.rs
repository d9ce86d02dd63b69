//! Submission of user-entered products to the remote service

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};

use super::shared_state::{InsertOutcome, SharedState};
use crate::domain::{Product, ProductForm};
use crate::infrastructure::{DiscountApi, RemoteError};

#[derive(Error, Debug)]
pub enum InsertionError {
    #[error("Please enter a valid price (got '{input}')")]
    InvalidPrice { input: String },

    #[error("Failed to insert product: {0}")]
    Remote(#[from] RemoteError),

    #[error("Sync session has been shut down")]
    ShutDown,
}

impl InsertionError {
    /// Validation failures are the user's to fix; nothing was sent.
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidPrice { .. })
    }
}

pub struct InsertionGateway {
    api: Arc<dyn DiscountApi>,
    state: Arc<SharedState>,
}

impl InsertionGateway {
    pub fn new(api: Arc<dyn DiscountApi>, state: Arc<SharedState>) -> Self {
        Self { api, state }
    }

    /// Validate and submit the form.
    ///
    /// On success the echoed product is prepended to the store, the list is
    /// persisted and the form is reset. On any failure the form is left as
    /// it was so the same input can be submitted again.
    pub async fn submit(&self, form: &mut ProductForm) -> Result<Product, InsertionError> {
        if self.state.is_closed() {
            return Err(InsertionError::ShutDown);
        }

        let Some(product) = form.to_product() else {
            warn!("Rejected product form: invalid price {:?}", form.price);
            return Err(InsertionError::InvalidPrice {
                input: form.price.clone(),
            });
        };

        let echoed = match self.api.insert(&product).await {
            Ok(echoed) => echoed,
            Err(e) => {
                error!("Error inserting product {}: {}", product.code, e);
                return Err(e.into());
            }
        };

        if self.state.insert_product(echoed.clone()).await == InsertOutcome::Closed {
            return Err(InsertionError::ShutDown);
        }
        info!("Product inserted: {} ({})", echoed.name, echoed.code);
        form.reset();
        Ok(echoed)
    }
}
