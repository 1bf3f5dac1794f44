//! Index provisioning.
//!
//! Two separate operations with different blast radius:
//! - [`provision_if_absent`] never touches an existing index.
//! - [`recreate_index`] deletes whatever is there first and loses its data.

use crate::backends::SearchBackend;
use crate::error::{Error, Result};
use crate::schema::IndexConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    Created,
    /// The index was already there and was left untouched
    AlreadyExists,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecreateOutcome {
    /// Whether an existing index (and its documents) was deleted
    pub deleted_existing: bool,
}

/// Create the index unless it exists. Reports which of the two happened.
pub async fn provision_if_absent(
    backend: &dyn SearchBackend,
    index: &str,
    config: &IndexConfig,
) -> Result<ProvisionOutcome> {
    match backend.create_index(index, config).await {
        Ok(()) => {
            tracing::info!("Provisioned index {}", index);
            Ok(ProvisionOutcome::Created)
        }
        Err(Error::IndexAlreadyExists(_)) => {
            tracing::info!("Index {} already exists, leaving it untouched", index);
            Ok(ProvisionOutcome::AlreadyExists)
        }
        Err(e) => Err(e),
    }
}

/// Delete the index if present, then create it from `config`.
pub async fn recreate_index(
    backend: &dyn SearchBackend,
    index: &str,
    config: &IndexConfig,
) -> Result<RecreateOutcome> {
    let deleted_existing = match backend.delete_index(index).await {
        Ok(()) => {
            tracing::warn!("Deleted existing index {} and all of its documents", index);
            true
        }
        Err(Error::NotFound(_)) => false,
        Err(e) => return Err(e),
    };

    backend.create_index(index, config).await?;
    tracing::info!("Recreated index {}", index);
    Ok(RecreateOutcome { deleted_existing })
}
