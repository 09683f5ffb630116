use thiserror::Error;

use datamap_io::LoadError;
use datamap_render::ViewError;

#[derive(Error, Debug)]
pub enum DataMapError {
    #[error("View error: {0}")]
    View(#[from] ViewError),

    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("DataMap lock poisoned by a panicking writer")]
    LockPoisoned,
}
