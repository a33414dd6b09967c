//! File actions.
//!
//! The deletion phase consumes the persisted duplicate list and removes each
//! listed path, either permanently (default) or via the platform trash.
//!
//! ```no_run
//! use dupesweep::actions::{delete_from_list, DeleteConfig, NoProgress};
//! use std::path::Path;
//!
//! let result =
//!     delete_from_list::<NoProgress>(Path::new("duplicate_files.txt"), &DeleteConfig::trash(), None);
//! ```

pub mod delete;

pub use delete::{
    delete_batch, delete_from_list, delete_to_trash, permanent_delete, BatchDeleteResult,
    DeleteConfig, DeleteError, DeleteMode, DeleteProgressCallback, DeleteResult, NoProgress,
};
