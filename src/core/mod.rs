//! # Core Module
//!
//! This module provides the shared-ownership primitives used throughout the
//! engine.
//!
//! ## Key Components
//! - `MtResource`: Thread-safe reference-counted resource with read-write locking
//! - `WeakMtResource`: Non-owning handle to an `MtResource`, resolved on use
//!
//! ## Usage
//! ```rust
//! use voxel_mesher::core::MtResource;
//!
//! let counter = MtResource::new(0);
//! let weak = counter.downgrade();
//! *weak.upgrade().unwrap().get_mut() += 1;
//! assert_eq!(*counter.get(), 1);
//! ```

pub mod mt_resource;

pub use mt_resource::{MtResource, WeakMtResource};
