use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

/// A thread-safe, reference-counted resource container with read-write locking.
///
/// `MtResource` provides synchronized access to a value of type `T` that can be shared
/// across threads. It uses an `Arc<RwLock<T>>` internally to manage concurrent access.
/// Chunks live in one of these so that mesh builds for different chunks can read
/// each other's border blocks while edits take the exclusive side of the lock.
///
/// # Examples
///
/// ```
/// use voxel_mesher::core::MtResource;
///
/// let counter = MtResource::new(0);
/// *counter.get_mut() += 1;
/// assert_eq!(*counter.get(), 1);
/// ```
///
/// # Performance Considerations
/// - Read operations (`get()`) can occur concurrently
/// - Write operations (`get_mut()`) are exclusive and will block other operations
pub struct MtResource<T: Send + Sync> {
    resource: Arc<RwLock<T>>,
}

impl<T: Send + Sync + 'static> MtResource<T> {
    /// Creates a new `MtResource` containing the given value.
    pub fn new(resource: T) -> Self {
        Self {
            resource: Arc::new(RwLock::new(resource)),
        }
    }

    /// Returns a read-only guard that allows reading the contained value.
    ///
    /// # Panics
    /// Panics if the lock is poisoned, which only happens after another thread
    /// panicked while holding the write guard.
    pub fn get(&self) -> RwLockReadGuard<'_, T> {
        self.resource.read().expect("resource lock poisoned")
    }

    /// Returns a mutable guard that allows modifying the contained value.
    ///
    /// # Panics
    /// Panics if the lock is poisoned.
    pub fn get_mut(&self) -> RwLockWriteGuard<'_, T> {
        self.resource.write().expect("resource lock poisoned")
    }

    /// Creates a non-owning handle to this resource.
    ///
    /// The handle does not keep the value alive; once every `MtResource` clone is
    /// dropped, [`WeakMtResource::upgrade`] returns `None`.
    pub fn downgrade(&self) -> WeakMtResource<T> {
        WeakMtResource {
            resource: Arc::downgrade(&self.resource),
        }
    }

    /// Returns `true` if both handles point at the same allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.resource, &other.resource)
    }
}

impl<T: Send + Sync> Clone for MtResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}

/// A weak counterpart of [`MtResource`].
///
/// Used for links that must never own their target, such as a chunk's reference
/// to its horizontal neighbors.
pub struct WeakMtResource<T: Send + Sync> {
    resource: Weak<RwLock<T>>,
}

impl<T: Send + Sync + 'static> WeakMtResource<T> {
    /// Attempts to recover a strong handle. Returns `None` if the resource was dropped.
    pub fn upgrade(&self) -> Option<MtResource<T>> {
        self.resource
            .upgrade()
            .map(|resource| MtResource { resource })
    }
}

impl<T: Send + Sync> Clone for WeakMtResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn shared_between_threads() {
        let counter = MtResource::new(0);
        let counter_clone = counter.clone();

        let handle = thread::spawn(move || {
            *counter_clone.get_mut() += 1;
        });

        handle.join().unwrap();
        assert_eq!(*counter.get(), 1);
    }

    #[test]
    fn weak_handle_resolves_to_none_after_drop() {
        let resource = MtResource::new(String::from("chunk"));
        let weak = resource.downgrade();
        assert!(weak.upgrade().is_some());
        assert!(weak.upgrade().unwrap().ptr_eq(&resource));

        drop(resource);
        assert!(weak.upgrade().is_none());
    }
}
