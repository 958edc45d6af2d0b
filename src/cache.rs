use crate::hierarchy::{ElementKey, RigHierarchyAccess};

///
/// Memoized resolution of an `ElementKey` to an element index.
///
/// The handle remembers the last key, the index it resolved to and the topology
/// version of the hierarchy at that time. Each `update_cache` call re-validates
/// the memo cheaply and only searches the hierarchy again when the key or the
/// hierarchy topology changed. Call `reset` on re-initialization.
///
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CachedElement {
    key: Option<ElementKey>,
    index: Option<usize>,
    version: u32,
}

impl CachedElement {
    #[inline]
    pub fn new() -> CachedElement {
        return CachedElement::default();
    }

    /// Forgets the memoized key and index.
    #[inline]
    pub fn reset(&mut self) {
        self.key = None;
        self.index = None;
        self.version = 0;
    }

    /// Whether the last `update_cache` found an element.
    #[inline]
    pub fn is_valid(&self) -> bool {
        return self.index.is_some();
    }

    /// Gets the memoized index, `None` if unresolved.
    #[inline]
    pub fn index(&self) -> Option<usize> {
        return self.index;
    }

    /// Gets the memoized key.
    #[inline]
    pub fn key(&self) -> Option<&ElementKey> {
        return self.key.as_ref();
    }

    /// Makes sure the handle points at the element of `key` in `hierarchy`.
    ///
    /// Returns `true` if such element exists.
    pub fn update_cache<H>(&mut self, key: &ElementKey, hierarchy: &H) -> bool
    where
        H: RigHierarchyAccess + ?Sized,
    {
        let same_key = self.key.as_ref() == Some(key);
        if same_key && self.version == hierarchy.topology_version() {
            if let Some(index) = self.index {
                if hierarchy.contains_at(index, key) {
                    return true;
                }
            }
        }

        if !same_key {
            self.key = Some(key.clone());
        }
        self.version = hierarchy.topology_version();
        self.index = match key.is_valid() {
            true => hierarchy.index_of(key),
            false => None,
        };
        return self.index.is_some();
    }

    /// Same as `update_cache`, `None` means world space and always resets the handle.
    pub fn update_space<H>(&mut self, space: Option<&ElementKey>, hierarchy: &H) -> bool
    where
        H: RigHierarchyAccess + ?Sized,
    {
        return match space {
            Some(key) => self.update_cache(key, hierarchy),
            None => {
                self.reset();
                false
            }
        };
    }
}
