// SPDX-License-Identifier: Apache-2.0
// © The Patchbay Authors <https://github.com/patchbay-fbp/patchbay>
//! Path-copying helpers over `Arc`-shared ordered maps.
//!
//! Every container in the snapshot is an `Arc<BTreeMap<..>>`. An update
//! clones only the containers on the path from the root to the touched leaf
//! and bumps the reference count of everything else, so unmodified subtrees
//! keep their identity and a consumer can detect staleness with
//! `Arc::ptr_eq` instead of deep comparison.
//!
//! Removal helpers return `None` when the addressed entry is absent. Callers
//! then keep the previous `Arc` untouched, so an idempotent remove produces
//! no spurious "changed" signal. When a removal would leave an intermediate
//! container empty, the container itself is dropped from its parent instead
//! ("dissoc-and-clean"); the walk cascades bottom-up and stops at the first
//! container that retains an entry. Top-level category maps are owned by the
//! snapshot itself and are never pruned here.

use std::collections::BTreeMap;
use std::sync::Arc;

/// An immutable, structurally shared ordered map.
pub type Shared<K, V> = Arc<BTreeMap<K, V>>;

/// Returns a copy of `map` with `key` bound to `value`.
pub(crate) fn assoc<K, V>(map: &Shared<K, V>, key: K, value: V) -> Shared<K, V>
where
    K: Ord + Clone,
    V: Clone,
{
    let mut next = (**map).clone();
    next.insert(key, value);
    Arc::new(next)
}

/// Returns a copy of `map` without `key`, or `None` if `key` was absent.
pub(crate) fn dissoc<K, V>(map: &Shared<K, V>, key: &K) -> Option<Shared<K, V>>
where
    K: Ord + Clone,
    V: Clone,
{
    if !map.contains_key(key) {
        return None;
    }
    let mut next = (**map).clone();
    next.remove(key);
    Some(Arc::new(next))
}

/// Returns a copy of `map` with the entry at `key` replaced by `f`'s result.
///
/// `None` if the entry is absent or `f` declines the update (no change).
pub(crate) fn update<K, V>(
    map: &Shared<K, V>,
    key: &K,
    f: impl FnOnce(&V) -> Option<V>,
) -> Option<Shared<K, V>>
where
    K: Ord + Clone,
    V: Clone,
{
    let next_value = f(map.get(key)?)?;
    Some(assoc(map, key.clone(), next_value))
}

/// Binds a leaf two levels deep, creating the intermediate container on
/// demand.
pub(crate) fn assoc2<K1, K2, V>(
    root: &Shared<K1, Shared<K2, V>>,
    k1: &K1,
    k2: &K2,
    leaf: V,
) -> Shared<K1, Shared<K2, V>>
where
    K1: Ord + Clone,
    K2: Ord + Clone,
    V: Clone,
{
    let inner = root.get(k1).cloned().unwrap_or_default();
    assoc(root, k1.clone(), assoc(&inner, k2.clone(), leaf))
}

/// Removes a leaf two levels deep, pruning the intermediate container when
/// the removal empties it.
///
/// `None` if the path is absent.
pub(crate) fn dissoc2<K1, K2, V>(
    root: &Shared<K1, Shared<K2, V>>,
    k1: &K1,
    k2: &K2,
) -> Option<Shared<K1, Shared<K2, V>>>
where
    K1: Ord + Clone,
    K2: Ord + Clone,
    V: Clone,
{
    let inner = root.get(k1)?;
    if !inner.contains_key(k2) {
        return None;
    }
    if inner.len() < 2 {
        // Last entry: drop the whole container from the root.
        return dissoc(root, k1);
    }
    Some(assoc(root, k1.clone(), dissoc(inner, k2)?))
}

/// Reads a leaf two levels deep.
pub(crate) fn get2<'a, K1, K2, V>(
    root: &'a Shared<K1, Shared<K2, V>>,
    k1: &K1,
    k2: &K2,
) -> Option<&'a V>
where
    K1: Ord,
    K2: Ord,
{
    root.get(k1)?.get(k2)
}

/// Binds a leaf four levels deep, creating intermediate containers on
/// demand.
pub(crate) fn assoc4<K1, K2, K3, K4, V>(
    root: &Shared<K1, Shared<K2, Shared<K3, Shared<K4, V>>>>,
    k1: &K1,
    k2: &K2,
    k3: &K3,
    k4: &K4,
    leaf: V,
) -> Shared<K1, Shared<K2, Shared<K3, Shared<K4, V>>>>
where
    K1: Ord + Clone,
    K2: Ord + Clone,
    K3: Ord + Clone,
    K4: Ord + Clone,
    V: Clone,
{
    let l1 = root.get(k1).cloned().unwrap_or_default();
    let l2 = l1.get(k2).cloned().unwrap_or_default();
    let l3 = l2.get(k3).cloned().unwrap_or_default();
    let l3 = assoc(&l3, k4.clone(), leaf);
    let l2 = assoc(&l2, k3.clone(), l3);
    let l1 = assoc(&l1, k2.clone(), l2);
    assoc(root, k1.clone(), l1)
}

/// Removes a leaf four levels deep, pruning every intermediate container the
/// removal empties.
///
/// `None` if the path is absent.
pub(crate) fn dissoc4<K1, K2, K3, K4, V>(
    root: &Shared<K1, Shared<K2, Shared<K3, Shared<K4, V>>>>,
    k1: &K1,
    k2: &K2,
    k3: &K3,
    k4: &K4,
) -> Option<Shared<K1, Shared<K2, Shared<K3, Shared<K4, V>>>>>
where
    K1: Ord + Clone,
    K2: Ord + Clone,
    K3: Ord + Clone,
    K4: Ord + Clone,
    V: Clone,
{
    let l1 = root.get(k1)?;
    let l2 = l1.get(k2)?;
    let l3 = l2.get(k3)?;
    if !l3.contains_key(k4) {
        return None;
    }
    if l3.len() >= 2 {
        let l3 = dissoc(l3, k4)?;
        let l2 = assoc(l2, k3.clone(), l3);
        let l1 = assoc(l1, k2.clone(), l2);
        return Some(assoc(root, k1.clone(), l1));
    }
    if l2.len() >= 2 {
        let l2 = dissoc(l2, k3)?;
        let l1 = assoc(l1, k2.clone(), l2);
        return Some(assoc(root, k1.clone(), l1));
    }
    if l1.len() >= 2 {
        let l1 = dissoc(l1, k2)?;
        return Some(assoc(root, k1.clone(), l1));
    }
    dissoc(root, k1)
}

/// Replaces a leaf four levels deep via `f`.
///
/// `None` if the path is absent or `f` declines the update.
pub(crate) fn update4<K1, K2, K3, K4, V>(
    root: &Shared<K1, Shared<K2, Shared<K3, Shared<K4, V>>>>,
    k1: &K1,
    k2: &K2,
    k3: &K3,
    k4: &K4,
    f: impl FnOnce(&V) -> Option<V>,
) -> Option<Shared<K1, Shared<K2, Shared<K3, Shared<K4, V>>>>>
where
    K1: Ord + Clone,
    K2: Ord + Clone,
    K3: Ord + Clone,
    K4: Ord + Clone,
    V: Clone,
{
    let l1 = root.get(k1)?;
    let l2 = l1.get(k2)?;
    let l3 = l2.get(k3)?;
    let leaf = f(l3.get(k4)?)?;
    let l3 = assoc(l3, k4.clone(), leaf);
    let l2 = assoc(l2, k3.clone(), l3);
    let l1 = assoc(l1, k2.clone(), l2);
    Some(assoc(root, k1.clone(), l1))
}

/// Reads a leaf four levels deep.
pub(crate) fn get4<'a, K1, K2, K3, K4, V>(
    root: &'a Shared<K1, Shared<K2, Shared<K3, Shared<K4, V>>>>,
    k1: &K1,
    k2: &K2,
    k3: &K3,
    k4: &K4,
) -> Option<&'a V>
where
    K1: Ord,
    K2: Ord,
    K3: Ord,
    K4: Ord,
{
    root.get(k1)?.get(k2)?.get(k3)?.get(k4)
}
