//! Process-wide registry of named groups.
//!
//! The original Go source this is ported from is known to sometimes
//! mismatch lock modes between lookup and registration; this implementation
//! keeps lookups and registration on matched lock modes (read for lookup,
//! write for registration) so no such mismatch is possible here.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;

use crate::group::Group;
use crate::peers::Loader;

static GROUPS: LazyLock<RwLock<HashMap<String, Arc<Group>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Creates a group and registers it under `name`, overwriting any group
/// already registered under that name.
pub fn new_group(name: impl Into<String>, cache_bytes: usize, loader: Box<dyn Loader>) -> Arc<Group> {
    let name = name.into();
    let group = Arc::new(Group::new(name.clone(), cache_bytes, Some(loader)));
    GROUPS.write().insert(name, Arc::clone(&group));
    group
}

/// Looks up a previously registered group by name.
pub fn get_group(name: &str) -> Option<Arc<Group>> {
    GROUPS.read().get(name).cloned()
}
