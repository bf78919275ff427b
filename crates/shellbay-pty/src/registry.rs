use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::shell::{BackgroundShell, ShellId};

/// A shell shared between its I/O thread and the UI.
pub type SharedShell = Arc<Mutex<BackgroundShell>>;

/// Lock a shared shell, recovering the guard from a poisoned mutex.
pub fn lock_shell(shell: &SharedShell) -> MutexGuard<'_, BackgroundShell> {
    shell.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Background shells in the order they were started.
///
/// Order is significant: it is the tab order and the picker order.
#[derive(Default)]
pub struct ShellRegistry {
    shells: Vec<(ShellId, SharedShell)>,
}

impl ShellRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a shell at the end and return its shared handle.
    ///
    /// A stale entry with the same id (a recycled pid) is replaced in place.
    pub fn insert(&mut self, shell: BackgroundShell) -> SharedShell {
        let id = shell.id();
        let shared = Arc::new(Mutex::new(shell));
        match self.shells.iter_mut().find(|(existing, _)| *existing == id) {
            Some(slot) => slot.1 = Arc::clone(&shared),
            None => self.shells.push((id, Arc::clone(&shared))),
        }
        shared
    }

    pub fn get(&self, id: ShellId) -> Option<&SharedShell> {
        self.shells
            .iter()
            .find(|(existing, _)| *existing == id)
            .map(|(_, shell)| shell)
    }

    pub fn contains(&self, id: ShellId) -> bool {
        self.get(id).is_some()
    }

    /// Remove a shell; dropping the last handle kills its process.
    pub fn remove(&mut self, id: ShellId) -> Option<SharedShell> {
        let pos = self.shells.iter().position(|(existing, _)| *existing == id)?;
        Some(self.shells.remove(pos).1)
    }

    /// Ids in registry order.
    pub fn ids(&self) -> Vec<ShellId> {
        self.shells.iter().map(|(id, _)| *id).collect()
    }

    pub fn shells(&self) -> impl Iterator<Item = &SharedShell> {
        self.shells.iter().map(|(_, shell)| shell)
    }

    pub fn len(&self) -> usize {
        self.shells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shells.is_empty()
    }
}
