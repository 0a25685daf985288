//! Reversible drawing mutations and the linear history that replays them.
//!
//! A command moves strokes between itself and the [`StrokeStore`]. Which side
//! owns them at any moment is explicit in [`Custody`], so a stroke is never
//! owned twice and never reachable through a stale reference.

use crate::stroke::{Stroke, StrokeId};
use serde::{Deserialize, Serialize};

/// Owner of a value moved back and forth by a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Custody<T> {
    /// The stroke store owns the value.
    InStore,
    /// The command owns the value.
    Held(T),
}

impl<T> Custody<T> {
    pub fn is_held(&self) -> bool {
        matches!(self, Custody::Held(_))
    }

    /// Take the held value, leaving custody with the store.
    fn release(&mut self) -> Option<T> {
        match std::mem::replace(self, Custody::InStore) {
            Custody::Held(value) => Some(value),
            Custody::InStore => None,
        }
    }
}

/// Owning arena of strokes in creation order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrokeStore {
    strokes: Vec<Stroke>,
}

impl StrokeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, stroke: Stroke) {
        self.strokes.push(stroke);
    }

    pub fn pop(&mut self) -> Option<Stroke> {
        self.strokes.pop()
    }

    /// Move every stroke out, leaving the store empty.
    pub fn take_all(&mut self) -> Vec<Stroke> {
        std::mem::take(&mut self.strokes)
    }

    /// Put back strokes previously taken with [`take_all`](Self::take_all),
    /// ahead of anything stored since.
    pub fn restore(&mut self, mut strokes: Vec<Stroke>) {
        strokes.append(&mut self.strokes);
        self.strokes = strokes;
    }

    pub fn contains(&self, id: StrokeId) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, id: StrokeId) -> Option<&Stroke> {
        self.position(id).map(|index| &self.strokes[index])
    }

    pub fn get_mut(&mut self, id: StrokeId) -> Option<&mut Stroke> {
        self.position(id).map(|index| &mut self.strokes[index])
    }

    /// Index of a stroke. Searches from the newest stroke, which is where
    /// the active stroke lives.
    pub fn position(&self, id: StrokeId) -> Option<usize> {
        self.strokes.iter().rposition(|stroke| stroke.id() == id)
    }

    pub fn last(&self) -> Option<&Stroke> {
        self.strokes.last()
    }

    pub fn as_slice(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Stroke> {
        self.strokes.iter()
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }
}

/// A single reversible mutation of the stroke store.
///
/// `execute` and `undo` must alternate, starting with `execute`;
/// [`History`] guarantees this.
#[derive(Debug, Clone)]
pub enum Command {
    /// Append one stroke.
    AddStroke { stroke: Custody<Stroke> },
    /// Remove every stroke, keeping them for undo.
    Clear { strokes: Custody<Vec<Stroke>> },
}

impl Command {
    pub fn add_stroke(stroke: Stroke) -> Self {
        Command::AddStroke {
            stroke: Custody::Held(stroke),
        }
    }

    pub fn clear() -> Self {
        Command::Clear {
            strokes: Custody::InStore,
        }
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddStroke { .. } => "add stroke",
            Command::Clear { .. } => "clear",
        }
    }

    pub fn execute(&mut self, store: &mut StrokeStore) {
        match self {
            Command::AddStroke { stroke } => match stroke.release() {
                Some(stroke) => store.push(stroke),
                None => log::warn!("add stroke executed while its stroke is already stored"),
            },
            Command::Clear { strokes } => {
                if strokes.is_held() {
                    log::warn!("clear executed twice without undo");
                    return;
                }
                *strokes = Custody::Held(store.take_all());
            }
        }
    }

    pub fn undo(&mut self, store: &mut StrokeStore) {
        match self {
            Command::AddStroke { stroke } => {
                if stroke.is_held() {
                    log::warn!("add stroke undone twice without execute");
                    return;
                }
                // Linear history: the newest stroke is the one this command added.
                match store.pop() {
                    Some(removed) => *stroke = Custody::Held(removed),
                    None => log::warn!("add stroke undone on an empty store"),
                }
            }
            Command::Clear { strokes } => {
                if let Some(saved) = strokes.release() {
                    store.restore(saved);
                }
            }
        }
    }
}

/// Linear undo/redo history.
///
/// Commands before the cursor are applied, commands at or after it have been
/// undone and can be redone until a new command is executed.
#[derive(Debug, Clone, Default)]
pub struct History {
    commands: Vec<Command>,
    cursor: usize,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute a command and record it, discarding anything undone.
    pub fn execute(&mut self, mut command: Command, store: &mut StrokeStore) {
        if self.cursor < self.commands.len() {
            log::debug!(
                "discarding {} undone command(s)",
                self.commands.len() - self.cursor
            );
            self.commands.truncate(self.cursor);
        }

        log::debug!("execute {}", command.name());
        command.execute(store);
        self.commands.push(command);
        self.cursor = self.commands.len();
    }

    /// Undo the last applied command.
    /// Returns true if undo was performed, false if nothing to undo.
    pub fn undo(&mut self, store: &mut StrokeStore) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let command = &mut self.commands[self.cursor];
        log::debug!("undo {}", command.name());
        command.undo(store);
        true
    }

    /// Redo the next undone command.
    /// Returns true if redo was performed, false if nothing to redo.
    pub fn redo(&mut self, store: &mut StrokeStore) -> bool {
        let Some(command) = self.commands.get_mut(self.cursor) else {
            return false;
        };
        log::debug!("redo {}", command.name());
        command.execute(store);
        self.cursor += 1;
        true
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.commands.len()
    }

    /// Number of recorded commands, applied or undone.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of applied commands.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Forget every command. The store is left as it is.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.cursor = 0;
    }
}
