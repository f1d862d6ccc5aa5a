//! Notes service: the in-memory collection and its business rules.
//!
//! The service owns the collection for the life of the process. After every
//! successful mutation the full collection is written back to the store; a
//! failed write is logged and otherwise ignored, so callers always get the
//! in-memory result.

use chrono::{DateTime, Duration, Utc};

use crate::error::{NotesError, Result};
use crate::models::{Note, NotePayload};
use crate::store::NoteStore;

pub struct NotesService {
    notes: Vec<Note>,
    next_id: u64,
    store: Box<dyn NoteStore>,
}

impl NotesService {
    /// Hydrate the collection from `store`.
    pub fn open(store: impl NoteStore + 'static) -> Self {
        let notes = store.load();
        let next_id = notes.iter().map(|n| n.id).max().map_or(1, |max| max + 1);
        tracing::info!("Notes service ready: {} notes, next id {}", notes.len(), next_id);
        Self {
            notes,
            next_id,
            store: Box::new(store),
        }
    }

    pub fn list(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn get_by_id(&self, id: u64) -> Result<Note> {
        self.notes
            .iter()
            .find(|n| n.id == id)
            .cloned()
            .ok_or(NotesError::NotFound(id))
    }

    pub fn create(&mut self, payload: &NotePayload) -> Result<Note> {
        let title = payload.require_title()?;
        let now = Utc::now();

        let note = Note {
            id: self.next_id,
            title,
            content: payload.content.clone().unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };
        self.next_id += 1;
        self.notes.push(note.clone());
        self.persist();

        tracing::info!(id = note.id, "Note created");
        Ok(note)
    }

    /// Full-replace on title; content is kept when the payload omits it.
    pub fn update(&mut self, id: u64, payload: &NotePayload) -> Result<Note> {
        let idx = self.position(id)?;
        let title = payload.require_title()?;

        let note = &mut self.notes[idx];
        note.title = title;
        if let Some(content) = &payload.content {
            note.content = content.clone();
        }
        note.updated_at = advance(note.updated_at);
        let updated = note.clone();
        self.persist();

        tracing::info!(id, "Note updated");
        Ok(updated)
    }

    pub fn delete(&mut self, id: u64) -> Result<()> {
        let idx = self.position(id)?;
        self.notes.remove(idx);
        self.persist();

        tracing::info!(id, "Note deleted");
        Ok(())
    }

    fn position(&self, id: u64) -> Result<usize> {
        self.notes
            .iter()
            .position(|n| n.id == id)
            .ok_or(NotesError::NotFound(id))
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.notes) {
            tracing::error!("Failed to persist notes: {}", e);
        }
    }
}

/// Current time, bumped past `prev` when the clock has not moved.
fn advance(prev: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > prev {
        now
    } else {
        prev + Duration::microseconds(1)
    }
}
