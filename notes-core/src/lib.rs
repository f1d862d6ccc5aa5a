pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod store;

pub use config::NotesConfig;
pub use error::NotesError;
pub use models::{Note, NotePayload};
pub use service::NotesService;
pub use store::{JsonFileStore, NoteStore};
