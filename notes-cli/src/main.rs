//! notes-cli — command-line client for the notes REST API
//!
//! # Subcommands
//! - `list [--json]`                            — list all notes
//! - `get <id>`                                 — show one note
//! - `create <title> [--content <text>]`        — create a note
//! - `update <id> <title> [--content <text>]`   — replace a note's title (and content)
//! - `delete <id>`                              — delete a note
//! - `status`                                   — show server health

use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use reqwest::blocking::{Client, RequestBuilder};
use serde::Deserialize;

const DEFAULT_SERVER: &str = "http://127.0.0.1:3000";

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "notes-cli", version, about = "Client for the notes REST API")]
struct Cli {
    /// Notes HTTP server URL (overrides NOTES_HTTP_URL env var)
    #[arg(long, env = "NOTES_HTTP_URL", default_value = DEFAULT_SERVER)]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List all notes
    List {
        /// Print the raw JSON array
        #[arg(long)]
        json: bool,
    },

    /// Show a single note
    Get { id: u64 },

    /// Create a note
    Create {
        title: String,

        #[arg(short, long)]
        content: Option<String>,
    },

    /// Replace a note's title; content is kept unless given
    Update {
        id: u64,

        title: String,

        #[arg(short, long)]
        content: Option<String>,
    },

    /// Delete a note
    Delete { id: u64 },

    /// Show notes server status
    Status,
}

// ============================================================================
// API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteView {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

// ============================================================================
// Formatting
// ============================================================================

/// One-line summary: `#<id>  <title>  (<content preview>)`.
pub fn summary_line(note: &NoteView) -> String {
    let preview: String = note
        .content
        .lines()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("")
        .chars()
        .take(40)
        .collect();
    if preview.is_empty() {
        format!("#{}  {}", note.id, note.title)
    } else {
        format!("#{}  {}  ({})", note.id, note.title, preview)
    }
}

pub fn detail_block(note: &NoteView) -> String {
    format!(
        "#{} {}\nCreated: {}\nUpdated: {}\n\n{}",
        note.id, note.title, note.created_at, note.updated_at, note.content
    )
}

pub fn note_body(title: &str, content: Option<&str>) -> serde_json::Value {
    match content {
        Some(c) => serde_json::json!({ "title": title, "content": c }),
        None => serde_json::json!({ "title": title }),
    }
}

// ============================================================================
// HTTP Client Calls
// ============================================================================

struct Api {
    client: Client,
    server: String,
}

impl Api {
    fn new(server: &str) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            client,
            server: server.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.server, path)
    }

    /// Send the request, turning non-2xx responses into the server's `{message}`.
    fn send(&self, req: RequestBuilder) -> anyhow::Result<reqwest::blocking::Response> {
        let resp = req
            .send()
            .with_context(|| format!("connection failed to {}", self.server))?;

        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let message = resp
            .json::<ErrorBody>()
            .map(|b| b.message)
            .unwrap_or_else(|_| "no error message".to_string());
        anyhow::bail!("server returned {}: {}", status, message)
    }

    fn list(&self) -> anyhow::Result<Vec<serde_json::Value>> {
        Ok(self.send(self.client.get(self.url("/notes")))?.json()?)
    }

    fn get(&self, id: u64) -> anyhow::Result<NoteView> {
        Ok(self
            .send(self.client.get(self.url(&format!("/notes/{}", id))))?
            .json()?)
    }

    fn create(&self, title: &str, content: Option<&str>) -> anyhow::Result<NoteView> {
        let req = self.client.post(self.url("/notes")).json(&note_body(title, content));
        Ok(self.send(req)?.json()?)
    }

    fn update(&self, id: u64, title: &str, content: Option<&str>) -> anyhow::Result<NoteView> {
        let req = self
            .client
            .put(self.url(&format!("/notes/{}", id)))
            .json(&note_body(title, content));
        Ok(self.send(req)?.json()?)
    }

    fn delete(&self, id: u64) -> anyhow::Result<()> {
        self.send(self.client.delete(self.url(&format!("/notes/{}", id))))?;
        Ok(())
    }

    fn health(&self) -> anyhow::Result<serde_json::Value> {
        Ok(self.send(self.client.get(self.url("/health")))?.json()?)
    }
}

fn run(api: &Api, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::List { json } => {
            let notes = api.list()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&notes)?);
                return Ok(());
            }
            if notes.is_empty() {
                eprintln!("No notes yet");
                return Ok(());
            }
            for raw in notes {
                let note: NoteView = serde_json::from_value(raw)?;
                println!("{}", summary_line(&note));
            }
        }
        Commands::Get { id } => println!("{}", detail_block(&api.get(id)?)),
        Commands::Create { title, content } => {
            let note = api.create(&title, content.as_deref())?;
            println!("Created {}", summary_line(&note));
        }
        Commands::Update { id, title, content } => {
            let note = api.update(id, &title, content.as_deref())?;
            println!("Updated {}", summary_line(&note));
        }
        Commands::Delete { id } => {
            api.delete(id)?;
            println!("Deleted #{}", id);
        }
        Commands::Status => {
            let body = api.health()?;
            println!("Notes server: {}", body["status"].as_str().unwrap_or("unknown"));
            println!("Message:      {}", body["message"].as_str().unwrap_or("?"));
            println!("Environment:  {}", body["environment"].as_str().unwrap_or("?"));
            println!("Timestamp:    {}", body["timestamp"].as_str().unwrap_or("?"));
        }
    }
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

fn main() {
    let cli = Cli::parse();

    let result = Api::new(&cli.server).and_then(|api| run(&api, cli.command));

    if let Err(e) = result {
        eprintln!("notes-cli: {}", e);
        std::process::exit(1);
    }
}

// ============================================================================
// Tests
// ============================================================================
