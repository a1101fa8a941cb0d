//! # pdfsync CLI
//!
//! Thin command-line front end over the synchronization layer. It drives
//! the same accessors and mutations a UI would, against a running document
//! API.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `pdfsync login <username>` | Obtain and persist a bearer token |
//! | `pdfsync list` | List uploaded documents (paginated) |
//! | `pdfsync show <id>` | Show one document with its chunks |
//! | `pdfsync chunks <id>` | Page through a document's chunks |
//! | `pdfsync search "<query>"` | Full-text search across chunk content |
//! | `pdfsync upload <file>` | Upload a PDF |
//! | `pdfsync delete <id>` | Delete a document |
//!
//! All commands accept `--config` pointing to a TOML file; when the file
//! does not exist, built-in defaults are used (API at
//! `http://localhost:8000`, token cached in `.pdfsync-token`).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use pdfsync::auth::{FileTokenStore, TokenStore};
use pdfsync::cache::QueryCache;
use pdfsync::config::{load_config, Config};
use pdfsync::highlight;
use pdfsync::models::Document;
use pdfsync::mutations::{DeleteMutation, Notice, UploadMutation};
use pdfsync::queries::{
    ChunkListQuery, DocumentDetailQuery, DocumentListQuery, SearchQuery, SyncEngine,
};
use pdfsync::transport::{HttpClient, Transport};

/// pdfsync — client-side sync layer for a PDF document library.
#[derive(Parser)]
#[command(
    name = "pdfsync",
    about = "Client for a PDF document library: list, search, upload, delete",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./pdfsync.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Obtain a bearer token and persist it for later commands.
    Login {
        username: String,
        /// Password; prompted use is out of scope, pass it directly.
        password: String,
    },
    /// List uploaded documents.
    List {
        #[arg(long, default_value_t = 1)]
        page: i64,
        #[arg(long)]
        size: Option<i64>,
    },
    /// Show one document with its extracted chunks.
    Show { id: i64 },
    /// Page through one document's chunks.
    Chunks {
        id: i64,
        #[arg(long, default_value_t = 1)]
        page: i64,
        #[arg(long)]
        size: Option<i64>,
    },
    /// Search chunk content across all documents.
    Search {
        query: String,
        /// Restrict the search to one document.
        #[arg(long)]
        pdf: Option<i64>,
        #[arg(long, default_value_t = 1)]
        page: i64,
        #[arg(long)]
        size: Option<i64>,
    },
    /// Upload a PDF file.
    Upload {
        file: PathBuf,
        #[arg(long)]
        title: Option<String>,
    },
    /// Delete a document by id.
    Delete { id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = if cli.config.exists() {
        load_config(&cli.config)?
    } else {
        Config::default()
    };

    let tokens: Arc<dyn TokenStore> =
        Arc::new(FileTokenStore::new(config.auth.token_path.clone()));
    let client = Arc::new(HttpClient::new(
        &config.api.base_url,
        Duration::from_secs(config.api.timeout_secs),
        Arc::clone(&tokens),
    )?);
    let cache = Arc::new(QueryCache::new());
    let engine = SyncEngine::new(client.clone(), cache);

    match cli.command {
        Commands::Login { username, password } => {
            let token = client.login(&username, &password).await?;
            tokens.store(&token.access_token);
            println!("Logged in as {}.", username);
        }
        Commands::List { page, size } => {
            let size = size.unwrap_or(config.pagination.list_size);
            let mut list = DocumentListQuery::new(engine);
            let result = list.fetch(page, size).await?;
            if result.items.is_empty() {
                println!("No documents.");
                return Ok(());
            }
            println!(
                "Documents (page {}/{}, {} total):",
                result.page, result.pages, result.total
            );
            for doc in &result.items {
                print_document_line(doc);
            }
        }
        Commands::Show { id } => {
            let detail = DocumentDetailQuery::new(engine);
            let detail = detail
                .fetch(Some(id))
                .await?
                .context("detail accessor unexpectedly disabled")?;
            let doc = &detail.document;
            println!("--- Document ---");
            println!("id:        {}", doc.id);
            println!("title:     {}", doc.title);
            println!("filename:  {}", doc.filename);
            println!("size:      {:.2} MB ({} bytes)", doc.file_size_mb, doc.file_size);
            println!("pages:     {}", doc.total_pages);
            println!("status:    {:?}", doc.processing_status);
            if let Some(ref err) = doc.processing_error {
                println!("error:     {}", err);
            }
            if let Some(ref author) = doc.author {
                println!("author:    {}", author);
            }
            println!("created:   {}", doc.created_at.format("%Y-%m-%d %H:%M:%S"));
            println!();
            println!("--- Chunks ({}) ---", detail.chunks.len());
            for chunk in &detail.chunks {
                println!("[chunk {} / page {}]", chunk.chunk_number, chunk.page_number);
                println!("{}", chunk.preview);
                println!();
            }
        }
        Commands::Chunks { id, page, size } => {
            let size = size.unwrap_or(config.pagination.chunk_size);
            let mut chunks = ChunkListQuery::new(engine);
            let result = chunks
                .fetch(Some(id), page, size)
                .await?
                .context("chunk accessor unexpectedly disabled")?;
            println!(
                "Chunks of document {} (page {}/{}, {} total):",
                result.pdf_id, result.page.page, result.page.pages, result.page.total
            );
            for chunk in &result.page.items {
                println!(
                    "  #{:<4} page {:<4} {} words",
                    chunk.chunk_number, chunk.page_number, chunk.word_count
                );
                println!("        {}", chunk.preview.replace('\n', " "));
            }
        }
        Commands::Search {
            query,
            pdf,
            page,
            size,
        } => {
            let size = size.unwrap_or(config.pagination.search_size);
            let mut search = SearchQuery::new(engine);
            let Some(result) = search.fetch(&query, pdf, page, size).await? else {
                println!("No results.");
                return Ok(());
            };
            if result.page.items.is_empty() {
                println!("No results.");
                return Ok(());
            }
            println!(
                "Results for \"{}\" (page {}/{}, {} total):",
                result.query, result.page.page, result.page.pages, result.page.total
            );
            for chunk in &result.page.items {
                let spans = highlight::highlight(&chunk.content, &result.query);
                println!("  doc {} / page {}:", chunk.pdf_id, chunk.page_number);
                println!(
                    "    \"{}\"",
                    highlight::mark(&spans).replace('\n', " ").trim()
                );
            }
        }
        Commands::Upload { file, title } => {
            let bytes = std::fs::read(&file)
                .with_context(|| format!("Failed to read file: {}", file.display()))?;
            let file_name = file
                .file_name()
                .and_then(|n| n.to_str())
                .context("file has no usable name")?
                .to_string();
            let mut upload = UploadMutation::new(engine);
            let outcome = upload.run(&file_name, bytes, title.as_deref()).await;
            let notice = Notice::for_upload(&outcome);
            println!("{}", notice.message);
            let doc = outcome?;
            print_document_line(&doc);
        }
        Commands::Delete { id } => {
            let mut delete = DeleteMutation::new(engine);
            let outcome = delete.run(id).await;
            let notice = Notice::for_delete(&outcome);
            println!("{}", notice.message);
            outcome?;
        }
    }

    Ok(())
}

fn print_document_line(doc: &Document) {
    println!(
        "  {:<5} {:<32} {:>8.2} MB  {:>4} pages  {:?}",
        doc.id, doc.title, doc.file_size_mb, doc.total_pages, doc.processing_status
    );
}
