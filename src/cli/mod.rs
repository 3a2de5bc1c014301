//! Command-line interface for shelfmark.
//!
//! Provides commands for listing and filtering the catalog, showing,
//! updating and deleting single books, and importing batches from the
//! search provider.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::adapters::{GoogleBooksClient, SearchTerms};
use crate::catalog::{BookFilter, Catalog, CatalogStore, JsonFileStore};
use crate::config;
use crate::domain::{Book, BookPatch};
use crate::reconcile::Reconciler;

/// shelfmark - Book catalog with external bibliographic reconciliation
#[derive(Parser, Debug)]
#[command(name = "shelfmark")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List books, optionally filtered
    List {
        /// Keep books whose author contains this substring
        /// (case-insensitive)
        #[arg(short, long)]
        author: Option<String>,

        /// Keep books published in or after this year
        #[arg(long)]
        from: Option<String>,

        /// Keep books published in or before this year
        #[arg(long)]
        to: Option<String>,

        /// Keep books whose acquired flag matches ("true"/"false")
        #[arg(long)]
        acquired: Option<String>,
    },

    /// Show all fields of a single book
    Show {
        /// Local book id
        id: u64,
    },

    /// Update fields of a single book; omitted fields are left untouched
    Update {
        /// Local book id
        id: u64,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New authors (comma-separated)
        #[arg(long)]
        authors: Option<String>,

        /// New publication year
        #[arg(long)]
        year: Option<String>,

        /// New acquired flag
        #[arg(long)]
        acquired: Option<bool>,

        /// New thumbnail URL
        #[arg(long)]
        thumbnail: Option<String>,

        /// New external identifier
        #[arg(long)]
        external_id: Option<String>,
    },

    /// Delete a single book
    Delete {
        /// Local book id
        id: u64,
    },

    /// Import books from the search provider into the catalog
    Import {
        /// Match against volume titles
        #[arg(short, long)]
        title: Option<String>,

        /// Match against volume authors
        #[arg(short, long)]
        author: Option<String>,

        /// Generic search terms
        terms: Vec<String>,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::List {
                author,
                from,
                to,
                acquired,
            } => {
                list_books(BookFilter {
                    author,
                    from,
                    to,
                    acquired,
                })
                .await
            }
            Commands::Show { id } => show_book(id).await,
            Commands::Update {
                id,
                title,
                authors,
                year,
                acquired,
                thumbnail,
                external_id,
            } => {
                let patch = BookPatch {
                    external_id,
                    title,
                    authors: authors.map(|list| split_list(&list)),
                    published_year: year,
                    acquired,
                    thumbnail,
                };
                update_book(id, patch).await
            }
            Commands::Delete { id } => delete_book(id).await,
            Commands::Import {
                title,
                author,
                terms,
            } => {
                import_books(SearchTerms {
                    title,
                    author,
                    terms,
                })
                .await
            }
            Commands::Config => show_config().await,
        }
    }
}

/// Open the configured catalog store
fn open_store() -> Result<JsonFileStore> {
    Ok(JsonFileStore::new(config::catalog_path()?))
}

/// Split a comma-separated flag value into trimmed, non-empty entries
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// List books, applying any supplied filter
async fn list_books(filter: BookFilter) -> Result<()> {
    let store = open_store()?;
    let catalog = Catalog::from_books(store.load().await?);

    if catalog.is_empty() {
        println!("Catalog is empty. Use 'shelfmark import' to add books.");
        return Ok(());
    }

    let books = filter.apply(&catalog.books);

    if books.is_empty() {
        println!("No books match the filter");
        return Ok(());
    }

    println!(
        "{:<6} {:<6} {:<9} {:<40} {:<30}",
        "ID", "YEAR", "ACQUIRED", "TITLE", "AUTHORS"
    );
    println!("{}", "-".repeat(95));

    for book in &books {
        println!(
            "{:<6} {:<6} {:<9} {:<40} {:<30}",
            book.id,
            book.published_year.as_deref().unwrap_or("-"),
            book.acquired,
            truncate(&book.title, 37),
            truncate(&join_authors(book), 27),
        );
    }

    println!("\nTotal: {} of {} books", books.len(), catalog.len());

    Ok(())
}

/// Show all fields of a single book
async fn show_book(id: u64) -> Result<()> {
    let store = open_store()?;
    let catalog = Catalog::from_books(store.load().await?);

    let book = catalog
        .get(id)
        .with_context(|| format!("No book with id {}", id))?;

    println!("ID: {}", book.id);
    println!("Title: {}", book.title);
    println!("Authors: {}", join_authors(book));
    println!(
        "Published: {}",
        book.published_year.as_deref().unwrap_or("(unknown)")
    );
    println!("Acquired: {}", book.acquired);
    println!(
        "External ID: {}",
        book.external_id.as_deref().unwrap_or("(none)")
    );
    println!(
        "Thumbnail: {}",
        book.thumbnail.as_deref().unwrap_or("(none)")
    );

    Ok(())
}

/// Apply a partial update to a single book
async fn update_book(id: u64, patch: BookPatch) -> Result<()> {
    if patch.is_empty() {
        anyhow::bail!("No fields to update. Pass at least one of the field flags.");
    }

    let store = open_store()?;
    let mut catalog = Catalog::from_books(store.load().await?);

    let book = catalog
        .update(id, &patch)
        .with_context(|| format!("Cannot update book {}", id))?;
    let title = book.title.clone();

    store.replace(&catalog.books).await?;

    eprintln!("✅ Updated book {} ({})", id, title);

    Ok(())
}

/// Delete a single book
async fn delete_book(id: u64) -> Result<()> {
    let store = open_store()?;
    let mut catalog = Catalog::from_books(store.load().await?);

    let book = catalog
        .remove(id)
        .with_context(|| format!("Cannot delete book {}", id))?;

    store.replace(&catalog.books).await?;

    eprintln!("✅ Deleted book {} ({})", id, book.title);

    Ok(())
}

/// Fetch a batch from the provider and reconcile it into the catalog
async fn import_books(terms: SearchTerms) -> Result<()> {
    if terms.is_empty() {
        anyhow::bail!("No search terms. Pass --title, --author or a generic term.");
    }

    let client = GoogleBooksClient::from_settings(&config::provider_settings()?)?;

    eprintln!("📥 Searching the books provider...");
    let records = client.search(&terms).await?;

    if records.is_empty() {
        eprintln!("No volumes matched the search");
        return Ok(());
    }

    let store = open_store()?;
    let reconciler = Reconciler::new(&store);
    let report = reconciler.import_batch(&records).await?;

    eprintln!(
        "✅ Import complete: {} added, {} updated",
        report.added, report.updated
    );

    for skipped in &report.skipped {
        eprintln!(
            "⚠️ Skipped record {} of the batch: {}",
            skipped.index + 1,
            skipped.reason
        );
    }

    Ok(())
}

/// Show the resolved configuration (for debugging)
async fn show_config() -> Result<()> {
    let cfg = config::config()?;

    println!("Shelfmark Configuration");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Paths:");
    println!("  Home (state): {}", cfg.home.display());
    println!("  Catalog:      {}", cfg.catalog.display());
    println!();
    println!("Provider:");
    println!("  Base URL: {}", cfg.provider.base_url);
    println!("  Timeout:  {}s", cfg.provider.timeout_seconds);

    Ok(())
}

/// Render a book's author list for display
fn join_authors(book: &Book) -> String {
    match book.authors.as_deref() {
        Some([]) | None => "(unknown)".to_string(),
        Some(authors) => authors.join(", "),
    }
}

/// Truncate a display string, appending an ellipsis when cut
fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() > max {
        let cut: String = value.chars().take(max).collect();
        format!("{}...", cut)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list("Jane Doe, Ann Lee"),
            vec!["Jane Doe".to_string(), "Ann Lee".to_string()]
        );
        assert_eq!(split_list(" , "), Vec::<String>::new());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a rather long title", 8), "a rather...");
    }
}
