//! Seeds an in-memory marketplace and walks the main flows from the
//! command line: browse, search, listing detail, and a short chat
//! session with a live subscription.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};

use plaza_client::{
    ConversationEvent, ListingDraft, MarketClient, MemoryBackend, Photo, VehicleDraft,
};
use plaza_common::category::{resolve_category, slugify, CATEGORIES};
use plaza_common::format::{format_price, format_time_ago};
use plaza_common::listing::Listing;
use plaza_common::query::ListingQuery;

#[derive(Parser)]
#[command(name = "plaza-demo", about = "Marketplace client demo over an in-memory backend")]
struct Cli {
    /// Email to act as (buyer for chat, seller for seeded listings).
    #[arg(long, default_value = "alice@example.com")]
    user: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the category list with its URL slugs.
    Categories,
    /// Browse seeded listings, optionally narrowed by category slug
    /// and/or a search term.
    Browse {
        /// Category slug, e.g. "garden-and-outdoor".
        #[arg(long)]
        category: Option<String>,
        /// Case-insensitive title search.
        #[arg(long)]
        search: Option<String>,
    },
    /// Show full detail for the nth seeded listing (newest first).
    Detail {
        #[arg(default_value_t = 0)]
        index: usize,
    },
    /// Open a conversation on the nth seeded listing, send a message,
    /// and print the echoed events.
    Chat {
        #[arg(default_value_t = 0)]
        index: usize,
        /// Message body to send.
        #[arg(long, default_value = "Is this still available?")]
        message: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let backend = Arc::new(MemoryBackend::new());
    seed(&backend).await?;
    let client = MarketClient::with_backend(backend, &cli.user);

    match cli.command {
        Command::Categories => {
            for label in CATEGORIES {
                println!("{label:<22} /category/{}", slugify(label));
            }
        }
        Command::Browse { category, search } => {
            let mut query = ListingQuery::new();
            if let Some(slug) = category {
                query = query.with_category(resolve_category(&slug)?);
            }
            if let Some(term) = search {
                query = query.with_search(term);
            }
            let listings = client.browse(&query).await?;
            if listings.is_empty() {
                println!("no listings match");
            }
            for listing in &listings {
                print_row(listing);
            }
        }
        Command::Detail { index } => {
            let listing = nth_listing(&client, index).await?;
            let detail = client
                .listing_detail(&listing.id)
                .await?
                .context("listing vanished")?;
            print_row(&detail.listing);
            println!("  {}", detail.listing.description);
            println!("  seller: {}", detail.listing.seller_email);
            if let Some(vehicle) = &detail.vehicle {
                println!(
                    "  vehicle: {} {} {}",
                    vehicle.year.map_or(String::from("?"), |y| y.to_string()),
                    vehicle.make,
                    vehicle.model,
                );
            }
            for url in &detail.photo_urls {
                println!("  photo: {url}");
            }
        }
        Command::Chat { index, message } => {
            let listing = nth_listing(&client, index).await?;
            println!("chatting about: {}", listing.title);

            let mut convo = client.open_conversation(&listing.id);
            match convo.next_event().await {
                Some(ConversationEvent::History(history)) => {
                    println!("history: {} message(s)", history.len());
                }
                other => bail!("conversation failed to open: {other:?}"),
            }

            client
                .send_message(&listing.id, &listing.seller_email, &message)
                .await?;
            match convo.next_event().await {
                Some(ConversationEvent::MessageAppended(msg)) => {
                    println!("{}: {}", msg.buyer_email, msg.body);
                }
                other => bail!("echo never arrived: {other:?}"),
            }
            convo.close().await;

            for summary in client.conversations().await? {
                println!("conversation with {} about {}", summary.seller_email, summary.title);
            }
        }
    }

    Ok(())
}

fn print_row(listing: &Listing) {
    println!(
        "[{}] {:<20} {:>8}  {}  ({})",
        listing.category,
        listing.title,
        format_price(listing.price_cents),
        listing.location,
        format_time_ago(listing.created_at, Utc::now()),
    );
}

async fn nth_listing(client: &MarketClient, index: usize) -> Result<Listing> {
    let listings = client.browse(&ListingQuery::new()).await?;
    listings
        .into_iter()
        .nth(index)
        .with_context(|| format!("no listing at index {index}"))
}

/// A couple of sellers and a handful of listings so every subcommand
/// has something to show.
async fn seed(backend: &Arc<MemoryBackend>) -> Result<()> {
    let gary = MarketClient::with_backend(backend.clone(), "gary@example.com");
    let emma = MarketClient::with_backend(backend.clone(), "emma@example.com");

    let photo = |name: &str| Photo {
        file_name: name.to_string(),
        content_type: "image/jpeg".to_string(),
        bytes: vec![0u8; 256],
    };
    let draft = |title: &str, category: &str, price: &str, seller: &str| ListingDraft {
        title: title.to_string(),
        category: category.to_string(),
        price: price.to_string(),
        location: String::new(),
        seller_email: seller.to_string(),
        description: format!("{title}, lightly used."),
    };

    emma.create_listing(
        &draft("Desk Lamp", "Home Goods", "25", "emma@example.com"),
        &[photo("lamp.jpg")],
    )
    .await?;
    emma.create_listing(
        &draft("Lawn Mower", "Garden & Outdoor", "150", "emma@example.com"),
        &[],
    )
    .await?;
    gary.create_listing(
        &draft("Bike", "Sporting Goods", "150", "gary@example.com"),
        &[photo("bike.jpg")],
    )
    .await?;
    gary.create_vehicle_listing(
        &draft("Honda Civic", "", "8000", "gary@example.com"),
        &VehicleDraft {
            year: Some(2014),
            make: "Honda".into(),
            model: "Civic".into(),
            mileage: Some(92_000),
        },
        &[photo("civic.jpg")],
    )
    .await?;

    tracing::info!("seeded 4 listings");
    Ok(())
}
