use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use client_core::{config, FileTokenStore, MarketplaceClient};

#[derive(Parser, Debug)]
struct Args {
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    profile: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    password: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let mut settings = config::load_settings();
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    if let Some(profile) = args.profile {
        settings.profile = profile;
    }

    let token_store = Arc::new(FileTokenStore::for_profile(
        &settings.profile,
        settings.data_dir.as_deref(),
    )?);
    let client = MarketplaceClient::new(settings.server_url, token_store);

    client.resolve_stored_session().await;
    if let Some(user) = client.current_user().await {
        println!("Signed in as {} <{}>", user.name, user.email);
    } else if let (Some(email), Some(password)) = (args.email, args.password) {
        let user = client.login(&email, &password).await?;
        println!("Signed in as {} <{}>", user.name, user.email);
    } else {
        println!("Browsing as guest.");
    }

    let count = client.refresh_listings().await?;
    println!("Marketplace has {count} listings:");
    for listing in client.listings().await {
        println!(
            "  {} - ${} / {} (from {})",
            listing.name,
            listing.price,
            listing.unit,
            listing.farmer_name()
        );
    }

    Ok(())
}
