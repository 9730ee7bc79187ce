//! # Seed Binary
//!
//! Populates a development database with a demo owner, two bots with
//! different trust levels, and posts in every lifecycle state — all driven
//! through the real services so the data could only exist in states the
//! state machine allows. Prints the credentials it minted; run once, keep
//! the output.

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use secrecy::ExposeSecret;
use uuid::Uuid;

use configs::AppConfig;
use domains::{BotPatch, HumanSession, Principal, User, UserRepo, UserRole};
use services::bots::{BotService, NewBot};
use services::credentials::CredentialStore;
use services::posts::{NewPost, PostService};

#[cfg(feature = "db-postgres")]
use storage_adapters::PostgresGateway;

#[cfg(not(feature = "db-postgres"))]
use storage_adapters::MemoryGateway;

#[cfg(feature = "auth-jwt")]
use auth_adapters::JwtSessionProvider;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::load().context("failed to load configuration")?;

    #[cfg(feature = "db-postgres")]
    let gateway = Arc::new(
        PostgresGateway::connect(
            config.database.url.expose_secret(),
            config.database.max_connections,
        )
        .await
        .context("failed to init Postgres")?,
    );

    #[cfg(not(feature = "db-postgres"))]
    let gateway = Arc::new(MemoryGateway::new());

    let credentials = CredentialStore::new();
    let bots = BotService::new(gateway.clone(), gateway.clone(), credentials);
    let posts = PostService::new(gateway.clone(), gateway.clone(), gateway.clone());

    // Demo owner + an admin who can pin
    let owner = User {
        id: Uuid::now_v7(),
        name: "Demo Owner".into(),
        image: None,
        role: UserRole::Member,
        created_at: Utc::now(),
    };
    let admin = User {
        id: Uuid::now_v7(),
        name: "Site Admin".into(),
        image: None,
        role: UserRole::Admin,
        created_at: Utc::now(),
    };
    UserRepo::insert(&*gateway, &owner).await?;
    UserRepo::insert(&*gateway, &admin).await?;

    let owner_principal = Principal::Human(HumanSession {
        user_id: owner.id,
        role: UserRole::Member,
    });

    // One cautious bot, one trusted bot that skips review
    let drafter = bots
        .create(
            &owner_principal,
            NewBot {
                name: "digest-writer".into(),
                description: Some("Summarizes the week".into()),
                avatar: None,
            },
        )
        .await?;
    let publisher = bots
        .create(
            &owner_principal,
            NewBot {
                name: "release-notes".into(),
                description: Some("Posts release notes directly".into()),
                avatar: None,
            },
        )
        .await?;
    bots.update(
        &owner_principal,
        publisher.bot.id,
        BotPatch {
            trusted: Some(true),
            can_publish: Some(true),
            ..Default::default()
        },
    )
    .await?;

    // A human-authored published post
    let hello = posts
        .create(
            &owner_principal,
            NewPost {
                title: "Hello, Quillpress".into(),
                body: "Humans and bots publish side by side here. This one was written by a human."
                    .into(),
                format: None,
                tags: vec!["meta".into()],
            },
        )
        .await?;
    posts.publish(&owner_principal, hello.id).await?;

    // A bot draft waiting in the review queue
    let drafter_principal = Principal::Bot((&drafter.bot).into());
    let pending = posts
        .create(
            &drafter_principal,
            NewPost {
                title: "Weekly digest #1".into(),
                body: "Everything that happened this week, condensed.".into(),
                format: None,
                tags: vec!["digest".into()],
            },
        )
        .await?;
    posts.submit(&drafter_principal, pending.id).await?;

    // A draft nobody has touched yet
    posts
        .create(
            &drafter_principal,
            NewPost {
                title: "Draft: ideas for next week".into(),
                body: "Still cooking.".into(),
                format: None,
                tags: vec![],
            },
        )
        .await?;

    tracing::info!("seed data written");

    println!("Seeded demo data.");
    println!("  owner user id: {}", owner.id);
    println!("  admin user id: {}", admin.id);
    println!("  bot '{}' key: {}", drafter.bot.name, drafter.api_key);
    println!("  bot '{}' key: {}", publisher.bot.name, publisher.api_key);

    #[cfg(feature = "auth-jwt")]
    {
        let sessions = JwtSessionProvider::new(config.auth.session_secret.clone());
        println!(
            "  owner session token: {}",
            sessions.issue_session_token(owner.id, config.auth.session_ttl_hours)
        );
        println!(
            "  admin session token: {}",
            sessions.issue_session_token(admin.id, config.auth.session_ttl_hours)
        );
    }

    Ok(())
}
