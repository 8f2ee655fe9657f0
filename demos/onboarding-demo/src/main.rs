//! onboarding-demo
//!
//! Loads a TOML stepper, resolves where a returning user should land and
//! walks the flow forwards and backwards.
//!
//! Run with `RUST_LOG=debug` to see every predicate evaluation.

use std::time::Duration;

use anyhow::Result;
use waypoint::prelude::*;
use waypoint::runtime::telemetry::init_stdout_tracing;

const MANIFEST: &str = include_str!("../onboarding.toml");

/// What the demo "backend" knows about the visitor.
struct Account {
    signed_in: bool,
    avatar_url: Option<String>,
    team_invite: Option<String>,
}

fn registry() -> PredicateRegistry {
    let mut registry = PredicateRegistry::new();
    registry
        .register(
            "signed_in",
            predicate::try_from_fn(|bus| Ok(bus.require::<Account>()?.signed_in)),
        )
        .register(
            "has_avatar",
            predicate::from_fn(|bus| {
                bus.get::<Account>()
                    .is_some_and(|account| account.avatar_url.is_some())
            }),
        )
        .register(
            "invited_to_team",
            predicate::from_async_fn(|bus| {
                Box::pin(async move {
                    // Stands in for a remote lookup.
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Ok(bus.require::<Account>()?.team_invite.is_some())
                })
            }),
        );
    registry
}

#[tokio::main]
async fn main() -> Result<()> {
    init_stdout_tracing();

    let graph = GraphManifest::from_toml_str(MANIFEST)?.build(&registry())?;
    let bus = Bus::new().with(Account {
        signed_in: true,
        avatar_url: Some("https://example.com/a.png".to_string()),
        team_invite: Some("acme".to_string()),
    });

    let mut navigator = Navigator::start(&graph, &bus).await?;
    let mut watcher = navigator.subscribe();
    tokio::spawn(async move {
        while watcher.changed().await.is_ok() {
            let address = watcher.borrow_and_update().clone();
            tracing::info!(%address, "Current step changed");
        }
    });

    println!("flow: {}", navigator.sequence().to_json());
    println!("landing on {}", navigator.current());

    loop {
        match navigator.next(&bus).await? {
            Movement::Moved { to, .. } => println!("next -> {to}"),
            stay => {
                println!("next stopped: {stay:?}");
                break;
            }
        }
    }

    let movement = navigator.previous(&bus).await?;
    println!("previous from {}: {movement:?}", navigator.current());

    Ok(())
}
