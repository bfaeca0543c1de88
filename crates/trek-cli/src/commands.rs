//! Non-interactive subcommands.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use trek_core::place::NewPlace;
use trek_planner::{Session, labels::Locale};
use trek_store_sqlite::SqliteStore;

use crate::{Command, PlaceCommand, UserCommand};

type TrekSession = Session<SqliteStore>;

pub async fn run(session: &TrekSession, command: Command, export_dir: &Path) -> Result<()> {
  match command {
    Command::Export { out } => {
      let dir = out.map_or_else(|| export_dir.to_path_buf(), |d| crate::expand_tilde(&d));
      export(session, &dir).await
    }
    Command::User { action } => user(session, action).await,
    Command::Place { action } => place(session, action).await,
  }
}

/// Log the detailed failure, surface the user-facing message.
fn friendly(locale: Locale) -> impl Fn(trek_planner::Error) -> anyhow::Error {
  move |e| {
    tracing::warn!(error = %e, "command failed");
    anyhow!(e.user_message(locale))
  }
}

async fn export(session: &TrekSession, dir: &Path) -> Result<()> {
  let document = session.export().await.map_err(friendly(session.locale()))?;
  let path = document
    .write_to(dir)
    .map_err(friendly(session.locale()))
    .with_context(|| format!("writing export to {}", dir.display()))?;
  println!("{}", path.display());
  Ok(())
}

async fn user(session: &TrekSession, action: UserCommand) -> Result<()> {
  let locale = session.locale();
  let identity = session.identity();

  match action {
    UserCommand::List => {
      let users = identity
        .refresh_users(session.store().as_ref())
        .await
        .map_err(friendly(locale))?;
      let active = identity.active_id();
      for user in users {
        let marker = if Some(user.user_id) == active { '*' } else { ' ' };
        println!("{marker} {}  {}", user.user_id, user.name);
      }
    }
    UserCommand::Add { name } => {
      let user = session.profiles().create(&name).await.map_err(friendly(locale))?;
      println!("{}  {}", user.user_id, user.name);
    }
    UserCommand::Rename { id, name } => {
      let user = session.profiles().rename(id, &name).await.map_err(friendly(locale))?;
      println!("{}  {}", user.user_id, user.name);
    }
    UserCommand::Use { name } => {
      let user = identity
        .find_by_name(&name)
        .with_context(|| format!("no profile named {name:?}"))?;
      identity.select(user).map_err(friendly(locale))?;
    }
    UserCommand::Clear => identity.clear().map_err(friendly(locale))?,
  }
  Ok(())
}

async fn place(session: &TrekSession, action: PlaceCommand) -> Result<()> {
  let locale = session.locale();
  let PlaceCommand::Add { name, region, lat, lon, route } = action;

  let input = NewPlace {
    region,
    latitude: lat,
    longitude: lon,
    ..NewPlace::new(name)
  };
  let place = session
    .suggestions()
    .add_place(input)
    .await
    .map_err(friendly(locale))?;
  println!("{}  {}", place.place_id, place.name);

  if route {
    let item = session
      .route()
      .append(place.place_id)
      .await
      .map_err(friendly(locale))?;
    println!("route stop #{}", item.order_index);
  }
  Ok(())
}
