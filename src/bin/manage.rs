//! Project management commands, the `manage.py` of the polls site

use anyhow::Context;
use chrono::{DateTime, TimeDelta, Utc};
use clap::{Parser, Subcommand};
use polls_conf::Settings;
use polls_db::{DatabaseConnection, Migrator};
use polls_server::{HttpServer, ShutdownCoordinator, shutdown_signal};
use polls_site::apps::polls::migrations::MIGRATIONS;
use polls_site::apps::polls::{Choice, Question};
use polls_site::{build_application, config, logging};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration as StdDuration;

const SHUTDOWN_TIMEOUT: StdDuration = StdDuration::from_secs(30);

#[derive(Parser)]
#[command(name = "manage", about = "Polls site management")]
struct Cli {
	/// Directory holding base.toml and the profile files
	#[arg(long, global = true, default_value = "settings")]
	settings_dir: PathBuf,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
enum Command {
	/// Apply migrations and serve the site
	Runserver {
		/// Address to bind, overriding `bind_address`
		addr: Option<SocketAddr>,
	},
	/// Apply pending migrations
	Migrate,
	/// Validate settings and the admin configuration
	Check,
	/// Print every named route
	Showurls,
	/// Create a question, optionally with choices
	Createquestion {
		text: String,
		/// Publication offset in days from now; negative is the past
		#[arg(long, default_value_t = 0, allow_hyphen_values = true)]
		days: i64,
		#[arg(long = "choice")]
		choices: Vec<String>,
	},
}

async fn connect(settings: &Settings) -> anyhow::Result<DatabaseConnection> {
	DatabaseConnection::connect(&settings.database_url)
		.await
		.with_context(|| format!("cannot open database {}", settings.database_url))
}

async fn migrate(conn: &DatabaseConnection) -> anyhow::Result<()> {
	let ran = Migrator::new().with_migrations(MIGRATIONS).run(conn).await?;
	if ran.is_empty() {
		tracing::info!("no migrations to apply");
	}
	Ok(())
}

async fn runserver(settings: Settings, addr: Option<SocketAddr>) -> anyhow::Result<()> {
	let addr = match addr {
		Some(addr) => addr,
		None => settings
			.bind_address
			.parse()
			.context("bind_address is not a socket address")?,
	};
	let conn = connect(&settings).await?;
	migrate(&conn).await?;

	let application = build_application(&settings, conn.clone())?;
	let coordinator = ShutdownCoordinator::new(SHUTDOWN_TIMEOUT);
	let signal_coordinator = coordinator.clone();
	tokio::spawn(async move {
		shutdown_signal().await;
		signal_coordinator.shutdown();
	});

	HttpServer::new(application)
		.listen_with_shutdown(addr, coordinator)
		.await?;
	conn.close().await;
	Ok(())
}

fn showurls(settings: &Settings) -> anyhow::Result<()> {
	let site = config::admin::configure_admin(settings)?;
	let router = config::urls::routes(site);
	for route in router.routes() {
		println!(
			"{:<60} {}",
			route.pattern.as_str(),
			route.full_name().unwrap_or_default()
		);
	}
	Ok(())
}

/// `days` from `now`, or `None` when the result is not representable
fn offset_by_days(now: DateTime<Utc>, days: i64) -> Option<DateTime<Utc>> {
	TimeDelta::try_days(days).and_then(|offset| now.checked_add_signed(offset))
}

async fn createquestion(
	settings: &Settings,
	text: &str,
	days: i64,
	choices: &[String],
) -> anyhow::Result<()> {
	let conn = connect(settings).await?;
	migrate(&conn).await?;

	let pub_date = offset_by_days(Utc::now(), days)
		.with_context(|| format!("--days {} is out of range", days))?;
	let question = Question::create(&conn, text, pub_date)
		.await
		.context("cannot create question")?;
	for choice in choices {
		Choice::create(&conn, &question, choice).await?;
	}
	println!("Created question {} \"{}\"", question.id, question.question_text);
	Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	let settings = Settings::load(&cli.settings_dir)
		.with_context(|| format!("cannot load settings from {}", cli.settings_dir.display()))?;
	settings.validate()?;
	logging::init(&settings.log_level)?;

	match cli.command {
		Command::Runserver { addr } => runserver(settings, addr).await,
		Command::Migrate => {
			let conn = connect(&settings).await?;
			migrate(&conn).await
		}
		Command::Check => {
			config::admin::configure_admin(&settings)?;
			config::templates::template_engine()?;
			println!("System check identified no issues.");
			Ok(())
		}
		Command::Showurls => showurls(&settings),
		Command::Createquestion {
			text,
			days,
			choices,
		} => createquestion(&settings, &text, days, &choices).await,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;
	use rstest::rstest;

	#[rstest]
	#[case(-30, true)]
	#[case(0, true)]
	#[case(i64::MAX, false)]
	#[case(i64::MIN, false)]
	#[case(1_000_000_000, false)]
	fn test_offset_by_days(#[case] days: i64, #[case] representable: bool) {
		let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

		assert_eq!(offset_by_days(now, days).is_some(), representable);
	}
}
