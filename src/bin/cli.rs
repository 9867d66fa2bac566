//! oaigate CLI
//!
//! Run one protocol request against the notification API without a server,
//! or look inside a resumption token.

use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use oaigate::backend::JperClient;
use oaigate::cursor::{self, Scope};
use oaigate::dates::format_datestamp;
use oaigate::protocol::Request;
use oaigate::{render, Config, Engine};
use tracing_subscriber::{fmt, EnvFilter};

/// oaigate CLI
#[derive(Parser, Debug)]
#[command(name = "oaigate-cli")]
#[command(about = "CLI for the oaigate OAI-PMH gateway")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Execute a protocol request and print the XML response
    Request {
        /// Protocol verb, e.g. ListRecords
        #[arg(short, long)]
        verb: String,

        /// Restrict to one repository instead of all notifications
        #[arg(short, long)]
        repo: Option<String>,

        /// Extra arguments as name=value (repeatable)
        #[arg(short, long = "arg", value_name = "NAME=VALUE")]
        args: Vec<String>,
    },

    /// Decode a resumption token and print its contents
    InspectToken {
        /// The token text
        token: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    match Args::parse().command {
        Commands::Request { verb, repo, args } => {
            let config = Config::from_env().context("reading configuration")?;
            let client = JperClient::new(&config).context("building backend client")?;
            let engine = Engine::new(config, Arc::new(client));

            let mut pairs = vec![("verb".to_string(), verb)];
            for arg in args {
                let Some((name, value)) = arg.split_once('=') else {
                    bail!("argument {arg:?} is not NAME=VALUE");
                };
                pairs.push((name.to_string(), value.to_string()));
            }

            let scope = repo.map_or(Scope::Global, Scope::Repository);
            let base_url = match scope.repository_id() {
                Some(id) => format!("http://{}/oaipmh/repo/{id}", engine.config().listen_addr),
                None => format!("http://{}/oaipmh/all", engine.config().listen_addr),
            };

            let response = engine.handle(Request::from_pairs(scope, pairs)).await;
            println!("{}", render::render(&response, &base_url)?);
        }
        Commands::InspectToken { token } => {
            let decoded = cursor::decode(&token)?;
            let lifetime = Config::from_env()
                .context("reading configuration")?
                .token_lifetime;
            let c = &decoded.cursor;

            println!("scope:           {}", c.scope());
            println!("metadataPrefix:  {}", c.metadata_prefix());
            println!("from:            {}", c.from().as_ref().map_or("-".to_string(), format_datestamp));
            println!("until:           {}", c.until().as_ref().map_or("-".to_string(), format_datestamp));
            println!("page:            {}", c.page());
            println!("issued:          {}", format_datestamp(&decoded.issued_at));
            println!("expires:         {}", format_datestamp(&decoded.expires_at(lifetime)));
        }
    }

    Ok(())
}
