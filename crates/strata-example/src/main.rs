//! `strata-demo` builds the template tree in `templates/` and renders profile
//! pages with sample data, or with JSON given on the command line.
//!
//! ```bash
//! strata-demo --list
//! strata-demo profile/view
//! strata-demo profile/edit --data '{"title": "Edit", "user": {"name": "Ann"}}'
//! RUST_LOG=strata=debug strata-demo profile/payment/methods
//! ```

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use strata::{Config, DirTree, Registry};
use tracing::info;

#[derive(Parser)]
#[command(name = "strata-demo")]
#[command(about = "Render templates from a layered template directory")]
struct Cli {
    /// Template directory, relative to the working directory.
    #[arg(long, default_value = "templates")]
    dir: PathBuf,

    /// File name of layout templates.
    #[arg(long, default_value = strata::DEFAULT_LAYOUT_FILENAME)]
    layout: String,

    /// Directory name of partials.
    #[arg(long, default_value = strata::DEFAULT_INCLUDE_DIR_NAME)]
    include_dir: String,

    /// JSON data to render with instead of the built-in sample.
    #[arg(long)]
    data: Option<String>,

    /// Print the available template identifiers and exit.
    #[arg(long)]
    list: bool,

    /// Templates to render; all sample templates if omitted.
    names: Vec<String>,
}

#[derive(Serialize)]
struct User {
    name: String,
    address: String,
    subscription: String,
}

#[derive(Serialize)]
struct PaymentMethod {
    id: String,
    title: String,
}

#[derive(Serialize)]
struct ProfileParams {
    title: String,
    user: User,
}

#[derive(Serialize)]
struct PaymentMethodsParams {
    title: String,
    payment_methods: Vec<PaymentMethod>,
}

fn sample_user() -> User {
    User {
        name: "John Doe".into(),
        address: "Mainstreet 1st".into(),
        subscription: "Premium".into(),
    }
}

/// Sample data for the templates shipped with the example.
fn sample_data(name: &str) -> Option<serde_json::Value> {
    let value = match name {
        "profile/view" => serde_json::to_value(ProfileParams {
            title: "Profile".into(),
            user: sample_user(),
        }),
        "profile/edit" => serde_json::to_value(ProfileParams {
            title: "Profile Edit".into(),
            user: sample_user(),
        }),
        "profile/payment/methods" => serde_json::to_value(PaymentMethodsParams {
            title: "Payment methods".into(),
            payment_methods: vec![
                PaymentMethod {
                    id: "debit".into(),
                    title: "Debit card".into(),
                },
                PaymentMethod {
                    id: "cc".into(),
                    title: "Credit card".into(),
                },
                PaymentMethod {
                    id: "paypal".into(),
                    title: "Paypal".into(),
                },
            ],
        }),
        _ => return None,
    };
    value.ok()
}

fn config(cli: &Cli) -> Config {
    Config::new()
        .layout_filename(&cli.layout)
        .include_dir_name(&cli.include_dir)
        .function("uppercase", |s: String| s.to_uppercase())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let registry = Registry::build(&DirTree::cwd(), &cli.dir, &config(&cli))
        .with_context(|| format!("failed to build templates from {}", cli.dir.display()))?;
    info!(templates = registry.len(), "templates ready");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if cli.list {
        for name in registry.names() {
            writeln!(out, "{name}")?;
        }
        return Ok(());
    }

    let names = if cli.names.is_empty() {
        vec![
            "profile/view".to_string(),
            "profile/edit".to_string(),
            "profile/payment/methods".to_string(),
        ]
    } else {
        cli.names.clone()
    };

    let explicit = match &cli.data {
        Some(raw) => Some(serde_json::from_str::<serde_json::Value>(raw).context("invalid --data JSON")?),
        None => None,
    };

    for name in &names {
        let data = match (&explicit, sample_data(name)) {
            (Some(data), _) => data.clone(),
            (None, Some(sample)) => sample,
            (None, None) => bail!("no sample data for \"{name}\", pass --data"),
        };
        registry.execute(name, &mut out, &data)?;
        writeln!(out)?;
    }

    Ok(())
}
