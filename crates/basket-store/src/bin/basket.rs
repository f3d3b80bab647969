//! # basket
//!
//! Inspects and edits a file-backed cart from the shell.
//!
//! ## Usage
//! ```bash
//! # Show the default cart
//! cargo run -p basket-store --bin basket -- show
//!
//! # Add an item (JSON map or list of maps)
//! cargo run -p basket-store --bin basket -- add '{"id": 1, "name": "Tee", "qty": 2, "price": 15}'
//!
//! # Work on another storage key with a custom settings file
//! cargo run -p basket-store --bin basket -- --config ./basket.toml --key session-42 discount 10%
//! ```
//!
//! Logging goes to stderr and follows `RUST_LOG` (default `warn,basket=info`).

use serde_json::Value;
use std::env;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use basket_core::{Adjustment, Cart, CartStore, ItemInput, RowSelector};
use basket_store::{open_cart, Settings};

const USAGE: &str = "\
basket - file-backed shopping cart

Usage: basket [OPTIONS] <COMMAND>

Commands:
  show                 Print the cart record and totals
  add <json>           Add an item map or a list of item maps
  update <json>        Update items (maps must carry rowId)
  remove <rowId>       Remove one line
  discount <value>     Set the cart discount (\"10%\" or \"5\")
  tax <value>          Set the cart tax (\"10%\" or \"5\")
  clear                Empty the cart and delete its file

Options:
  -c, --config <PATH>  Settings file (default: platform config dir/basket.toml)
  -k, --key <KEY>      Storage key (overrides settings)
  -h, --help           Show this help message";

#[derive(Debug, PartialEq)]
enum Command {
    Show,
    Add(String),
    Update(String),
    Remove(String),
    Discount(String),
    Tax(String),
    Clear,
}

#[derive(Debug, PartialEq)]
struct Invocation {
    config: Option<PathBuf>,
    key: Option<String>,
    command: Command,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let invocation = match parse_args(&args)? {
        Some(invocation) => invocation,
        None => {
            println!("{USAGE}");
            return Ok(());
        }
    };

    let mut settings = Settings::load(invocation.config)?;
    if let Some(key) = invocation.key {
        settings.cart.storage_key = key;
        settings.validate()?;
    }

    let mut cart = open_cart(&settings)?;
    info!(key = %cart.storage_key(), items = cart.len(), "Opened cart");

    let mutated = run(&mut cart, invocation.command)?;
    if mutated && !cart.is_auto_save() {
        cart.save()?;
    }

    Ok(())
}

/// Applies `command`. Returns whether the cart needs saving afterwards.
fn run<S: CartStore>(
    cart: &mut Cart<S>,
    command: Command,
) -> Result<bool, Box<dyn std::error::Error>> {
    match command {
        Command::Show => {
            print_cart(cart)?;
            Ok(false)
        }
        Command::Add(json) => {
            cart.add(ItemInput::try_from(serde_json::from_str::<Value>(&json)?)?)?;
            print_cart(cart)?;
            Ok(true)
        }
        Command::Update(json) => {
            cart.update(ItemInput::try_from(serde_json::from_str::<Value>(&json)?)?)?;
            print_cart(cart)?;
            Ok(true)
        }
        Command::Remove(row_id) => {
            cart.remove(RowSelector::from(row_id))?;
            print_cart(cart)?;
            Ok(true)
        }
        Command::Discount(value) => {
            cart.set_discount(Adjustment::parse(&value))?;
            print_cart(cart)?;
            Ok(true)
        }
        Command::Tax(value) => {
            cart.set_tax(Adjustment::parse(&value))?;
            print_cart(cart)?;
            Ok(true)
        }
        Command::Clear => {
            cart.clear()?;
            println!("Cart '{}' cleared", cart.storage_key());
            Ok(false)
        }
    }
}

fn print_cart<S: CartStore>(cart: &Cart<S>) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(&cart.to_record())?);
    println!();
    println!("Lines:    {}", cart.len());
    println!("Quantity: {}", cart.total_qty());
    println!("Discount: {}", cart.discount());
    println!("Tax:      {}", cart.tax());
    println!("Total:    {:.2}", cart.total());
    Ok(())
}

/// Parses `args` (including the program name). `Ok(None)` means help was asked for.
fn parse_args(args: &[String]) -> Result<Option<Invocation>, String> {
    let mut config = None;
    let mut key = None;
    let mut positional: Vec<String> = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                let value = args.get(i + 1).ok_or("--config needs a path")?;
                config = Some(PathBuf::from(value));
                i += 1;
            }
            "--key" | "-k" => {
                let value = args.get(i + 1).ok_or("--key needs a storage key")?;
                key = Some(value.clone());
                i += 1;
            }
            "--help" | "-h" => return Ok(None),
            _ => positional.push(args[i].clone()),
        }
        i += 1;
    }

    let mut positional = positional.into_iter();
    let name = match positional.next() {
        Some(name) => name,
        None => return Ok(None),
    };
    let mut argument = |what: &str| {
        positional
            .next()
            .ok_or_else(|| format!("'{name}' needs {what}"))
    };

    let command = match name.as_str() {
        "show" => Command::Show,
        "add" => Command::Add(argument("an item JSON")?),
        "update" => Command::Update(argument("an item JSON")?),
        "remove" => Command::Remove(argument("a row id")?),
        "discount" => Command::Discount(argument("a value")?),
        "tax" => Command::Tax(argument("a value")?),
        "clear" => Command::Clear,
        other => return Err(format!("unknown command '{other}'\n\n{USAGE}")),
    };

    Ok(Some(Invocation {
        config,
        key,
        command,
    }))
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=basket_core=trace` - Trace cart internals only
/// - Default: warnings, plus info from the basket crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,basket=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
