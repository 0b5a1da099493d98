//! # precio
//!
//! Command-line front end for the pricing engine. Every command prints its
//! result as pretty JSON on stdout; logs go to stderr.
//!
//! ## Usage
//! ```bash
//! # Final price from cost, margin and VAT
//! precio quote --cost 100 --tax-flat 10 --margin 20 --vat 21
//!
//! # Margin needed to hit a target price
//! precio margin --cost 100 --tax-flat 10 --price 159.72 --vat 21
//!
//! # Unit price for a quantity on a price list
//! precio resolve --data product.json --qty 3 --list L4 --last L1
//!
//! # Sale totals from a JSON array of lines
//! precio totals --lines sale.json
//!
//! # Recalculate a saved price sheet, optionally with a new cost
//! precio sheet --sheet sheet.json --cost 125
//! ```
//!
//! Settings come from `--config <path>` or the platform default location,
//! with `PRECIO_*` environment overrides on top.

use precio_config::PricingSettings;
use precio_core::pricing::inverse_pricing;
use precio_core::validation::{
    validate_cost_basis, validate_label, validate_price_data, validate_quantity, validate_sale_line,
    validate_target_price, validate_vat_rate,
};
use precio_core::{
    calculate_totals, direct_pricing, CostBasis, Money, Percent, PriceData, PriceListId, PriceSheet, RoundingMode,
    SaleLine,
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
Usage: precio [--config <PATH>] <COMMAND> [OPTIONS]

Commands:
  quote    --cost <N> --margin <PCT> [--vat <PCT>] [--tax-flat <N>] [--tax-percent <PCT>] [--mode <MODE>]
  margin   --cost <N> --price <N> [--vat <PCT>] [--tax-flat <N>] [--tax-percent <PCT>] [--mode <MODE>]
  resolve  --data <FILE> --qty <N> --list <LIST> [--last <LIST>]
  totals   --lines <FILE>
  sheet    --sheet <FILE> [--cost <N>]

Options:
  -c, --config <PATH>  Settings file (default: platform config dir/pricing.toml)
  -h, --help           Show this help message

MODE is half_up, up or down. LIST is L1, L2, L3, L4 or PUBLIC.";

// =============================================================================
// Argument Parsing
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Quote,
    Margin,
    Resolve,
    Totals,
    Sheet,
    Help,
}

#[derive(Debug, Clone, PartialEq)]
struct Invocation {
    config: Option<PathBuf>,
    command: Command,
    options: HashMap<String, String>,
}

impl Invocation {
    fn parse(args: &[String]) -> Result<Self, String> {
        let mut config = None;
        let mut command = None;
        let mut options = HashMap::new();

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--help" | "-h" => {
                    command = Some(Command::Help);
                }
                "--config" | "-c" => {
                    let value = args.get(i + 1).ok_or("--config needs a path")?;
                    config = Some(PathBuf::from(value));
                    i += 1;
                }
                flag if flag.starts_with("--") => {
                    let value = args
                        .get(i + 1)
                        .ok_or_else(|| format!("{} needs a value", flag))?;
                    options.insert(flag.trim_start_matches("--").to_string(), value.clone());
                    i += 1;
                }
                word if command.is_none() => {
                    command = Some(match word {
                        "quote" => Command::Quote,
                        "margin" => Command::Margin,
                        "resolve" => Command::Resolve,
                        "totals" => Command::Totals,
                        "sheet" => Command::Sheet,
                        other => return Err(format!("unknown command '{}'", other)),
                    });
                }
                other => return Err(format!("unexpected argument '{}'", other)),
            }
            i += 1;
        }

        Ok(Invocation {
            config,
            command: command.unwrap_or(Command::Help),
            options,
        })
    }

    fn raw(&self, key: &str) -> Result<&str, String> {
        self.options
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| format!("missing --{}", key))
    }

    fn decimal(&self, key: &str) -> Result<Decimal, String> {
        let raw = self.raw(key)?;
        raw.parse()
            .map_err(|e| format!("--{}: '{}' is not a number ({})", key, raw, e))
    }

    fn decimal_or(&self, key: &str, default: Decimal) -> Result<Decimal, String> {
        if self.options.contains_key(key) {
            self.decimal(key)
        } else {
            Ok(default)
        }
    }

    fn percent_or(&self, key: &str, default: Percent) -> Result<Percent, String> {
        self.decimal_or(key, default.value()).map(Percent::new)
    }

    fn list(&self, key: &str) -> Result<PriceListId, String> {
        self.raw(key)?.parse().map_err(|e| format!("--{}: {}", key, e))
    }

    fn mode_or(&self, default: RoundingMode) -> Result<RoundingMode, String> {
        match self.options.get("mode") {
            Some(raw) => raw.parse().map_err(|e| format!("--mode: {}", e)),
            None => Ok(default),
        }
    }

    fn cost_basis(&self) -> Result<CostBasis, String> {
        let basis = CostBasis::with_internal_tax(
            self.decimal("cost")?,
            self.decimal_or("tax-flat", Decimal::ZERO)?,
            self.percent_or("tax-percent", Percent::zero())?,
        );
        validate_cost_basis(&basis).map_err(|e| e.to_string())?;
        Ok(basis)
    }

    fn vat_or(&self, default: Percent) -> Result<Percent, String> {
        let vat = self.percent_or("vat", default)?;
        validate_vat_rate(vat).map_err(|e| e.to_string())?;
        Ok(vat)
    }

    /// Target price from `--price`, required to be whole cents.
    fn target_price(&self) -> Result<Money, String> {
        let price = self.decimal("price")?;
        validate_target_price(price).map_err(|e| e.to_string())?;
        Money::checked_from_decimal(price, RoundingMode::HalfUp)
            .ok_or_else(|| format!("--price {} is too large", price))
    }
}

// =============================================================================
// Commands
// =============================================================================

/// Executes one command, writing its JSON result to `out`.
///
/// Every input is validated before it reaches the engine.
fn run<W: Write>(
    invocation: &Invocation,
    settings: &PricingSettings,
    out: &mut W,
) -> Result<(), Box<dyn std::error::Error>> {
    match invocation.command {
        Command::Help => {
            writeln!(out, "{}", USAGE)?;
            Ok(())
        }
        Command::Quote => {
            let basis = invocation.cost_basis()?;
            let margin = invocation.percent_or("margin", settings.pricing.default_margin_percent)?;
            let vat = invocation.vat_or(settings.pricing.default_vat_percent)?;
            let mode = invocation.mode_or(settings.rounding_mode())?;
            print_json(out, &direct_pricing(&basis, margin, vat, mode)?)
        }
        Command::Margin => {
            let basis = invocation.cost_basis()?;
            let vat = invocation.vat_or(settings.pricing.default_vat_percent)?;
            let mode = invocation.mode_or(settings.rounding_mode())?;
            let price = invocation.target_price()?;
            print_json(out, &inverse_pricing(&basis, price, vat, mode)?)
        }
        Command::Resolve => {
            let data: PriceData = read_json(invocation.raw("data")?)?;
            validate_price_data(&data)?;
            let quantity = invocation.decimal("qty")?;
            validate_quantity(quantity)?;
            let requested = invocation.list("list")?;
            let last = if invocation.options.contains_key("last") {
                invocation.list("last")?
            } else {
                PriceListId::Public
            };
            print_json(out, &settings.resolver().resolve(&data, quantity, requested, last))
        }
        Command::Totals => {
            let lines: Vec<SaleLine> = read_json(invocation.raw("lines")?)?;
            for line in &lines {
                validate_sale_line(line)?;
            }
            debug!(lines = lines.len(), "Calculating sale totals");
            print_json(out, &calculate_totals(&lines)?)
        }
        Command::Sheet => {
            let mut sheet: PriceSheet = read_json(invocation.raw("sheet")?)?;
            validate_cost_basis(sheet.cost_basis())?;
            validate_vat_rate(sheet.vat())?;
            for row in sheet.rows() {
                validate_label(&row.label)?;
            }

            let changed = if invocation.options.contains_key("cost") {
                let basis = CostBasis {
                    cost: invocation.decimal("cost")?,
                    ..*sheet.cost_basis()
                };
                validate_cost_basis(&basis)?;
                sheet.set_cost_basis(basis)?
            } else {
                sheet.recalculate()?
            };
            info!(changed, "Price sheet recalculated");
            print_json(out, &sheet)
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path, e))?;
    Ok(serde_json::from_str(&contents)?)
}

fn print_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<(), Box<dyn std::error::Error>> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Initializes the tracing subscriber for logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Verbose output including recalculation passes
/// - `RUST_LOG=info` - Normal operation (default)
/// - `RUST_LOG=warn` - Only warnings and errors
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,precio=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads settings (skipped for `--help`) and runs against stdout.
fn execute(invocation: &Invocation) -> Result<(), Box<dyn std::error::Error>> {
    let settings = if invocation.command == Command::Help {
        PricingSettings::default()
    } else {
        PricingSettings::load(invocation.config.clone())?
    };

    let stdout = io::stdout();
    run(invocation, &settings, &mut stdout.lock())
}

fn main() {
    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let invocation = match Invocation::parse(&args) {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("error: {}\n\n{}", e, USAGE);
            process::exit(2);
        }
    };

    if let Err(e) = execute(&invocation) {
        error!(command = ?invocation.command, "Command failed");
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_parse_quote() {
        let inv = Invocation::parse(&args("quote --cost 100 --tax-flat 10 --margin 20")).unwrap();
        assert_eq!(inv.command, Command::Quote);
        assert_eq!(inv.config, None);

        let basis = inv.cost_basis().unwrap();
        assert_eq!(basis.cost, dec!(100));
        assert_eq!(basis.internal_tax_amount, dec!(10));
        assert!(basis.internal_tax_percent.is_zero());
        assert_eq!(inv.percent_or("vat", Percent::new(dec!(21))).unwrap().value(), dec!(21));
    }

    #[test]
    fn test_parse_config_before_command() {
        let inv = Invocation::parse(&args("--config ./pricing.toml resolve --data p.json --qty 3 --list l4")).unwrap();
        assert_eq!(inv.command, Command::Resolve);
        assert_eq!(inv.config, Some(PathBuf::from("./pricing.toml")));
        assert_eq!(inv.list("list").unwrap(), PriceListId::L4);
        assert_eq!(inv.decimal("qty").unwrap(), dec!(3));
    }

    #[test]
    fn test_no_command_is_help() {
        assert_eq!(Invocation::parse(&[]).unwrap().command, Command::Help);
        assert_eq!(Invocation::parse(&args("quote -h")).unwrap().command, Command::Help);
    }

    #[test]
    fn test_parse_errors() {
        assert!(Invocation::parse(&args("discount --cost 1")).is_err());
        assert!(Invocation::parse(&args("quote --cost")).is_err());
        assert!(Invocation::parse(&args("quote totals")).is_err());

        let inv = Invocation::parse(&args("quote --cost abc --mode sideways")).unwrap();
        assert!(inv.decimal("cost").is_err());
        assert!(inv.decimal("margin").is_err());
        assert!(inv.mode_or(RoundingMode::HalfUp).is_err());
    }

    #[test]
    fn test_mode_defaults_to_settings() {
        let inv = Invocation::parse(&args("margin --cost 100 --price 159.72")).unwrap();
        assert_eq!(inv.mode_or(RoundingMode::Down).unwrap(), RoundingMode::Down);

        let inv = Invocation::parse(&args("margin --cost 100 --price 159.72 --mode up")).unwrap();
        assert_eq!(inv.mode_or(RoundingMode::Down).unwrap(), RoundingMode::Up);
    }

    // =========================================================================
    // Command Execution
    // =========================================================================

    fn temp_json(name: &str, contents: &str) -> String {
        let dir = std::env::temp_dir().join(format!("precio-cli-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn try_run(line: &str) -> Result<String, Box<dyn std::error::Error>> {
        let inv = Invocation::parse(&args(line)).unwrap();
        let mut out = Vec::new();
        run(&inv, &PricingSettings::default(), &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    fn run_json(line: &str) -> serde_json::Value {
        serde_json::from_str(&try_run(line).unwrap()).unwrap()
    }

    fn decimal_field(value: &serde_json::Value) -> Decimal {
        value.as_str().unwrap().parse().unwrap()
    }

    const PRODUCT: &str = r#"{
        "pricePublic": 220000,
        "priceLists": { "L2": 278300, "L4": { "price": 200000, "minQty": 3 } }
    }"#;

    const SHEET: &str = r#"{
        "costBasis": { "cost": "100", "internalTaxAmount": "10" },
        "vat": "21",
        "rows": [
            { "label": "List 1", "mode": "direct", "marginPercent": "20", "finalPrice": 0 },
            { "label": "List 4", "mode": "inverse", "marginPercent": "0", "finalPrice": 15972 }
        ]
    }"#;

    #[test]
    fn test_help_prints_usage() {
        assert!(try_run("--help").unwrap().starts_with("Usage: precio"));
    }

    #[test]
    fn test_quote_command() {
        let json = run_json("quote --cost 100 --tax-flat 10 --margin 20 --vat 21");
        assert_eq!(json, serde_json::json!({ "net": 13200, "final": 15972 }));

        // Margin and VAT fall back to the settings defaults (30%, 21%).
        let json = run_json("quote --cost 100");
        assert_eq!(json["final"], 15730);
    }

    #[test]
    fn test_margin_command() {
        let json = run_json("margin --cost 100 --tax-flat 10 --price 159.72 --vat 21");
        assert_eq!(decimal_field(&json["margin"]), dec!(20));
        assert_eq!(json["net"], 13200);
    }

    #[test]
    fn test_resolve_command() {
        let data = temp_json("resolve-product.json", PRODUCT);

        let json = run_json(&format!("resolve --data {} --qty 3 --list L4 --last L2", data));
        assert_eq!(json, serde_json::json!({ "price": 200000, "used": "L4" }));

        let json = run_json(&format!("resolve --data {} --qty 1 --list L4 --last L2", data));
        assert_eq!(json["used"], "L2");
        assert_eq!(json["price"], 278300);
    }

    #[test]
    fn test_totals_command() {
        let lines = temp_json(
            "totals-lines.json",
            r#"[
                { "quantity": 2, "unitPrice": "100", "taxRate": "21", "discount": "10" },
                { "quantity": 1, "unitPrice": "50", "taxRate": "21" }
            ]"#,
        );

        let json = run_json(&format!("totals --lines {}", lines));
        assert_eq!(json["subtotal"], 23000);
        assert_eq!(json["taxAmount"], 4830);
        assert_eq!(json["discountAmount"], 2000);
        assert_eq!(json["total"], 27830);
    }

    #[test]
    fn test_sheet_command() {
        let sheet = temp_json("sheet.json", SHEET);

        let json = run_json(&format!("sheet --sheet {}", sheet));
        assert_eq!(json["rows"][0]["finalPrice"], 15972);
        assert_eq!(decimal_field(&json["rows"][1]["marginPercent"]), dec!(20));

        // New cost keeps the flat internal tax: (125 + 10) × 1.2 × 1.21.
        let json = run_json(&format!("sheet --sheet {} --cost 125", sheet));
        assert_eq!(decimal_field(&json["costBasis"]["cost"]), dec!(125));
        assert_eq!(json["rows"][0]["finalPrice"], 19602);
        assert_eq!(json["rows"][1]["finalPrice"], 15972);
    }

    // =========================================================================
    // Input Rejection
    // =========================================================================

    #[test]
    fn test_rejects_invalid_cost_and_vat() {
        assert!(try_run("quote --cost -1 --margin 20").is_err());
        assert!(try_run("quote --cost 100 --tax-flat -5").is_err());
        assert!(try_run("quote --cost 100 --vat 250").is_err());

        let err = try_run("margin --cost 100 --price 10 --vat -100").unwrap_err();
        assert!(err.to_string().contains("vat"));
    }

    #[test]
    fn test_rejects_sub_cent_or_huge_target_price() {
        let err = try_run("margin --cost 100 --price 159.725").unwrap_err();
        assert!(err.to_string().contains("price"));

        assert!(try_run("margin --cost 100 --price 1000000000000000000").is_err());
    }

    #[test]
    fn test_rejects_non_positive_quantity() {
        let data = temp_json("reject-product.json", PRODUCT);
        let err = try_run(&format!("resolve --data {} --qty -5 --list L2", data)).unwrap_err();
        assert_eq!(err.to_string(), "quantity must be positive");

        let bad_promo = temp_json(
            "reject-promo.json",
            r#"{ "pricePublic": 100, "priceLists": { "L4": { "price": 90, "minQty": 0 } } }"#,
        );
        assert!(try_run(&format!("resolve --data {} --qty 1 --list L4", bad_promo)).is_err());
    }

    #[test]
    fn test_rejects_invalid_sale_lines() {
        let lines = temp_json("reject-lines.json", r#"[{ "quantity": 0, "unitPrice": "100" }]"#);
        assert!(try_run(&format!("totals --lines {}", lines)).is_err());

        let lines = temp_json(
            "reject-tax.json",
            r#"[{ "quantity": 1, "unitPrice": "100", "taxRate": "-100" }]"#,
        );
        assert!(try_run(&format!("totals --lines {}", lines)).is_err());
    }

    #[test]
    fn test_rejects_invalid_sheet() {
        let sheet = temp_json("reject-sheet.json", &SHEET.replace("List 1", " "));
        let err = try_run(&format!("sheet --sheet {}", sheet)).unwrap_err();
        assert_eq!(err.to_string(), "label is required");

        let sheet = temp_json("reject-sheet-cost.json", SHEET);
        assert!(try_run(&format!("sheet --sheet {} --cost -3", sheet)).is_err());
    }

    #[test]
    fn test_engine_errors_surface_without_panicking() {
        // Valid inputs, but an inverse row over a zero base.
        let zero_cost = SHEET.replace(r#""cost": "100", "internalTaxAmount": "10""#, r#""cost": "0""#);
        let sheet = temp_json("zero-base-sheet.json", &zero_cost);
        let err = try_run(&format!("sheet --sheet {}", sheet)).unwrap_err();
        assert!(err.to_string().contains("non-positive cost base"));
    }
}
