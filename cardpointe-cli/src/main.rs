//! CardPointe CLI
//!
//! Command-line interface for the CardPointe gateway, mostly for smoke
//! testing credentials and transactions against a sandbox.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cardpointe_client::{
    AuthorizationRequest, CaptureRequest, CardPointe, ProfileRequest, RefundRequest,
    SettlementDay, SettlementStatus, Value, VoidRequest,
};

#[derive(Parser)]
#[command(name = "cardpointe")]
#[command(author, version, about = "CardPointe gateway CLI client", long_about = None)]
struct Cli {
    /// Gateway root, e.g. https://fts-uat.cardconnect.com
    #[arg(long, env = "CARDPOINTE_ENDPOINT")]
    endpoint: String,

    /// Merchant ID
    #[arg(long, env = "CARDPOINTE_MERCHANT_ID")]
    merchant_id: String,

    /// API username
    #[arg(long, env = "CARDPOINTE_USER")]
    user: String,

    /// API password
    #[arg(long, env = "CARDPOINTE_PASSWORD", hide_env_values = true)]
    password: String,

    /// Default currency for authorizations
    #[arg(long, env = "CARDPOINTE_CURRENCY", default_value = "USD")]
    currency: String,

    /// Skip TLS certificate verification (self-signed gateways only)
    #[arg(long, env = "CARDPOINTE_ACCEPT_INVALID_CERTS")]
    accept_invalid_certs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the credentials against the gateway
    TestCredentials,
    /// Check the merchant ID is enabled
    ValidateMerchant,
    /// Authorize a card, optionally capturing it
    Authorize {
        /// Card number or CardSecure token
        #[arg(long)]
        account: Option<String>,
        /// Amount in cents, or a decimal such as 5.00
        #[arg(long)]
        amount: String,
        /// Expiry, MMYY
        #[arg(long)]
        expiry: String,
        #[arg(long)]
        cvv2: Option<String>,
        /// Capture if the authorization succeeds
        #[arg(long)]
        capture: bool,
        /// Return a token for the account
        #[arg(long)]
        tokenize: bool,
        /// Charge a stored profile, as PROFILEID/ACCTID
        #[arg(long, conflicts_with = "account")]
        profile: Option<String>,
        /// Extra gateway fields as key=value
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },
    /// Capture an authorization
    Capture {
        retref: String,
        #[arg(long)]
        amount: Option<String>,
    },
    /// Void a transaction
    Void {
        retref: String,
        #[arg(long)]
        amount: Option<String>,
    },
    /// Refund a settled transaction
    Refund {
        retref: String,
        #[arg(long)]
        amount: Option<String>,
    },
    /// Show the state of a transaction
    Inquire { retref: String },
    /// Show settlement batches for a day
    Settlement {
        /// Day as MMDD, defaults to today
        #[arg(long)]
        date: Option<SettlementDay>,
    },
    /// Stored profile operations
    Profile {
        #[command(subcommand)]
        action: ProfileCommands,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Create a profile from a card
    Create {
        #[arg(long)]
        account: String,
        #[arg(long)]
        expiry: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        postal: Option<String>,
        /// Make the account the profile's default
        #[arg(long)]
        default: bool,
    },
    /// Fetch a profile
    Get {
        profile_id: String,
        #[arg(long)]
        account_id: Option<String>,
    },
    /// Delete a profile
    Delete {
        profile_id: String,
        #[arg(long)]
        account_id: Option<String>,
    },
}

fn parse_field(s: &str) -> Result<(String, String)> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("Invalid field '{}', expected key=value", s))?;
    if key.is_empty() {
        anyhow::bail!("Invalid field '{}', key is empty", s);
    }
    Ok((key.to_string(), value.to_string()))
}

/// Whole numbers are sent as integers, anything else as given.
fn amount_value(amount: &str) -> Value {
    amount
        .parse::<i64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(amount))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,cardpointe_client=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let client = CardPointe::builder(&cli.merchant_id, &cli.user, &cli.password, &cli.endpoint)
        .currency(&cli.currency)
        .danger_accept_invalid_certs(cli.accept_invalid_certs)
        .build()?;

    match cli.command {
        Commands::TestCredentials => {
            if client.test_credentials().await? {
                println!("✓ Credentials accepted");
            } else {
                println!("✗ Credentials rejected");
                std::process::exit(1);
            }
        }

        Commands::ValidateMerchant => {
            if client.validate_merchant_id().await? {
                println!("✓ Merchant {} is enabled", client.merchant_id());
            } else {
                println!("✗ Merchant {} is not enabled", client.merchant_id());
                std::process::exit(1);
            }
        }

        Commands::Authorize {
            account,
            amount,
            expiry,
            cvv2,
            capture,
            tokenize,
            profile,
            fields,
        } => {
            let mut request = AuthorizationRequest::new()
                .amount(amount_value(&amount))
                .expiry(expiry)
                .capture(capture)
                .tokenize(tokenize);
            if let Some(account) = account {
                request = request.account(account);
            }
            if let Some(cvv2) = cvv2 {
                request = request.cvv2(cvv2);
            }
            if let Some(profile) = profile {
                request = request.with("profile", profile);
            }
            for (key, value) in fields {
                request = request.with(key, value);
            }

            let result = client.authorize(&request).await?;
            tracing::info!(
                captured = result.is_captured(),
                success = result.success(),
                "authorization complete"
            );
            print_json(&result)?;
        }

        Commands::Capture { retref, amount } => {
            let mut request = CaptureRequest::new();
            if let Some(amount) = amount {
                request = request.amount(amount_value(&amount));
            }
            print_json(&client.capture(&retref, &request).await?)?;
        }

        Commands::Void { retref, amount } => {
            let mut request = VoidRequest::new();
            if let Some(amount) = amount {
                request = request.amount(amount_value(&amount));
            }
            print_json(&client.void(&retref, &request).await?)?;
        }

        Commands::Refund { retref, amount } => {
            let mut request = RefundRequest::for_retref(retref);
            if let Some(amount) = amount {
                request = request.amount(amount_value(&amount));
            }
            print_json(&client.refund(&request).await?)?;
        }

        Commands::Inquire { retref } => {
            print_json(&client.inquire(&retref).await?)?;
        }

        Commands::Settlement { date } => {
            let day = date.unwrap_or_else(SettlementDay::today);
            match client.settlement_status(day).await? {
                SettlementStatus::NoBatches => println!("No batches for {}", day),
                SettlementStatus::Batches(batches) => print_json(&batches)?,
            }
        }

        Commands::Profile { action } => match action {
            ProfileCommands::Create {
                account,
                expiry,
                name,
                postal,
                default,
            } => {
                let mut request = ProfileRequest::new()
                    .account(account)
                    .expiry(expiry)
                    .defaultacct(default);
                if let Some(name) = name {
                    request = request.name(name);
                }
                if let Some(postal) = postal {
                    request = request.postal(postal);
                }
                print_json(&client.create_profile(&request).await?)?;
            }
            ProfileCommands::Get {
                profile_id,
                account_id,
            } => {
                let profile = client
                    .get_profile(&profile_id, account_id.as_deref())
                    .await?;
                print_json(&profile)?;
            }
            ProfileCommands::Delete {
                profile_id,
                account_id,
            } => {
                let res = client
                    .delete_profile(&profile_id, account_id.as_deref())
                    .await?;
                print_json(&res)?;
            }
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_field() {
        assert_eq!(
            parse_field("orderid=A-1").unwrap(),
            ("orderid".to_string(), "A-1".to_string())
        );
        assert_eq!(
            parse_field("userfield=a=b").unwrap(),
            ("userfield".to_string(), "a=b".to_string())
        );
        assert!(parse_field("novalue").is_err());
        assert!(parse_field("=x").is_err());
    }

    #[test]
    fn test_amount_value() {
        assert_eq!(amount_value("500"), Value::from(500));
        assert_eq!(amount_value("5.00"), Value::from("5.00"));
    }

    #[test]
    fn test_settlement_date_parsed() {
        let cli = Cli::try_parse_from([
            "cardpointe",
            "--endpoint",
            "https://gw.example",
            "--merchant-id",
            "123",
            "--user",
            "u",
            "--password",
            "p",
            "settlement",
            "--date",
            "0704",
        ])
        .unwrap();
        match cli.command {
            Commands::Settlement { date } => assert_eq!(date.unwrap().to_string(), "0704"),
            _ => panic!("expected settlement command"),
        }
    }

    #[test]
    fn test_invalid_settlement_date_rejected() {
        let parsed = Cli::try_parse_from([
            "cardpointe",
            "--endpoint",
            "https://gw.example",
            "--merchant-id",
            "123",
            "--user",
            "u",
            "--password",
            "p",
            "settlement",
            "--date",
            "1340",
        ]);
        assert!(parsed.is_err());
    }
}
