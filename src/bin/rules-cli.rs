use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "rules-cli")]
#[command(about = "Client for the rules gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Token sent in the X-Auth-Token header.
    #[arg(short, long, env = "RULES_GATEWAY_TOKEN")]
    token: Option<String>,

    /// Send the token with basic auth under this user name instead.
    #[arg(long, requires = "token")]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the gateway is up
    Health,
    /// Print the composed document for comma-separated rulesets
    Ruleset { rulesets: String },
    /// Print the SHA-256 of the composed document
    Sum { rulesets: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let (path, rulesets) = match &cli.command {
        Commands::Health => ("/", None),
        Commands::Ruleset { rulesets } => ("/ruleset", Some(rulesets.as_str())),
        Commands::Sum { rulesets } => ("/sum", Some(rulesets.as_str())),
    };

    let mut req = client.get(format!("{}{}", cli.url.trim_end_matches('/'), path));
    if let Some(rulesets) = rulesets {
        req = req.query(&[("rulesets", rulesets)]);
    }
    req = match (&cli.user, &cli.token) {
        (Some(user), Some(token)) => req.basic_auth(user, Some(token)),
        (None, Some(token)) => req.header("X-Auth-Token", token),
        (_, None) => req,
    };

    let res = req.send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        match serde_json::from_str::<Value>(&text) {
            Ok(json) => eprintln!("Response: {}", serde_json::to_string_pretty(&json)?),
            Err(_) if !text.is_empty() => eprintln!("Response: {}", text.trim_end()),
            Err(_) => {}
        }
        std::process::exit(1);
    }

    if text.is_empty() {
        println!("{}", status);
    } else {
        print!("{}", text);
    }
    Ok(())
}
