use std::time::Duration;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use clap::Parser;
use stateless_auth::config::DEFAULT_JWT_EXPIRATION_MS;
use stateless_auth::services::auth::token_codec::{MIN_SECRET_BYTES, TokenCodec};

/// Mint a bearer token the API will accept, or generate a fresh signing secret.
///
/// Uses the same codec as the server, so the output is exactly what a login
/// flow would hand to a client:
/// - header `{"typ":"JWT","alg":"HS256"}`
/// - claims `{sub, iat, exp}`
#[derive(Parser, Debug)]
#[command(name = "token-gen", version, about)]
struct Args {
    /// Token subject (username)
    #[arg(long, required_unless_present = "new_secret")]
    subject: Option<String>,

    /// Base64-encoded signing secret
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    secret: Option<String>,

    /// Lifetime in milliseconds. Default: JWT_EXPIRATION_MS or one hour.
    #[arg(long, env = "JWT_EXPIRATION_MS")]
    ttl_ms: Option<u64>,

    /// Override iat (unix seconds). Default: now.
    #[arg(long)]
    iat: Option<i64>,

    /// Print a new random base64 secret and exit
    #[arg(long, default_value_t = false)]
    new_secret: bool,

    /// Print only the token (no extra lines)
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

fn new_secret() -> Result<String, Box<dyn std::error::Error>> {
    let mut bytes = [0u8; MIN_SECRET_BYTES * 2];
    getrandom::fill(&mut bytes).map_err(|e| format!("getrandom failed: {e}"))?;
    Ok(STANDARD.encode(bytes))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.new_secret {
        println!("{}", new_secret()?);
        return Ok(());
    }

    let subject = args.subject.ok_or("--subject is required")?;
    let secret = args
        .secret
        .ok_or("no signing secret: pass --secret or set JWT_SECRET")?;
    let ttl = Duration::from_millis(args.ttl_ms.unwrap_or(DEFAULT_JWT_EXPIRATION_MS));

    let codec = TokenCodec::new(&secret, ttl)?;

    let now: DateTime<Utc> = match args.iat {
        Some(iat) => DateTime::from_timestamp(iat, 0).ok_or("--iat out of range")?,
        None => Utc::now(),
    };
    let token = codec.issue_at(&subject, ttl, now)?;

    if args.quiet {
        println!("{}", token);
        return Ok(());
    }

    let expires_at = now + chrono::TimeDelta::from_std(ttl)?;
    println!("token: {}", token);
    println!("sub: {}", subject);
    println!("iat: {}", now.timestamp());
    println!("exp: {} ({})", expires_at.timestamp(), expires_at.to_rfc3339());
    println!("header: Authorization: Bearer {}", token);

    Ok(())
}
