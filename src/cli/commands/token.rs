use anyhow::Context;
use clap::Args;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{generate_jwt, Claims};
use crate::cli::OutputFormat;
use crate::config::{self, SecurityConfig};

#[derive(Args, Debug)]
pub struct TokenArgs {
    #[arg(long, help = "Session user id (token subject)")]
    pub user_id: Uuid,

    #[arg(long, help = "Identity-provider user id, preferred for scoping")]
    pub auth_id: Option<Uuid>,

    #[arg(long, help = "E-mail claim")]
    pub email: Option<String>,

    #[arg(long, help = "Lifetime in hours (defaults to SECURITY_JWT_EXPIRY_HOURS)")]
    pub hours: Option<u64>,
}

pub fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let security = &config::config().security;
    let (token, claims) = mint(security, args)?;

    match output_format {
        OutputFormat::Json => {
            let out = json!({
                "token": token,
                "sub": claims.sub,
                "auth_id": claims.auth_id,
                "email": claims.email,
                "expires_at": claims.exp,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => println!("{}", token),
    }
    Ok(())
}

fn mint(security: &SecurityConfig, args: TokenArgs) -> anyhow::Result<(String, Claims)> {
    let hours = args.hours.unwrap_or(security.jwt_expiry_hours);
    let claims = Claims::new(args.user_id, args.auth_id, args.email, hours);
    let token = generate_jwt(security, &claims).context("failed to sign session token")?;
    Ok((token, claims))
}
