//! Compute the `Authorization` value for a deploy hook URL.
//!
//! ```text
//! sign-url --key "$KEY" "http://relay.example.com/?app=web&release=v12&user=alice"
//! curl -X POST -H "Authorization: $(sign-url ...)" "http://relay.example.com/?app=web&release=v12&user=alice"
//! ```

use anyhow::{anyhow, Result};
use clap::Parser;

use deploy_notifier::auth::{DigestAlgorithm, HmacKey, SignatureVerifier};

#[derive(Debug, Parser)]
#[command(name = "sign-url", about = "Sign a deploy hook URL with the relay's shared secret")]
struct Args {
    /// Full URL exactly as the relay will reconstruct it (scheme, host, path, query)
    url: String,

    /// Shared secret
    #[arg(long, env = "KEY", hide_env_values = true)]
    key: String,

    /// sha1 or sha256
    #[arg(long, env = "HMAC_ALGORITHM", default_value = "sha1")]
    algorithm: String,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    if args.key.is_empty() {
        return Err(anyhow!("the signing key must not be empty"));
    }

    let algorithm: DigestAlgorithm = args.algorithm.parse().map_err(|e: String| anyhow!(e))?;
    let signer = SignatureVerifier::new(Some(HmacKey::new(args.key)), algorithm);

    println!("{}", signer.sign(&args.url)?);
    Ok(())
}
