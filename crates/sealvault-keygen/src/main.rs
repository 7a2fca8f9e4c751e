//! Sealvault master key bootstrap tool.
//!
//! Generates an RSA keypair and a fresh 32-byte master key, wraps the
//! master key with RSA-OAEP-SHA256, and emits the environment lines
//! the Master Key Holder consumes at startup.
//!
//! # Usage
//!
//! ```bash
//! # Emit env lines for a new deployment
//! sealvault-keygen --key-id kek-2026-08 >> sealvault.env
//! ```

#![allow(clippy::print_stdout, reason = "env lines are this tool's output")]

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use clap::Parser;
use rand::RngCore;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey, pkcs8::EncodePrivateKey};
use sealvault_crypto::{
    KEY_SIZE, MasterKey, MasterKeyConfig,
    master_key::{MASTER_KEY_ID_VAR, MASTER_KEY_PEM_VAR, MASTER_KEY_WRAPPED_VAR},
};
use sha2::Sha256;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use zeroize::Zeroize;

/// Sealvault master key bootstrap tool
#[derive(Parser, Debug)]
#[command(name = "sealvault-keygen")]
#[command(about = "Generate a wrapped Sealvault master key")]
#[command(version)]
struct Args {
    /// RSA modulus size in bits
    #[arg(long, default_value = "2048")]
    bits: usize,

    /// Opaque key identifier to emit alongside the key material
    #[arg(long)]
    key_id: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let mut rng = rand::thread_rng();

    tracing::info!("generating RSA-{} keypair", args.bits);
    let private_key = RsaPrivateKey::new(&mut rng, args.bits)?;
    let public_key = RsaPublicKey::from(&private_key);

    let mut master = [0u8; KEY_SIZE];
    rng.fill_bytes(&mut master);
    let wrapped = public_key.encrypt(&mut rng, Oaep::new::<Sha256>(), &master)?;
    master.zeroize();

    let pem = private_key.to_pkcs8_pem(rsa::pkcs8::LineEnding::LF)?;
    let wrapped_b64 = BASE64.encode(&wrapped);

    // Sanity check: the emitted material must unwrap to a valid
    // 32-byte master key before anyone deploys it.
    let config = MasterKeyConfig {
        wrapped_key_b64: wrapped_b64.clone(),
        private_key_pem: pem.to_string(),
        key_id: args.key_id.clone(),
    };
    let master_key = MasterKey::from_config(&config)?;
    tracing::info!(key_id = ?master_key.key_id(), "wrapped master key verified");

    // PEM goes out single-line with literal \n escapes, the form the
    // holder normalizes back at startup.
    println!("{MASTER_KEY_WRAPPED_VAR}={wrapped_b64}");
    println!("{MASTER_KEY_PEM_VAR}={}", pem.replace('\n', "\\n"));
    if let Some(key_id) = &args.key_id {
        println!("{MASTER_KEY_ID_VAR}={key_id}");
    }

    Ok(())
}
