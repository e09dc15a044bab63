//! Cloud Core Certificate Demo
//!
//! Issues the cloud core's server certificate from a CA on disk and writes the
//! result next to each other as DER and PEM.
//!
//! ```text
//! cargo run --example issue -- <ca.der> <ca.key.der> <out-dir> [settings.toml]
//! ```

use std::{env, fs, path::PathBuf};

use anyhow::{bail, Context};
use cloudcert::cloudcert_pki::{verify_issued_by, IssuanceSettings, Issuer};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() < 3 || args.len() > 4 {
        bail!("usage: issue <ca.der> <ca.key.der> <out-dir> [settings.toml]");
    }

    let ca_cert_der =
        fs::read(&args[0]).with_context(|| format!("reading CA certificate {}", args[0]))?;
    let ca_key_der = fs::read(&args[1]).with_context(|| format!("reading CA key {}", args[1]))?;
    let out_dir = PathBuf::from(&args[2]);

    let settings = match args.get(3) {
        Some(path) => IssuanceSettings::load(path)
            .with_context(|| format!("loading settings {path}"))?,
        None => IssuanceSettings::default(),
    };

    println!("=== Cloud Core Certificate Demo ===\n");

    println!("1. Issuing certificate...");
    let issued = Issuer::system()
        .with_settings(settings)
        .issue(&ca_cert_der, &ca_key_der)?;
    println!("   ✓ Issued with {}", issued.algorithm);

    println!("\n2. Verifying against the CA...");
    verify_issued_by(&issued.cert_der, &ca_cert_der)?;
    println!("   ✓ Signature and validity OK");

    println!("\n3. Writing files to {}...", out_dir.display());
    fs::create_dir_all(&out_dir)?;
    fs::write(out_dir.join("cloudcore.crt.der"), &issued.cert_der)?;
    fs::write(out_dir.join("cloudcore.key.der"), &issued.key_der)?;
    fs::write(out_dir.join("cloudcore.crt"), issued.cert_pem())?;
    fs::write(out_dir.join("cloudcore.key"), issued.key_pem())?;
    println!("   ✓ cloudcore.crt(.der), cloudcore.key(.der)");

    println!("\n4. Certificate details:");
    let info = issued.info()?;
    println!("{}", serde_json::to_string_pretty(&info)?);

    tracing::info!(days = info.days_until_expiry(), "done");
    Ok(())
}
