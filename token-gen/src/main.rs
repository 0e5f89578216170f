use std::{
    fs,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use clap::Parser;
use ed25519_dalek::{Signer, SigningKey, pkcs8::DecodePrivateKey};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Mint a signed bearer token (JWS compact serialization, EdDSA) for local testing.
///
/// - Header: alg=EdDSA, typ=JWT, kid (RFC 7638 thumbprint unless overridden)
/// - Claims: iss, sub, aud (optional), scope, iat, nbf, exp, jti
/// - With --print-jwks, also prints the JWKS document to use as the issuer's
///   `jwks_file` in the authorizer configuration
#[derive(Parser, Debug)]
#[command(name = "token-gen", version, about)]
struct Args {
    /// Issuer URL (must match an `issuer` entry in the authorizer configuration)
    #[arg(long)]
    issuer: String,

    /// Token subject
    #[arg(long, default_value = "nobody")]
    subject: String,

    /// Audience; repeat for a list
    #[arg(long)]
    audience: Vec<String>,

    /// Scope entry such as `read:/stuff` or `write:/stuff`; repeatable
    #[arg(long = "scope", required = true)]
    scopes: Vec<String>,

    /// Lifetime in seconds
    #[arg(long, default_value_t = 600)]
    lifetime: i64,

    /// Path to the issuer's Ed25519 private key in PEM (PKCS#8)
    #[arg(long, value_name = "FILE")]
    private_pem: PathBuf,

    /// Override kid. Default: JWK thumbprint.
    #[arg(long)]
    kid: Option<String>,

    /// Override jti. Default: random UUID v4.
    #[arg(long)]
    jti: Option<String>,

    /// Also print the JWKS document for the key
    #[arg(long, default_value_t = false)]
    print_jwks: bool,
}

fn b64url_json(value: &serde_json::Value) -> Result<String, serde_json::Error> {
    let s = serde_json::to_string(value)?;
    Ok(URL_SAFE_NO_PAD.encode(s.as_bytes()))
}

fn now_unix() -> Result<i64, std::time::SystemTimeError> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as i64)
}

fn audience_claim(audience: &[String]) -> Option<serde_json::Value> {
    match audience {
        [] => None,
        [one] => Some(serde_json::Value::String(one.clone())),
        many => Some(serde_json::json!(many)),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let pem = fs::read_to_string(&args.private_pem)?;
    let signing_key = SigningKey::from_pkcs8_pem(&pem)?;
    let x_b64 = URL_SAFE_NO_PAD.encode(signing_key.verifying_key().as_bytes());

    // RFC 7638 canonical JSON for OKP keys: {crv,kty,x}, ordered, no whitespace.
    let canonical = format!("{{\"crv\":\"Ed25519\",\"kty\":\"OKP\",\"x\":\"{}\"}}", x_b64);
    let thumbprint = URL_SAFE_NO_PAD.encode(Sha256::digest(canonical.as_bytes()));
    let kid = args.kid.unwrap_or(thumbprint);

    let now = now_unix()?;
    let jti = args.jti.unwrap_or_else(|| Uuid::new_v4().to_string());

    let header = serde_json::json!({
        "alg": "EdDSA",
        "typ": "JWT",
        "kid": kid,
    });

    let mut claims = serde_json::Map::new();
    claims.insert("iss".into(), args.issuer.clone().into());
    claims.insert("sub".into(), args.subject.into());
    claims.insert("scope".into(), args.scopes.join(" ").into());
    claims.insert("iat".into(), now.into());
    claims.insert("nbf".into(), now.into());
    claims.insert("exp".into(), (now + args.lifetime).into());
    claims.insert("jti".into(), jti.into());
    if let Some(aud) = audience_claim(&args.audience) {
        claims.insert("aud".into(), aud);
    }

    let signing_input = format!(
        "{}.{}",
        b64url_json(&header)?,
        b64url_json(&serde_json::Value::Object(claims))?
    );
    let sig = signing_key.sign(signing_input.as_bytes());
    let token = format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(sig.to_bytes()));

    println!("{}", token);

    if args.print_jwks {
        let jwks = serde_json::json!({
            "keys": [{
                "kty": "OKP",
                "crv": "Ed25519",
                "alg": "EdDSA",
                "use": "sig",
                "kid": kid,
                "x": x_b64,
            }]
        });
        eprintln!("{}", serde_json::to_string_pretty(&jwks)?);
    }

    Ok(())
}
