#![allow(dead_code)]

use std::sync::OnceLock;

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use rsa::RsaPrivateKey;
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use serde_json::Value;
use smartlaunch_server::{AppConfig, build_app};
use tokio::task::JoinHandle;

pub const SECRET: &str = "launcher-secret";

pub fn rsa_private_pem() -> &'static str {
    static PEM: OnceLock<String> = OnceLock::new();
    PEM.get_or_init(|| {
        let key = RsaPrivateKey::new(&mut rand::rngs::OsRng, 2048).expect("generate RSA key");
        key.to_pkcs8_pem(LineEnding::LF)
            .expect("encode RSA key")
            .to_string()
    })
}

pub fn test_config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.auth.jwt_secret = SECRET.to_string();
    cfg.auth.oidc.public_key = Some(rsa_private_pem().to_string());
    cfg
}

pub fn sign_hs256(claims: &Value) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("sign HS256")
}

pub fn sign_rs256(claims: &Value) -> String {
    let key = EncodingKey::from_rsa_pem(rsa_private_pem().as_bytes()).expect("encoding key");
    encode(&Header::new(Algorithm::RS256), claims, &key).expect("sign RS256")
}

pub fn caller_header() -> String {
    format!(
        "Bearer {}",
        sign_hs256(&serde_json::json!({"sub": "resource-server"}))
    )
}

pub fn now() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}

pub async fn start_server(
    cfg: AppConfig,
) -> (String, tokio::sync::oneshot::Sender<()>, JoinHandle<()>) {
    let app = build_app(&cfg).expect("build app");

    let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let server = tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.await;
            })
            .await;
    });

    (format!("http://{}", addr), tx, server)
}
