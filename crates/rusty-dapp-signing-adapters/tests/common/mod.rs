#![allow(dead_code)]

use std::io::Read;
use std::sync::{Arc, Mutex};
use std::thread;

use alloy::primitives::U256;
use serde_json::{json, Value};
use tiny_http::{Method, Response, Server, StatusCode};

use rusty_dapp_signing_core::{Address, ChainId, PortError, Transaction};

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

pub fn sender() -> Address {
    Address([1u8; 32])
}

pub fn receiver() -> Address {
    Address([2u8; 32])
}

pub fn sample_tx(nonce: u64) -> Transaction {
    Transaction {
        nonce,
        value: U256::from(1_000_000_000_000_000_000u64),
        receiver: receiver(),
        sender: sender(),
        gas_price: 1_000_000_000,
        gas_limit: 60_000,
        data: Some("hello".to_owned()),
        chain_id: ChainId::new("D"),
        version: 1,
        signature: None,
    }
}

/// Serves a fixed set of API and signer-bridge routes on 127.0.0.1:0.
pub fn spawn_mock_server(
    calls: Arc<Mutex<Vec<RecordedRequest>>>,
) -> (String, thread::JoinHandle<Result<(), PortError>>) {
    let server = Server::http("127.0.0.1:0").expect("start server");
    let addr = format!("http://{}", server.server_addr());
    let sender_path = format!("/accounts/{}", sender());
    let receiver_path = format!("/accounts/{}", receiver());
    let receiver_bech32 = receiver().to_string();
    let sender_bech32 = sender().to_string();

    let join = thread::spawn(move || {
        for _ in 0..16 {
            let mut req = match server.recv() {
                Ok(r) => r,
                Err(_) => break,
            };
            let method = req.method().clone();
            let path = req.url().to_owned();
            let mut body = String::new();
            let _ = req.as_reader().read_to_string(&mut body);
            if let Ok(mut g) = calls.lock() {
                g.push(RecordedRequest {
                    method: method.to_string(),
                    path: path.clone(),
                    body: body.clone(),
                });
            }

            let (code, payload) = match (method, path.as_str()) {
                (Method::Get, p) if p == sender_path => (
                    200,
                    json!({"address": sender_bech32, "nonce": 42, "balance": "1500000000000000000"}),
                ),
                (Method::Get, p) if p == receiver_path => (
                    200,
                    json!({
                        "address": receiver_bech32,
                        "nonce": 0,
                        "balance": "0",
                        "scamInfo": {"info": "reported phishing", "type": "scam"}
                    }),
                ),
                (Method::Get, "/tokens/USDC-c76f1f") => (
                    200,
                    json!({"identifier": "USDC-c76f1f", "decimals": 6, "assets": {"svgUrl": "https://media.test/usdc.svg"}}),
                ),
                (Method::Get, "/nfts/PUNK-1a2b3c-0a") => (
                    200,
                    json!({"identifier": "PUNK-1a2b3c-0a", "type": "NonFungibleESDT"}),
                ),
                (Method::Get, "/tokens/HUGE-abcdef") => (
                    200,
                    json!({"identifier": "HUGE-abcdef", "decimals": 4_294_967_295u32}),
                ),
                (Method::Get, "/tokens/BROKEN-abcdef") => (500, json!({"error": "boom"})),
                (Method::Post, "/ledger/sign") => (200, sign_bridge_reply(&body)),
                (Method::Post, "/extension/sign") => {
                    (400, json!({"error": "user rejected the request"}))
                }
                _ => (404, json!({"error": "not found"})),
            };

            let response =
                Response::from_string(payload.to_string()).with_status_code(StatusCode(code));
            let _ = req.respond(response);
        }
        Ok(())
    });

    (addr, join)
}

fn sign_bridge_reply(body: &str) -> Value {
    let request: Value = serde_json::from_str(body).unwrap_or(Value::Null);
    let mut txs = request
        .get("transactions")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    for tx in &mut txs {
        if let Some(obj) = tx.as_object_mut() {
            obj.insert("signature".to_owned(), json!("bridge-signature"));
        }
    }
    json!({ "transactions": txs })
}
