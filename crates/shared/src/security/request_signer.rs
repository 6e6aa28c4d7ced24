use alloy::primitives::hex;
use alloy::signers::Signer;
use serde_json::Value;

/// Rebuilds `value` with object keys in sorted order at every level, so the
/// signed text does not depend on how a client ordered its fields.
fn sorted(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            Value::Object(
                keys.into_iter()
                    .map(|key| (key.clone(), sorted(&map[key.as_str()])))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
        other => other.clone(),
    }
}

/// The text covered by a request signature: the request path followed by the
/// canonical JSON body, if any.
pub fn signing_message(path: &str, body: Option<&Value>) -> String {
    match body {
        Some(body) => format!("{path}{}", sorted(body)),
        None => path.to_string(),
    }
}

/// Signs a request the way [`super::auth_signature_middleware::ValidateSignature`]
/// verifies it. Returns the `0x`-prefixed signature for the `x-signature` header.
pub async fn sign_request<S: Signer + Sync>(
    path: &str,
    signer: &S,
    body: Option<&Value>,
) -> Result<String, alloy::signers::Error> {
    let message = signing_message(path, body);
    let signature = signer.sign_message(message.as_bytes()).await?;
    Ok(hex::encode_prefixed(signature.as_bytes()))
}
