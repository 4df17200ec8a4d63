use serde_json::{json, Value};

use crate::controller::{ControllerAction, Transformer};

/// Hides withdrawal destinations behind their last four characters in
/// listings; single-record responses are left complete.
pub struct WithdrawalTransformer;

fn mask(destination: &str) -> String {
    let chars: Vec<char> = destination.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("****{}", tail)
}

impl Transformer for WithdrawalTransformer {
    fn transform(&self, action: ControllerAction, item: Value) -> Value {
        if action != ControllerAction::Index {
            return item;
        }
        json!({
            "id": item["id"],
            "user_id": item["user_id"],
            "amount": item["amount"],
            "status": item["status"],
            "destination": item["destination"].as_str().map(mask),
            "currency": item.get("currency").cloned().unwrap_or(Value::Null),
            "created_at": item["created_at"],
        })
    }
}
