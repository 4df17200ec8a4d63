//! Shared building blocks used by every crate in the workspace:
//! logging setup, runtime environment checks and small wire types.

pub mod types;
pub mod utils;
pub mod env;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health::ok();
        assert_eq!(h.status, "ok");
        assert!(h.module.is_none());
    }

    #[test]
    fn module_health_serializes_module_name() {
        let h = types::Health::for_module("funding");
        let v = serde_json::to_value(&h).unwrap();
        assert_eq!(v["status"], "ok");
        assert_eq!(v["module"], "funding");
    }
}
