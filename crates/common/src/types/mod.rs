use serde::Serialize;

/// Static liveness payload served by `/health` and `/{module}/health`.
#[derive(Serialize, Debug, Clone)]
pub struct Health {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<&'static str>,
}

impl Health {
    pub fn ok() -> Self {
        Self { status: "ok", module: None }
    }

    pub fn for_module(module: &'static str) -> Self {
        Self { status: "ok", module: Some(module) }
    }
}
