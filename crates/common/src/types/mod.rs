use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// Generic write acknowledgment returned by the HTTP API.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    pub success: bool,
}

impl Ack {
    pub fn ok() -> Self { Self { success: true } }
}

/// Response of a `POST /api/{resource}` call.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Created {
    pub id: String,
    pub success: bool,
}
