//! Question synthesis DTOs

use serde::{Deserialize, Serialize};

/// Request to derive a problem statement from a reference source file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateQuestion {
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    pub question: String,
}
