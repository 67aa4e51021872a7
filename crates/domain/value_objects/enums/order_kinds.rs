use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderKind {
    New,
    Renewal,
    Upgrade,
}

impl OrderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderKind::New => "new",
            OrderKind::Renewal => "renewal",
            OrderKind::Upgrade => "upgrade",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "new" => Some(OrderKind::New),
            "renewal" => Some(OrderKind::Renewal),
            "upgrade" => Some(OrderKind::Upgrade),
            _ => None,
        }
    }
}

impl Display for OrderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
