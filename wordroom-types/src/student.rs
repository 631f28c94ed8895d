use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// An entry in the identity roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub is_admin: bool,
}
