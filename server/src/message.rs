use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One line sent by a client.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub action: String,
    #[serde(default)]
    pub arguments: Value,
    #[serde(default)]
    pub msg_id: Option<String>,
    #[serde(default)]
    pub game_key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameArguments {
    pub game_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveArguments {
    pub game_id: String,
    pub move_position: usize,
    /// Some clients send the key along with the move instead of in the request.
    #[serde(default)]
    pub game_key: Option<String>,
}

/// One line sent to a client, either a reply or a pushed update.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg_id: Option<String>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn ok(action: &str, msg_id: Option<String>, data: Option<Value>) -> Self {
        Response {
            action: action.to_owned(),
            msg_id,
            success: true,
            data,
            error: None,
        }
    }

    pub fn err(action: &str, msg_id: Option<String>, error: impl ToString) -> Self {
        Response {
            action: action.to_owned(),
            msg_id,
            success: false,
            data: None,
            error: Some(error.to_string()),
        }
    }

    pub fn update(data: Value) -> Self {
        Response::ok("gameUpdate", None, Some(data))
    }
}
