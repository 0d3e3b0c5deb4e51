use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    pub description: String,
    #[serde(default)]
    pub cost: Option<f64>,
    pub priority: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TodoPatch {
    pub description: Option<String>,
    pub cost: Option<f64>,
    pub priority: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub notes: Option<String>,
}
