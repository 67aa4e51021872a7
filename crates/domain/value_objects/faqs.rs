use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateFaqModel {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub position: i32,
    #[serde(default = "default_published")]
    pub is_published: bool,
}

fn default_published() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateFaqModel {
    pub question: Option<String>,
    pub answer: Option<String>,
    pub position: Option<i32>,
    pub is_published: Option<bool>,
}
