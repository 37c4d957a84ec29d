use serde::{Deserialize, Serialize};

use crate::domain::Item;

/// An RSS channel ready to be rendered
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feed {
    pub title: String,
    pub link: String,
    pub description: String,
    pub image: Option<String>,
    pub items: Vec<Item>,
}

impl Feed {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            description: String::new(),
            image: None,
            items: Vec::new(),
        }
    }
}
