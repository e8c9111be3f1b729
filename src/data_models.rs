use serde::{Deserialize, Serialize};

/// A single image hit, ready to be rendered as a thumbnail link.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub image_url: String,
    pub thumbnail_url: String,
    pub content: Option<String>,
}

impl SearchResult {
    pub fn new(image_url: String, thumbnail_url: String, content: Option<String>) -> SearchResult {
        SearchResult {
            image_url,
            thumbnail_url,
            content,
        }
    }

    /// Both the full image and the thumbnail are served from the same view path.
    pub fn from_file_name(view_base_url: &str, file_name: &str) -> SearchResult {
        let url = format!("{view_base_url}{file_name}");
        SearchResult {
            image_url: url.clone(),
            thumbnail_url: url,
            content: None,
        }
    }
}

/// Shapes the search endpoint is known to answer with.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum WireRecord {
    #[serde(rename_all = "camelCase")]
    Image {
        image_url: String,
        thumbnail_url: String,
        #[serde(default)]
        content: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    File { file_name: String },
}

impl WireRecord {
    pub fn into_result(self, view_base_url: &str) -> SearchResult {
        match self {
            WireRecord::Image {
                image_url,
                thumbnail_url,
                content,
            } => SearchResult::new(image_url, thumbnail_url, content),
            WireRecord::File { file_name } => {
                SearchResult::from_file_name(view_base_url, &file_name)
            }
        }
    }
}

#[test]
fn test_file_name_is_appended_verbatim() {
    let r = SearchResult::from_file_name("http://localhost:4000/view", "/2021/beach.jpg");
    assert_eq!(r.image_url, "http://localhost:4000/view/2021/beach.jpg");
    assert_eq!(r.thumbnail_url, r.image_url);
    assert!(r.content.is_none());
}

#[test]
fn test_wire_record_prefers_image_shape() {
    let rec: WireRecord =
        serde_json::from_str(r#"{"imageUrl":"a","thumbnailUrl":"b","content":"dog"}"#).unwrap();
    assert_eq!(
        rec.into_result("ignored"),
        SearchResult::new("a".into(), "b".into(), Some("dog".into()))
    );

    let rec: WireRecord = serde_json::from_str(r#"{"fileName":"/x.png"}"#).unwrap();
    assert_eq!(rec.into_result("v").image_url, "v/x.png");
}
