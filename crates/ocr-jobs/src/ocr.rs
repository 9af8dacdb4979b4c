//! Text recognition collaborator
//!
//! [`VisionOcrClient`] reads the uploaded object from a local storage root
//! and sends its bytes to the Vision `images:annotate` REST endpoint with
//! document text detection. The response is reduced to the full text plus
//! one box per recognized word.

use std::path::PathBuf;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared_types::{OcrOutput, OcrWord};
use tracing::debug;

use crate::error::OcrError;

pub const DEFAULT_VISION_ENDPOINT: &str = "https://vision.googleapis.com/v1/images:annotate";

#[async_trait]
pub trait OcrClient: Send + Sync {
    /// Recognize the text of the object at `path` in `bucket`
    async fn recognize(&self, bucket: &str, path: &str) -> Result<OcrOutput, OcrError>;
}

pub struct VisionOcrClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    storage_root: PathBuf,
}

impl VisionOcrClient {
    pub fn new(storage_root: impl Into<PathBuf>) -> Self {
        Self {
            client: Client::new(),
            endpoint: DEFAULT_VISION_ENDPOINT.to_string(),
            api_key: None,
            storage_root: storage_root.into(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    fn object_path(&self, bucket: &str, path: &str) -> PathBuf {
        self.storage_root.join(bucket).join(path)
    }
}

#[derive(Serialize)]
struct AnnotateRequest {
    requests: Vec<AnnotateImageRequest>,
}

#[derive(Serialize)]
struct AnnotateImageRequest {
    image: Image,
    features: Vec<Feature>,
}

#[derive(Serialize)]
struct Image {
    content: String,
}

#[derive(Serialize)]
struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Default, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotateImageResponse {
    #[serde(default)]
    full_text_annotation: Option<TextAnnotation>,
    #[serde(default)]
    text_annotations: Vec<EntityAnnotation>,
    #[serde(default)]
    error: Option<Status>,
}

#[derive(Debug, Default, Deserialize)]
struct TextAnnotation {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Default, Deserialize)]
struct EntityAnnotation {
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Status {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Default, Deserialize)]
struct Page {
    #[serde(default)]
    blocks: Vec<Block>,
}

#[derive(Debug, Default, Deserialize)]
struct Block {
    #[serde(default)]
    paragraphs: Vec<Paragraph>,
}

#[derive(Debug, Default, Deserialize)]
struct Paragraph {
    #[serde(default)]
    words: Vec<Word>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Word {
    #[serde(default)]
    symbols: Vec<Symbol>,
    #[serde(default)]
    bounding_box: Option<BoundingPoly>,
}

#[derive(Debug, Default, Deserialize)]
struct Symbol {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Default, Deserialize)]
struct BoundingPoly {
    #[serde(default)]
    vertices: Vec<Vertex>,
}

#[derive(Debug, Default, Deserialize)]
struct Vertex {
    #[serde(default)]
    x: Option<f64>,
    #[serde(default)]
    y: Option<f64>,
}

fn word_box(poly: Option<&BoundingPoly>) -> (f64, f64, f64, f64) {
    let vertices = poly.map(|p| p.vertices.as_slice()).unwrap_or_default();
    if vertices.is_empty() {
        return (0.0, 0.0, 0.0, 0.0);
    }
    let xs = vertices.iter().map(|v| v.x.unwrap_or(0.0));
    let ys = vertices.iter().map(|v| v.y.unwrap_or(0.0));
    (
        xs.clone().fold(f64::INFINITY, f64::min),
        ys.clone().fold(f64::INFINITY, f64::min),
        xs.fold(f64::NEG_INFINITY, f64::max),
        ys.fold(f64::NEG_INFINITY, f64::max),
    )
}

impl AnnotateImageResponse {
    /// Full text and word boxes of one annotated image
    pub fn into_output(self) -> OcrOutput {
        let from_entities = self
            .text_annotations
            .into_iter()
            .next()
            .and_then(|e| e.description);

        let Some(annotation) = self.full_text_annotation else {
            return OcrOutput {
                text: from_entities.unwrap_or_default(),
                words: Vec::new(),
            };
        };

        let text = annotation
            .text
            .filter(|t| !t.is_empty())
            .or(from_entities)
            .unwrap_or_default();

        let words = annotation
            .pages
            .iter()
            .flat_map(|page| &page.blocks)
            .flat_map(|block| &block.paragraphs)
            .flat_map(|paragraph| &paragraph.words)
            .filter_map(|word| {
                let text: String = word.symbols.iter().map(|s| s.text.as_str()).collect();
                if text.is_empty() {
                    return None;
                }
                let (x0, y0, x1, y1) = word_box(word.bounding_box.as_ref());
                Some(OcrWord::from_box(text, x0, y0, x1, y1))
            })
            .collect();

        OcrOutput { text, words }
    }
}

#[async_trait]
impl OcrClient for VisionOcrClient {
    async fn recognize(&self, bucket: &str, path: &str) -> Result<OcrOutput, OcrError> {
        let object_path = self.object_path(bucket, path);
        let bytes = tokio::fs::read(&object_path)
            .await
            .map_err(|source| OcrError::ObjectRead {
                path: object_path.clone(),
                source,
            })?;

        let body = AnnotateRequest {
            requests: vec![AnnotateImageRequest {
                image: Image {
                    content: STANDARD.encode(&bytes),
                },
                features: vec![Feature {
                    kind: "DOCUMENT_TEXT_DETECTION",
                }],
            }],
        };

        debug!(bucket, path, bytes = bytes.len(), "Sending image to Vision");

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key)]);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OcrError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let annotated: AnnotateResponse = response.json().await?;
        let image = annotated
            .responses
            .into_iter()
            .next()
            .ok_or_else(|| OcrError::InvalidResponse("no image responses".to_string()))?;

        if let Some(err) = image.error.as_ref().filter(|e| e.code != 0) {
            return Err(OcrError::Api {
                status: u16::try_from(err.code).unwrap_or(0),
                message: err.message.clone(),
            });
        }

        let output = image.into_output();
        debug!(chars = output.text.len(), words = output.words.len(), "Vision OCR complete");
        Ok(output)
    }
}
