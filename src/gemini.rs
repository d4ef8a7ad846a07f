//! Gemini REST client: the chef's special text and the admin's image edits.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::json;

use crate::constants::{
    CHEF_PROMPT, EMPTY_SPECIAL_DESCRIPTION, EMPTY_SPECIAL_NAME, FALLBACK_SPECIAL_DESCRIPTION,
    FALLBACK_SPECIAL_NAME, GEMINI_API_URL, GEMINI_IMAGE_MODEL, GEMINI_TEXT_MODEL,
};
use crate::data_types::gemini_data_types::{
    ChefSpecial, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
};
use crate::errors::GeminiError;

#[derive(Debug, Clone, PartialEq)]
pub struct EditedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    api_key: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

pub fn fallback_special() -> ChefSpecial {
    ChefSpecial {
        name: FALLBACK_SPECIAL_NAME.to_string(),
        description: FALLBACK_SPECIAL_DESCRIPTION.to_string(),
    }
}

/// Parses the structured answer, filling in blanks the model left
pub fn parse_special(text: &str) -> Result<ChefSpecial, GeminiError> {
    let mut special: ChefSpecial =
        serde_json::from_str(text.trim()).map_err(|e| GeminiError::Malformed(e.to_string()))?;

    if special.name.trim().is_empty() {
        special.name = EMPTY_SPECIAL_NAME.to_string();
    }
    if special.description.trim().is_empty() {
        special.description = EMPTY_SPECIAL_DESCRIPTION.to_string();
    }

    Ok(special)
}

/// First inline image of the response, decoded
pub fn extract_image(response: &GenerateContentResponse) -> Result<EditedImage, GeminiError> {
    let inline = response
        .first_inline_data()
        .ok_or(GeminiError::NoImageData)?;

    let bytes = STANDARD
        .decode(inline.data.as_bytes())
        .map_err(|e| GeminiError::Malformed(e.to_string()))?;

    Ok(EditedImage {
        bytes,
        mime_type: inline.mime_type.clone(),
    })
}

impl GeminiClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(api_key, GEMINI_API_URL)
    }

    pub fn with_base_url(api_key: Option<String>, base_url: &str) -> Self {
        GeminiClient {
            // an empty env var counts as unset
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GeminiError> {
        let api_key = self.api_key.as_deref().ok_or(GeminiError::Unconfigured)?;

        let response = self
            .client
            .post(format!("{}/{}:generateContent", self.base_url, model))
            .query(&[("key", api_key)])
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json::<GenerateContentResponse>()
            .await?;

        Ok(response)
    }

    async fn request_special(&self) -> Result<ChefSpecial, GeminiError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::text(CHEF_PROMPT)],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(json!({
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING", "description": "The name of the dish." },
                        "description": { "type": "STRING", "description": "A short, enticing description of the dish." }
                    },
                    "required": ["name", "description"]
                })),
                response_modalities: None,
            }),
        };

        let response = self.generate(GEMINI_TEXT_MODEL, &request).await?;
        let text = response.first_text().ok_or(GeminiError::EmptyResponse)?;

        parse_special(&text)
    }

    /// Never fails: any problem with the API yields the house special
    pub async fn get_chefs_special(&self) -> ChefSpecial {
        match self.request_special().await {
            Ok(special) => {
                log::info!("Chef's special: {}", special.name);
                special
            }
            Err(e) => {
                log::warn!("Chef's special unavailable, using fallback: {}", e);
                fallback_special()
            }
        }
    }

    pub async fn edit_image(
        &self,
        image: &[u8],
        mime_type: &str,
        prompt: &str,
    ) -> Result<EditedImage, GeminiError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::inline(mime_type, STANDARD.encode(image)), Part::text(prompt)],
            }],
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["IMAGE".to_string()]),
                ..Default::default()
            }),
        };

        log::info!("Image edit requested: '{}'", prompt);
        let response = self.generate(GEMINI_IMAGE_MODEL, &request).await?;

        extract_image(&response)
    }
}
