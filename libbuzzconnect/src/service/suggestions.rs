//! AI-assisted content, hashtags and mentions

use std::sync::Arc;
use tracing::debug;

use crate::api::{Backend, GenerateContentRequest, GeneratedVariant, SuggestionRequest};
use crate::composer::Composer;
use crate::error::{BuzzError, Result};
use crate::hashtags::{append_suggestions, split_generated_content};
use crate::types::Platform;

pub const NO_PLATFORM_MESSAGE: &str = "Please select at least one social media platform first";
pub const NO_PROMPT_MESSAGE: &str = "Please enter a prompt for AI content generation";

/// One generated alternative, ready to apply to a draft
#[derive(Debug, Clone, PartialEq)]
pub struct ContentSuggestion {
    pub platform: Platform,
    pub content: String,
    /// Space-separated hashtags
    pub hashtags: String,
}

impl ContentSuggestion {
    fn from_variant(platform: Platform, variant: &GeneratedVariant) -> Self {
        if platform == Platform::Youtube {
            let title = variant.title.clone().unwrap_or_default();
            let description = variant.description.clone().unwrap_or_default();
            let content = match (title.is_empty(), description.is_empty()) {
                (false, false) => format!("{}\n\n{}", title, description),
                (false, true) => title,
                _ => description,
            };
            return Self {
                platform,
                content,
                hashtags: append_suggestions("", &variant.tags, '#'),
            };
        }

        let raw = variant.content.clone().unwrap_or_default();
        let split = split_generated_content(&raw);
        let hashtags = if split.hashtags.is_empty() {
            append_suggestions("", &variant.hashtags, '#')
        } else {
            split.hashtags.join(" ")
        };
        Self {
            platform,
            content: split.content,
            hashtags,
        }
    }
}

#[derive(Clone)]
pub struct SuggestionService {
    backend: Arc<dyn Backend>,
}

impl SuggestionService {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Generate copy for every selected platform from a prompt
    pub async fn generate(&self, composer: &Composer, prompt: &str) -> Result<Vec<ContentSuggestion>> {
        let platforms = composer.draft().platforms().to_vec();
        if platforms.is_empty() {
            return Err(BuzzError::Validation(NO_PLATFORM_MESSAGE.to_string()));
        }
        if prompt.trim().is_empty() {
            return Err(BuzzError::Validation(NO_PROMPT_MESSAGE.to_string()));
        }

        let generated = self
            .backend
            .generate_content(&GenerateContentRequest::new(prompt.trim(), platforms))
            .await?;

        let suggestions: Vec<ContentSuggestion> = generated
            .iter()
            .filter_map(|(name, variant)| match name.parse::<Platform>() {
                Ok(platform) => Some(ContentSuggestion::from_variant(platform, variant)),
                Err(_) => {
                    debug!(platform = %name, "Skipping suggestion for unknown platform");
                    None
                }
            })
            .collect();
        Ok(suggestions)
    }

    /// Ask for hashtags for the draft's content and append them to its hashtag field
    pub async fn suggest_hashtags(&self, composer: &mut Composer) -> Result<usize> {
        let platform = Self::suggestion_target(composer, "hashtags")?;
        let request = SuggestionRequest::hashtags(composer.draft().content.clone(), platform);
        let tags = self.backend.suggest_hashtags(&request).await?;
        if tags.is_empty() {
            return Err(BuzzError::Validation(
                "Invalid response format - no hashtags received".to_string(),
            ));
        }

        let draft = composer.draft_mut();
        draft.hashtags = append_suggestions(&draft.hashtags, &tags, '#');
        Ok(tags.len())
    }

    /// Ask for mentions for the draft's content and append them to its mention field
    pub async fn suggest_mentions(&self, composer: &mut Composer) -> Result<usize> {
        let platform = Self::suggestion_target(composer, "mentions")?;
        let request = SuggestionRequest::mentions(composer.draft().content.clone(), platform);
        let mentions = self.backend.suggest_mentions(&request).await?;
        if mentions.is_empty() {
            return Err(BuzzError::Validation(
                "Invalid response format - no mentions received".to_string(),
            ));
        }

        let draft = composer.draft_mut();
        draft.mentions = append_suggestions(&draft.mentions, &mentions, '@');
        Ok(mentions.len())
    }

    /// Suggestions are requested for the first selected platform
    fn suggestion_target(composer: &Composer, what: &str) -> Result<Platform> {
        let draft = composer.draft();
        let Some(platform) = draft.platforms().first().copied() else {
            return Err(BuzzError::Validation(NO_PLATFORM_MESSAGE.to_string()));
        };
        if draft.content.trim().is_empty() {
            return Err(BuzzError::Validation(format!(
                "Please enter some content first to generate {}",
                what
            )));
        }
        Ok(platform)
    }
}

/// Replace the draft's text with a suggestion and target only its platform
pub fn apply_suggestion(composer: &mut Composer, suggestion: &ContentSuggestion) {
    composer.select_only(suggestion.platform);
    let draft = composer.draft_mut();
    draft.content = suggestion.content.clone();
    draft.hashtags = suggestion.hashtags.clone();
    draft.mentions.clear();
}
