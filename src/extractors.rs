use axum::async_trait;
use axum::extract::{FromRequest, Multipart, Request};
use tracing::debug;

use crate::describe::{split_languages, GenerationRequest, Length};
use crate::error::ApiError;
use crate::inference::ImageInput;

/// Reads the description form: `image` file, `languages`, optional `model` and `length`.
pub(crate) struct GenerationForm(pub(crate) GenerationRequest);

#[async_trait]
impl<S> FromRequest<S> for GenerationForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state).await?;

        let mut image = None;
        let mut languages = None;
        let mut model = None;
        let mut length = None;

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            match name.as_str() {
                "image" => {
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await?;
                    image = Some(ImageInput::new(bytes.to_vec(), content_type.as_deref()));
                }
                "languages" => languages = Some(field.text().await?),
                "model" => model = Some(field.text().await?),
                "length" => length = Some(field.text().await?),
                other => debug!(field = other, "Ignoring unknown form field"),
            }
        }

        let image = image
            .filter(|image| !image.is_empty())
            .ok_or_else(ApiError::missing_image)?;

        Ok(GenerationForm(GenerationRequest {
            image,
            languages: split_languages(languages.as_deref().unwrap_or_default()),
            length: Length::from_field(length.as_deref()),
            model: model.filter(|model| !model.is_empty()),
        }))
    }
}
