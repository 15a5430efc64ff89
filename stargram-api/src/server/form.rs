use crate::server::ServerError;
use axum::extract::{FromRequest, Multipart, Request};
use stargram_common::model::{file::UploadFile, post::PostDraft};

/// Multipart post form with the text fields `caption`, `location`, `tags` and
/// an optional `file` part. An empty file part counts as no file.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct PostForm(pub PostDraft);

impl<S> FromRequest<S> for PostForm
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(request, state).await?;
        let mut draft = PostDraft::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_owned();

            match name.as_str() {
                "caption" => draft.caption = field.text().await?,
                "location" => {
                    let location = field.text().await?;
                    draft.location = Some(location).filter(|location| !location.trim().is_empty());
                }
                "tags" => draft.tags = field.text().await?,
                "file" => {
                    let file_name = field.file_name().unwrap_or("upload").to_owned();
                    let content_type = field.content_type().map(str::to_owned);
                    let bytes = field.bytes().await?;

                    if !bytes.is_empty() {
                        draft.file = Some(UploadFile {
                            name: file_name,
                            content_type,
                            bytes: bytes.to_vec(),
                        });
                    }
                }
                _ => return Err(ServerError::UnexpectedFormField(name)),
            }
        }

        Ok(Self(draft))
    }
}
