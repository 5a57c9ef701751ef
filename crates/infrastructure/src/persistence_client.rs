use diagrid_core::{AppError, AppResult};
use reqwest::{Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

/// Shared HTTP client for the Persistence API that owns diagram metadata and
/// grant rows.
///
/// The API speaks JSON; error responses carry an `{"error": "..."}` body
/// whose detail is preserved in the mapped error.
#[derive(Debug, Clone)]
pub struct PersistenceClient {
    http_client: reqwest::Client,
    base_url: Url,
}

#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    error: String,
}

impl PersistenceClient {
    /// Creates a client over a base URL such as `http://persistence:8081/`.
    #[must_use]
    pub fn new(http_client: reqwest::Client, base_url: Url) -> Self {
        Self {
            http_client,
            base_url,
        }
    }

    fn endpoint(&self, path: &str) -> AppResult<Url> {
        self.base_url.join(path).map_err(|error| {
            AppError::Internal(format!("invalid persistence endpoint '{path}': {error}"))
        })
    }

    /// GET returning `None` on 404.
    pub(crate) async fn get_optional<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> AppResult<Option<T>> {
        let response = self
            .http_client
            .get(self.endpoint(path)?)
            .send()
            .await
            .map_err(transport_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = Self::checked(response).await?;
        Ok(Some(response.json::<T>().await.map_err(transport_error)?))
    }

    /// GET returning the decoded body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let response = self
            .http_client
            .get(self.endpoint(path)?)
            .send()
            .await
            .map_err(transport_error)?;

        let response = Self::checked(response).await?;
        response.json::<T>().await.map_err(transport_error)
    }

    /// POST with a JSON body, discarding the response body.
    pub(crate) async fn post<B: Serialize + Sync>(&self, path: &str, body: &B) -> AppResult<()> {
        let response = self
            .http_client
            .post(self.endpoint(path)?)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        Self::checked(response).await.map(|_| ())
    }

    /// POST with a JSON body, decoding the response body.
    pub(crate) async fn post_returning<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> AppResult<T> {
        let response = self
            .http_client
            .post(self.endpoint(path)?)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let response = Self::checked(response).await?;
        response.json::<T>().await.map_err(transport_error)
    }

    /// PUT with a JSON body, discarding the response body.
    pub(crate) async fn put<B: Serialize + Sync>(&self, path: &str, body: &B) -> AppResult<()> {
        let response = self
            .http_client
            .put(self.endpoint(path)?)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        Self::checked(response).await.map(|_| ())
    }

    async fn checked(response: Response) -> AppResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let detail = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => format!("persistence responded with status {status}"),
        };
        Err(error_for_status(status, detail))
    }
}

fn transport_error(error: reqwest::Error) -> AppError {
    AppError::Internal(format!("persistence request failed: {error}"))
}

fn error_for_status(status: StatusCode, detail: String) -> AppError {
    match status {
        StatusCode::BAD_REQUEST => AppError::Validation(detail),
        StatusCode::UNAUTHORIZED => AppError::Unauthorized(detail),
        StatusCode::FORBIDDEN => AppError::Forbidden(detail),
        StatusCode::NOT_FOUND => AppError::NotFound(detail),
        StatusCode::CONFLICT => AppError::Conflict(detail),
        _ => AppError::Internal(detail),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_typed_errors() {
        let conflict = error_for_status(StatusCode::CONFLICT, "duplicate".to_owned());
        assert!(matches!(conflict, AppError::Conflict(detail) if detail == "duplicate"));

        let missing = error_for_status(StatusCode::NOT_FOUND, "no such row".to_owned());
        assert!(matches!(missing, AppError::NotFound(_)));

        let teapot = error_for_status(StatusCode::IM_A_TEAPOT, "odd".to_owned());
        assert!(matches!(teapot, AppError::Internal(_)));
    }

    #[test]
    fn endpoint_joins_relative_paths_against_the_base() {
        let base = match Url::parse("http://persistence:8081/api/") {
            Ok(url) => url,
            Err(error) => panic!("base url must parse: {error}"),
        };
        let client = PersistenceClient::new(reqwest::Client::new(), base);
        let joined = client.endpoint("diagrams/d1").ok().map(String::from);
        assert_eq!(
            joined.as_deref(),
            Some("http://persistence:8081/api/diagrams/d1")
        );
    }
}
