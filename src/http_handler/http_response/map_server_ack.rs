use super::response_common::{HTTPResponseType, ResponseError};

/// Response type for map-server writes. Successful answers carry either the
/// created resource's name or nothing, so the body is discarded.
pub(crate) struct MapServerAckResponse {}

impl HTTPResponseType for MapServerAckResponse {
    type ParsedResponseType = ();

    async fn read_response(
        response: reqwest::Response,
    ) -> Result<Self::ParsedResponseType, ResponseError> {
        Self::unwrap_return_code(response).await?;
        Ok(())
    }
}
