use crate::error::ApiError;
use serde::Serialize;

/// `page` and `page_size`, always sent first on list endpoints.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PageParams {
    pub page: u32,
    pub page_size: u32,
}

/// The analytics window: look back `days`, return at most `limit` rows.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct WindowParams {
    pub days: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct LimitParams {
    pub limit: u32,
}

/// Serializes each parameter group in turn and joins the non-empty parts, so
/// the paging values precede the filters and absent filters leave no trace.
pub fn build_query(parts: &[&dyn ErasedParams]) -> Result<String, ApiError> {
    let mut encoded = Vec::with_capacity(parts.len());
    for part in parts {
        let qs = part.to_query()?;
        if !qs.is_empty() {
            encoded.push(qs);
        }
    }
    Ok(encoded.join("&"))
}

/// Object-safe view of any `Serialize` parameter struct.
pub trait ErasedParams {
    fn to_query(&self) -> Result<String, ApiError>;
}

impl<T: Serialize> ErasedParams for T {
    fn to_query(&self) -> Result<String, ApiError> {
        Ok(serde_qs::to_string(self)?)
    }
}
