use std::fmt::{self, Display};

/// Status codes the bundled suites check against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Success,
    Created,
    NoContent,
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    ServerError,
}

impl StatusCode {
    pub const ALL: [StatusCode; 8] = [
        StatusCode::Success,
        StatusCode::Created,
        StatusCode::NoContent,
        StatusCode::BadRequest,
        StatusCode::Unauthorized,
        StatusCode::Forbidden,
        StatusCode::NotFound,
        StatusCode::ServerError,
    ];

    pub fn code(self) -> u16 {
        match self {
            StatusCode::Success => 200,
            StatusCode::Created => 201,
            StatusCode::NoContent => 204,
            StatusCode::BadRequest => 400,
            StatusCode::Unauthorized => 401,
            StatusCode::Forbidden => 403,
            StatusCode::NotFound => 404,
            StatusCode::ServerError => 500,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.code() == code)
    }

    pub fn description(self) -> &'static str {
        match self {
            StatusCode::Success => "The request succeeded",
            StatusCode::Created => "A new resource was created",
            StatusCode::NoContent => "The request succeeded with no response body",
            StatusCode::BadRequest => "The request was malformed",
            StatusCode::Unauthorized => "Authentication is required",
            StatusCode::Forbidden => "Access to the resource is denied",
            StatusCode::NotFound => "The resource was not found",
            StatusCode::ServerError => "The server failed to handle the request",
        }
    }
}

impl Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.description())
    }
}

impl From<StatusCode> for crate::testing::CheckValue {
    fn from(status: StatusCode) -> Self {
        crate::testing::CheckValue::Int(i64::from(status.code()))
    }
}
