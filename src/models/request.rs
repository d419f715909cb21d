use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use validator::Validate;

use crate::models::{account::Role, product::ProductDetailsInfo, random_suffix};

/// Lifecycle status of a product request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Fulfilled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Approved => "APPROVED",
            RequestStatus::Rejected => "REJECTED",
            RequestStatus::Fulfilled => "FULFILLED",
        }
    }

    /// Validate `action` against the current status and return the next one.
    pub fn apply(self, action: RequestAction) -> Result<RequestStatus, TransitionError> {
        match (action, self) {
            (RequestAction::Fulfill, RequestStatus::Approved) => Ok(RequestStatus::Fulfilled),
            (RequestAction::Fulfill, RequestStatus::Fulfilled) => {
                Err(TransitionError::AlreadyFulfilled)
            }
            (RequestAction::Fulfill, _) => Err(TransitionError::NotApproved),
            (_, RequestStatus::Fulfilled) => Err(TransitionError::AlreadyFulfilled),
            (RequestAction::Approve, _) => Ok(RequestStatus::Approved),
            (RequestAction::Reject, _) => Ok(RequestStatus::Rejected),
        }
    }
}

/// Role-gated transitions of the request lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestAction {
    Approve,
    Reject,
    Fulfill,
}

impl RequestAction {
    pub fn required_role(&self) -> Role {
        match self {
            RequestAction::Approve | RequestAction::Reject => Role::RequestApprover,
            RequestAction::Fulfill => Role::Fulfiller,
        }
    }

    /// Verb used in permission errors, e.g. "approve"
    pub fn verb(&self) -> &'static str {
        match self {
            RequestAction::Approve => "approve",
            RequestAction::Reject => "reject",
            RequestAction::Fulfill => "fulfill",
        }
    }

    /// Past tense used in the remarks audit note
    pub fn past_tense(&self) -> &'static str {
        match self {
            RequestAction::Approve => "Approved",
            RequestAction::Reject => "Rejected",
            RequestAction::Fulfill => "Fulfilled",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Request is already FULFILLED.")]
    AlreadyFulfilled,

    #[error("Request is not in APPROVED status.")]
    NotApproved,
}

/// Append a timestamped audit note to the remarks log.
pub fn append_remark(
    existing: &str,
    action: RequestAction,
    username: &str,
    at: DateTime<Utc>,
) -> String {
    let note = format!(
        "{} by {} at {}",
        action.past_tense(),
        username,
        at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if existing.is_empty() {
        note
    } else {
        format!("{existing} | {note}")
    }
}

/// `{YYYYMMDDHHMMSS}-{6 random A-Z0-9}`
pub fn new_request_id(now: DateTime<Utc>) -> String {
    format!("{}-{}", now.format("%Y%m%d%H%M%S"), random_suffix(6))
}

/// Database request model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct RequestDetails {
    pub requestid: String,
    pub requestorname: String,
    pub requestdate: DateTime<Utc>,
    pub requestproductid: String,
    pub requestunit: i64,
    pub is_urgent: bool,
    pub remarks: String,
    pub status: RequestStatus,
    pub fullfillername: Option<String>,
    pub fullfilldate: Option<DateTime<Utc>>,
}

/// Request row joined with the names of the requested product
#[derive(Debug, Clone, FromRow)]
pub struct RequestWithProduct {
    #[sqlx(flatten)]
    pub request: RequestDetails,
    pub productnamezh: Option<String>,
    pub productnameen: Option<String>,
}

/// JSON representation of a request for API responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDetailsResponse {
    pub requestid: String,
    pub requestorname: String,
    pub requestdate: DateTime<Utc>,
    pub requestproductid: String,
    pub product: Option<ProductDetailsInfo>,
    pub requestunit: i64,
    pub is_urgent: bool,
    pub remarks: String,
    pub status: RequestStatus,
    pub fullfillername: Option<String>,
    pub fullfilldate: Option<DateTime<Utc>>,
}

impl From<RequestWithProduct> for RequestDetailsResponse {
    fn from(row: RequestWithProduct) -> Self {
        let request = row.request;
        let product = match (row.productnamezh, row.productnameen) {
            (Some(productnamezh), Some(productnameen)) => Some(ProductDetailsInfo {
                productid: request.requestproductid.clone(),
                productnamezh,
                productnameen,
            }),
            _ => None,
        };

        Self {
            requestid: request.requestid,
            requestorname: request.requestorname,
            requestdate: request.requestdate,
            requestproductid: request.requestproductid,
            product,
            requestunit: request.requestunit,
            is_urgent: request.is_urgent,
            remarks: request.remarks,
            status: request.status,
            fullfillername: request.fullfillername,
            fullfilldate: request.fullfilldate,
        }
    }
}

/// Creation payload. The requestor is always the authenticated caller.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RequestDetailsCreate {
    #[validate(length(min = 1, max = 20))]
    pub requestproductid: String,
    #[validate(range(min = 1))]
    pub requestunit: i64,
    #[serde(default)]
    pub is_urgent: bool,
    #[serde(default)]
    #[validate(length(max = 4096))]
    pub remarks: String,
}

impl RequestDetailsCreate {
    pub fn into_request(self, requestorname: &str) -> RequestDetails {
        let now = Utc::now();
        RequestDetails {
            requestid: new_request_id(now),
            requestorname: requestorname.to_string(),
            requestdate: now,
            requestproductid: self.requestproductid,
            requestunit: self.requestunit,
            is_urgent: self.is_urgent,
            remarks: self.remarks,
            status: RequestStatus::Pending,
            fullfillername: None,
            fullfilldate: None,
        }
    }
}

/// Editable fields of a request; status and requestor are not among them
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RequestDetailsUpdate {
    #[validate(length(min = 1, max = 20))]
    pub requestproductid: Option<String>,
    #[validate(range(min = 1))]
    pub requestunit: Option<i64>,
    pub is_urgent: Option<bool>,
    #[validate(length(max = 4096))]
    pub remarks: Option<String>,
}

impl RequestDetailsUpdate {
    pub fn apply(self, request: &mut RequestDetails) {
        if let Some(v) = self.requestproductid {
            request.requestproductid = v;
        }
        if let Some(v) = self.requestunit {
            request.requestunit = v;
        }
        if let Some(v) = self.is_urgent {
            request.is_urgent = v;
        }
        if let Some(v) = self.remarks {
            request.remarks = v;
        }
    }
}

/// Query filters for listing requests
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
    pub requestorname: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fulfill_requires_approved() {
        assert_eq!(
            RequestStatus::Approved.apply(RequestAction::Fulfill),
            Ok(RequestStatus::Fulfilled)
        );
        assert_eq!(
            RequestStatus::Pending.apply(RequestAction::Fulfill),
            Err(TransitionError::NotApproved)
        );
        assert_eq!(
            RequestStatus::Rejected.apply(RequestAction::Fulfill),
            Err(TransitionError::NotApproved)
        );
        assert_eq!(
            RequestStatus::Fulfilled.apply(RequestAction::Fulfill),
            Err(TransitionError::AlreadyFulfilled)
        );
    }

    #[test]
    fn test_approver_can_revisit_decision() {
        assert_eq!(
            RequestStatus::Pending.apply(RequestAction::Approve),
            Ok(RequestStatus::Approved)
        );
        assert_eq!(
            RequestStatus::Approved.apply(RequestAction::Reject),
            Ok(RequestStatus::Rejected)
        );
        assert_eq!(
            RequestStatus::Rejected.apply(RequestAction::Approve),
            Ok(RequestStatus::Approved)
        );
    }

    #[test]
    fn test_fulfilled_is_terminal() {
        for action in [RequestAction::Approve, RequestAction::Reject, RequestAction::Fulfill] {
            assert_eq!(
                RequestStatus::Fulfilled.apply(action),
                Err(TransitionError::AlreadyFulfilled)
            );
        }
    }

    #[test]
    fn test_actions_are_gated_by_role() {
        assert_eq!(RequestAction::Approve.required_role(), Role::RequestApprover);
        assert_eq!(RequestAction::Reject.required_role(), Role::RequestApprover);
        assert_eq!(RequestAction::Fulfill.required_role(), Role::Fulfiller);
    }

    #[test]
    fn test_append_remark() {
        let at = Utc.with_ymd_and_hms(2025, 7, 3, 12, 0, 0).unwrap();

        let first = append_remark("", RequestAction::Approve, "approver", at);
        assert_eq!(first, "Approved by approver at 2025-07-03 12:00:00 UTC");

        let second = append_remark(&first, RequestAction::Fulfill, "fulfiller", at);
        assert_eq!(
            second,
            "Approved by approver at 2025-07-03 12:00:00 UTC | Fulfilled by fulfiller at 2025-07-03 12:00:00 UTC"
        );
    }

    #[test]
    fn test_request_id_format() {
        let at = Utc.with_ymd_and_hms(2025, 7, 3, 12, 0, 0).unwrap();
        let id = new_request_id(at);
        let (stamp, suffix) = id.split_once('-').unwrap();
        assert_eq!(stamp, "20250703120000");
        assert_eq!(suffix.len(), 6);
        assert!(id.len() <= 32);
    }

    #[test]
    fn test_status_serializes_as_tag() {
        assert_eq!(
            serde_json::to_string(&RequestStatus::Fulfilled).unwrap(),
            r#""FULFILLED""#
        );
        assert_eq!(RequestStatus::Pending.as_str(), "PENDING");
    }
}
